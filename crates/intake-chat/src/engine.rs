//! Conversational assessment state machine.
//!
//! Phases run `Greeting -> FreeformQa <-> StructuredQa -> CompletenessCheck
//! -> SummaryPending -> SummaryReady`. The engine accepts [`ChatIntent`]s and
//! hands back immutable [`ChatSnapshot`]s. Crisis scanning is a side channel
//! that runs on every user-authored text before any state change.

use std::sync::Arc;

use intake_core::crisis::crisis_message;
use intake_core::models::form::FormDraft;
use intake_core::models::message::{ChatPhase, Message, MessageMetadata, Sender};
use intake_core::models::question::StructuredQuestion;
use intake_core::models::response::AssessmentResponse;
use intake_core::models::summary::AssessmentSummary;
use intake_questions::engine::{
    Answer, DraftOutcome, Key, QuestionProgress, StructuredQuestionEngine, SubmitOutcome,
};
use intake_questions::QuestionBank;
use intake_summary::bridge::{chat_to_form, ExtractedAnswer, ExtractedChatState};
use intake_summary::chat_to_summary;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::crisis::{CrisisClassifier, KeywordClassifier};
use crate::error::ChatError;
use crate::policy::{CompletenessPolicy, RequiredQuestions};
use crate::responder::{ChatResponder, ResponderReply, ResponderRequest};
use crate::ChatSettings;

const GREETING: &str = "Hi, I'm here to help you tell us what's been going on with your child. \
     In your own words, what's been worrying you lately?";
const GREETING_NAMED: &str = "Hi, I'm here to help you tell us what's been going on with";
const STRUCTURED_INTRO: &str = "Thanks. Next, a few quick questions so we get the details right.";
const NEED_MORE: &str = "Before I put the summary together, could you tell me a little more \
     about what's been happening?";
const SUMMARY_READY: &str = "Thank you. I've put together a summary of everything you shared.";
const SUMMARY_ALREADY_READY: &str = "Your summary is ready. You can review it, or go back to \
     change an answer.";
const PICK_AN_OPTION: &str = "Please choose one of the options for this question.";
const RESPONDER_UNAVAILABLE: &str = "Sorry, I couldn't reply just now. Please keep going, or \
     switch to the form if you prefer.";
const BACK_TO_FREEFORM: &str = "Of course. Tell me more about what's been happening.";

/// A discrete user action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum ChatIntent {
    Start,
    SendMessage { text: String },
    SubmitAnswer { question_id: String, answer: Answer },
    CommitAnswer,
    GoBack,
    OpenOther,
    EditOther { text: String },
    Key { key: Key },
    SwitchMode,
}

impl ChatIntent {
    fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SendMessage { .. } => "send_message",
            Self::SubmitAnswer { .. } => "submit_answer",
            Self::CommitAnswer => "commit_answer",
            Self::GoBack => "go_back",
            Self::OpenOther => "open_other",
            Self::EditOther { .. } => "edit_other",
            Self::Key { .. } => "key",
            Self::SwitchMode => "switch_mode",
        }
    }
}

/// Immutable view of the conversation, also the persisted `chat` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ChatSnapshot {
    pub session_id: Uuid,
    pub phase: ChatPhase,
    pub messages: Vec<Message>,
    pub questions: QuestionProgress,
    pub crisis_detected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_question: Option<StructuredQuestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<AssessmentSummary>,
    /// Pre-filled form values, set only in answer to `SwitchMode`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handoff: Option<FormDraft>,
}

/// A finished assessment, handed to the caller once for persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct Completed {
    pub summary: AssessmentSummary,
    pub form_data: FormDraft,
    pub responses: Vec<AssessmentResponse>,
}

pub struct ConversationEngine {
    session_id: Uuid,
    phase: ChatPhase,
    messages: Vec<Message>,
    questions: StructuredQuestionEngine,
    crisis_detected: bool,
    summary: Option<AssessmentSummary>,
    child_name: Option<String>,
    carried: ExtractedChatState,
    scheduled_commit: Option<String>,
    completed: Option<Completed>,
    reopened: bool,
    classifier: Arc<dyn CrisisClassifier>,
    policy: Arc<dyn CompletenessPolicy>,
    responder: Arc<dyn ChatResponder>,
    settings: ChatSettings,
}

impl ConversationEngine {
    pub fn new(session_id: Uuid, bank: &dyn QuestionBank, responder: Arc<dyn ChatResponder>) -> Self {
        Self {
            session_id,
            phase: ChatPhase::Greeting,
            messages: Vec::new(),
            questions: StructuredQuestionEngine::from_bank(bank),
            crisis_detected: false,
            summary: None,
            child_name: None,
            carried: ExtractedChatState::default(),
            scheduled_commit: None,
            completed: None,
            reopened: false,
            classifier: Arc::new(KeywordClassifier::default()),
            policy: Arc::new(RequiredQuestions::default()),
            responder,
            settings: ChatSettings::default(),
        }
    }

    /// Rebuild from a persisted snapshot. An answer that was still recording
    /// when the snapshot was taken counts as committed.
    pub fn restore(
        snapshot: ChatSnapshot,
        bank: &dyn QuestionBank,
        responder: Arc<dyn ChatResponder>,
    ) -> Self {
        let was_recording = snapshot.questions.recording.is_some();
        let mut engine = Self::new(snapshot.session_id, bank, responder);
        engine.phase = snapshot.phase;
        engine.messages = snapshot.messages;
        engine.questions = StructuredQuestionEngine::restore(bank.questions().to_vec(), snapshot.questions);
        engine.crisis_detected = snapshot.crisis_detected;
        engine.summary = snapshot.summary;

        if was_recording && engine.phase == ChatPhase::StructuredQa {
            engine.after_commit();
        }
        tracing::debug!(session_id = %engine.session_id, phase = ?engine.phase, "chat restored");
        engine
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn CrisisClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_policy(mut self, policy: Arc<dyn CompletenessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_settings(mut self, settings: ChatSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_child_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.child_name = Some(name.trim().to_string()).filter(|n| !n.is_empty());
        self
    }

    /// Carry answers over from the form. Values the chat collects itself
    /// take precedence.
    pub fn carry_over(&mut self, draft: &FormDraft) {
        self.carried = intake_summary::bridge::form_to_chat(draft);
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn responses(&self) -> &[AssessmentResponse] {
        self.questions.responses()
    }

    pub fn crisis_detected(&self) -> bool {
        self.crisis_detected
    }

    pub fn recording(&self) -> Option<&str> {
        self.questions.recording()
    }

    pub fn settings(&self) -> ChatSettings {
        self.settings
    }

    pub fn responder(&self) -> Arc<dyn ChatResponder> {
        Arc::clone(&self.responder)
    }

    /// The question id whose answer just entered the recording phase, if
    /// any. The driver commits it after the recording delay.
    pub fn take_scheduled_commit(&mut self) -> Option<String> {
        self.scheduled_commit.take()
    }

    /// The assessment finished since the last call.
    pub fn take_completed(&mut self) -> Option<Completed> {
        self.completed.take()
    }

    /// A finished assessment was reopened for revision since the last call.
    pub fn take_reopened(&mut self) -> bool {
        std::mem::take(&mut self.reopened)
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            session_id: self.session_id,
            phase: self.phase,
            messages: self.messages.clone(),
            questions: self.questions.progress(),
            crisis_detected: self.crisis_detected,
            current_question: match self.phase {
                ChatPhase::StructuredQa => self.questions.current().cloned(),
                _ => None,
            },
            draft: self.questions.draft().map(str::to_string),
            summary: self.summary.clone(),
            handoff: None,
        }
    }

    /// What the conversation has collected, in the shape the mode bridge
    /// and the summary synthesizer take.
    pub fn extracted(&self) -> ExtractedChatState {
        let mut state = self.carried.clone();

        let concerns: Vec<String> = self
            .messages
            .iter()
            .filter(|m| is_freeform_user_message(m))
            .map(|m| m.content.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if !concerns.is_empty() {
            state.concerns = concerns;
        }

        for response in self.questions.responses() {
            let category = self
                .questions
                .questions()
                .iter()
                .find(|q| q.id == response.question_id)
                .map(|q| q.question_type);
            if let Some(category) = category {
                state.answers.insert(
                    category,
                    ExtractedAnswer {
                        text: response.response_text.clone(),
                        value: response.response_value,
                    },
                );
            }
        }

        state
    }

    /// Handle one intent end to end, awaiting the responder inline.
    pub async fn handle(&mut self, intent: ChatIntent) -> Result<ChatSnapshot, ChatError> {
        match intent {
            ChatIntent::SendMessage { text } => {
                if let Some(request) = self.receive_message(&text)? {
                    let reply = self.responder.respond(&request).await;
                    self.apply_reply(reply);
                }
                Ok(self.snapshot())
            }
            other => self.handle_sync(other),
        }
    }

    /// Handle every intent that does not need the responder. `SendMessage`
    /// is rejected here. It goes through [`handle`](Self::handle), or is
    /// split into [`receive_message`](Self::receive_message) and
    /// [`apply_reply`](Self::apply_reply) so a driver can await the responder
    /// without holding the engine.
    pub fn handle_sync(&mut self, intent: ChatIntent) -> Result<ChatSnapshot, ChatError> {
        let name = intent.name();
        match intent {
            ChatIntent::Start => self.start(),
            ChatIntent::SendMessage { .. } => {
                return Err(ChatError::InvalidIntent {
                    intent: name,
                    phase: self.phase,
                });
            }
            ChatIntent::SubmitAnswer {
                question_id,
                answer,
            } => {
                self.require(name, &[ChatPhase::StructuredQa])?;
                if let Answer::Other(text) = &answer {
                    self.scan(text);
                }
                let outcome = self.questions.submit(&question_id, answer)?;
                self.record(outcome);
            }
            ChatIntent::CommitAnswer => {
                self.require(name, &[ChatPhase::StructuredQa])?;
                self.commit_answer()?;
            }
            ChatIntent::GoBack => {
                self.require(name, &[ChatPhase::StructuredQa, ChatPhase::SummaryReady])?;
                self.go_back()?;
            }
            ChatIntent::OpenOther => {
                self.require(name, &[ChatPhase::StructuredQa])?;
                self.questions.open_other()?;
            }
            ChatIntent::EditOther { text } => {
                self.require(name, &[ChatPhase::StructuredQa])?;
                self.questions.edit_other(&text)?;
            }
            ChatIntent::Key { key } => {
                self.require(name, &[ChatPhase::StructuredQa])?;
                if key == (Key::Enter { shift: false }) {
                    if let Some(draft) = self.questions.draft().map(str::to_string) {
                        self.scan(&draft);
                    }
                }
                if let DraftOutcome::Submitted(outcome) = self.questions.key(key)? {
                    self.record(outcome);
                }
            }
            ChatIntent::SwitchMode => {
                let handoff = chat_to_form(&self.extracted());
                tracing::info!(session_id = %self.session_id, "switching to form");
                let mut snapshot = self.snapshot();
                snapshot.handoff = Some(handoff);
                return Ok(snapshot);
            }
        }
        Ok(self.snapshot())
    }

    /// Take in a user message: crisis scan, append, and phase transitions.
    /// Returns the responder request when the message needs a reply.
    pub fn receive_message(&mut self, text: &str) -> Result<Option<ResponderRequest>, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        self.scan(text);

        match self.phase {
            ChatPhase::Greeting | ChatPhase::FreeformQa => {
                if self.phase == ChatPhase::Greeting {
                    self.enter(ChatPhase::FreeformQa);
                }
                self.messages.push(
                    Message::new(Sender::User, text).with_metadata(MessageMetadata {
                        phase: Some(self.phase),
                        ..Default::default()
                    }),
                );
                Ok(Some(ResponderRequest {
                    phase: self.phase,
                    messages: self.messages.clone(),
                    user_turns: self.freeform_turns(),
                }))
            }
            ChatPhase::StructuredQa => {
                let Some(current) = self.questions.current().cloned() else {
                    return Ok(None);
                };
                if current.allow_other && self.questions.recording().is_none() {
                    let outcome = self
                        .questions
                        .submit(&current.id, Answer::Other(text.to_string()))?;
                    self.record(outcome);
                } else {
                    self.messages.push(
                        Message::new(Sender::User, text).with_metadata(MessageMetadata {
                            phase: Some(self.phase),
                            question_id: Some(current.id.clone()),
                            ..Default::default()
                        }),
                    );
                    self.say(PICK_AN_OPTION, "pick_an_option", Some(&current.id));
                }
                Ok(None)
            }
            ChatPhase::CompletenessCheck | ChatPhase::SummaryPending | ChatPhase::SummaryReady => {
                self.messages.push(
                    Message::new(Sender::User, text).with_metadata(MessageMetadata {
                        phase: Some(self.phase),
                        ..Default::default()
                    }),
                );
                self.say(SUMMARY_ALREADY_READY, "summary_ready", None);
                Ok(None)
            }
        }
    }

    /// Apply the responder's answer to the last free-form message. A failed
    /// responder degrades to a fixed apology; the conversation continues.
    pub fn apply_reply(&mut self, reply: Result<ResponderReply, ChatError>) {
        if self.phase != ChatPhase::FreeformQa {
            tracing::debug!(session_id = %self.session_id, phase = ?self.phase, "dropping late reply");
            return;
        }
        let ready = match reply {
            Ok(reply) => {
                let intent = reply.intent.as_deref().unwrap_or("reply").to_string();
                self.say(&reply.content, &intent, None);
                reply.ready_for_questions
            }
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "responder failed");
                self.say(RESPONDER_UNAVAILABLE, "responder_unavailable", None);
                false
            }
        };

        if ready || self.freeform_turns() >= self.settings.min_freeform_turns {
            if self.questions.is_finished() {
                self.check_completeness();
            } else {
                self.enter(ChatPhase::StructuredQa);
                self.say(STRUCTURED_INTRO, "structured_intro", None);
                self.ask_current();
            }
        }
    }

    fn start(&mut self) {
        if !self.messages.is_empty() {
            return;
        }
        let greeting = match &self.child_name {
            Some(name) => format!(
                "{GREETING_NAMED} {name}. In your own words, what's been worrying you lately?"
            ),
            None => GREETING.to_string(),
        };
        self.say(&greeting, "greeting", None);
        tracing::info!(session_id = %self.session_id, "chat started");
    }

    fn commit_answer(&mut self) -> Result<(), ChatError> {
        self.questions.commit()?;
        self.after_commit();
        Ok(())
    }

    fn after_commit(&mut self) {
        if self.questions.is_finished() {
            self.check_completeness();
        } else {
            self.ask_current();
        }
    }

    fn go_back(&mut self) -> Result<(), ChatError> {
        if self.phase == ChatPhase::SummaryReady {
            self.summary = None;
            self.completed = None;
            self.reopened = true;
            self.enter(ChatPhase::StructuredQa);
        }
        match self.questions.go_back()? {
            Some(question) => {
                let text = format!("Let's revisit this one. {}", question.question);
                self.say(&text, "revisit", Some(&question.id));
            }
            None => {
                self.enter(ChatPhase::FreeformQa);
                self.say(BACK_TO_FREEFORM, "back_to_freeform", None);
            }
        }
        Ok(())
    }

    fn check_completeness(&mut self) {
        self.enter(ChatPhase::CompletenessCheck);
        if !self
            .policy
            .is_complete(self.questions.responses(), &self.messages)
        {
            self.enter(ChatPhase::FreeformQa);
            self.say(NEED_MORE, "need_more", None);
            return;
        }

        self.enter(ChatPhase::SummaryPending);
        let extracted = self.extracted();
        let summary = chat_to_summary(&extracted, self.child_name.as_deref());
        self.completed = Some(Completed {
            summary: summary.clone(),
            form_data: chat_to_form(&extracted),
            responses: self.questions.responses().to_vec(),
        });
        self.summary = Some(summary);
        self.enter(ChatPhase::SummaryReady);
        self.say(SUMMARY_READY, "summary_ready", None);
    }

    fn record(&mut self, outcome: SubmitOutcome) {
        let SubmitOutcome::Recording(response) = outcome else {
            return;
        };
        self.messages.push(
            Message::new(Sender::User, response.response_text.clone()).with_metadata(
                MessageMetadata {
                    phase: Some(self.phase),
                    intent: Some("answer".to_string()),
                    question_id: Some(response.question_id.clone()),
                    score: response.response_value,
                },
            ),
        );
        self.scheduled_commit = Some(response.question_id);
    }

    /// Crisis side channel. The flag is sticky and the resources message is
    /// appended the first time only.
    fn scan(&mut self, text: &str) {
        if self.classifier.classify(text).is_none() {
            return;
        }
        if self.crisis_detected {
            tracing::warn!(session_id = %self.session_id, "crisis language detected again");
            return;
        }
        self.crisis_detected = true;
        tracing::warn!(session_id = %self.session_id, "crisis language detected");
        self.messages.push(
            Message::new(Sender::System, crisis_message()).with_metadata(MessageMetadata {
                phase: Some(self.phase),
                intent: Some("crisis_resources".to_string()),
                ..Default::default()
            }),
        );
    }

    fn ask_current(&mut self) {
        if let Some(question) = self.questions.current().cloned() {
            self.say(&question.question, "structured_question", Some(&question.id));
        }
    }

    fn say(&mut self, content: &str, intent: &str, question_id: Option<&str>) {
        self.messages.push(
            Message::new(Sender::Ai, content).with_metadata(MessageMetadata {
                phase: Some(self.phase),
                intent: Some(intent.to_string()),
                question_id: question_id.map(str::to_string),
                score: None,
            }),
        );
    }

    fn enter(&mut self, phase: ChatPhase) {
        if self.phase != phase {
            tracing::debug!(session_id = %self.session_id, from = ?self.phase, to = ?phase, "chat phase");
            self.phase = phase;
        }
    }

    fn require(&self, intent: &'static str, allowed: &[ChatPhase]) -> Result<(), ChatError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(ChatError::InvalidIntent {
                intent,
                phase: self.phase,
            })
        }
    }

    fn freeform_turns(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| is_freeform_user_message(m))
            .count()
    }
}

fn is_freeform_user_message(message: &Message) -> bool {
    message.sender == Sender::User
        && message.question_id().is_none()
        && matches!(
            message.metadata.as_ref().and_then(|m| m.phase),
            None | Some(ChatPhase::Greeting) | Some(ChatPhase::FreeformQa)
        )
}
