use intake_core::models::question::StructuredQuestion;
use intake_core::models::response::{upsert_response, AssessmentResponse};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::QuestionError;
use crate::{score_answer, QuestionBank};

/// A single answer to the open question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
#[ts(export)]
pub enum Answer {
    /// One of the listed options, verbatim.
    Option(String),
    /// Free text, only when the question allows "other".
    Other(String),
}

/// Keys with special meaning while free text is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Key {
    Enter { shift: bool },
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The answer was recorded; the engine waits for [`commit`] to advance.
    ///
    /// [`commit`]: StructuredQuestionEngine::commit
    Recording(AssessmentResponse),
    /// A repeated submit for the question already being recorded.
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next(StructuredQuestion),
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DraftOutcome {
    Edited,
    Submitted(SubmitOutcome),
    Discarded,
}

/// Serializable position of the engine, persisted with the chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct QuestionProgress {
    pub cursor: usize,
    pub responses: Vec<AssessmentResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recording: Option<String>,
}

/// Presents one structured question at a time and records exactly one
/// answer per question.
///
/// Submitting an answer enters a recording phase. While it lasts, a second
/// submit for the same question is ignored and back navigation is refused;
/// [`commit`](Self::commit) ends it and opens the next question.
#[derive(Debug, Clone)]
pub struct StructuredQuestionEngine {
    questions: Vec<StructuredQuestion>,
    cursor: usize,
    responses: Vec<AssessmentResponse>,
    recording: Option<String>,
    draft: Option<String>,
}

impl StructuredQuestionEngine {
    pub fn new(questions: Vec<StructuredQuestion>) -> Self {
        Self {
            questions,
            cursor: 0,
            responses: Vec::new(),
            recording: None,
            draft: None,
        }
    }

    pub fn from_bank(bank: &dyn QuestionBank) -> Self {
        Self::new(bank.questions().to_vec())
    }

    /// Rebuild from persisted progress. An answer that was still recording
    /// is treated as committed.
    pub fn restore(questions: Vec<StructuredQuestion>, progress: QuestionProgress) -> Self {
        let mut cursor = progress.cursor.min(questions.len());
        if progress.recording.is_some() && cursor < questions.len() {
            cursor += 1;
        }
        Self {
            questions,
            cursor,
            responses: progress.responses,
            recording: None,
            draft: None,
        }
    }

    pub fn progress(&self) -> QuestionProgress {
        QuestionProgress {
            cursor: self.cursor,
            responses: self.responses.clone(),
            recording: self.recording.clone(),
        }
    }

    pub fn questions(&self) -> &[StructuredQuestion] {
        &self.questions
    }

    pub fn current(&self) -> Option<&StructuredQuestion> {
        self.questions.get(self.cursor)
    }

    pub fn responses(&self) -> &[AssessmentResponse] {
        &self.responses
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.questions.len()
    }

    pub fn recording(&self) -> Option<&str> {
        self.recording.as_deref()
    }

    pub fn draft(&self) -> Option<&str> {
        self.draft.as_deref()
    }

    pub fn submit(&mut self, question_id: &str, answer: Answer) -> Result<SubmitOutcome, QuestionError> {
        if let Some(recording) = &self.recording {
            if recording == question_id {
                tracing::debug!(question_id, "ignoring repeated submit while recording");
                return Ok(SubmitOutcome::Ignored);
            }
            return Err(QuestionError::AdvancePending {
                question_id: recording.clone(),
            });
        }

        let current = self.current().ok_or(QuestionError::NoOpenQuestion)?;
        if current.id != question_id {
            return Err(QuestionError::NotCurrentQuestion {
                open: current.id.clone(),
                answered: question_id.to_string(),
            });
        }

        let text = match answer {
            Answer::Option(option) => {
                if !current.has_option(&option) {
                    return Err(QuestionError::InvalidOption {
                        question_id: current.id.clone(),
                        answer: option,
                    });
                }
                option
            }
            Answer::Other(text) => {
                if !current.allow_other {
                    return Err(QuestionError::OtherNotAllowed {
                        question_id: current.id.clone(),
                    });
                }
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Err(QuestionError::EmptyAnswer {
                        question_id: current.id.clone(),
                    });
                }
                trimmed.to_string()
            }
        };

        let response = AssessmentResponse {
            question_id: current.id.clone(),
            response_value: score_answer(current, &text),
            response_text: text,
            timestamp: jiff::Timestamp::now(),
        };
        upsert_response(&mut self.responses, response.clone());
        self.recording = Some(response.question_id.clone());
        self.draft = None;
        Ok(SubmitOutcome::Recording(response))
    }

    /// End the recording phase and open the next question.
    pub fn commit(&mut self) -> Result<Advance, QuestionError> {
        self.recording.take().ok_or(QuestionError::NothingRecording)?;
        self.cursor += 1;
        Ok(match self.current() {
            Some(next) => Advance::Next(next.clone()),
            None => Advance::Finished,
        })
    }

    /// Re-open the previous question, discarding its earlier answer.
    /// Returns `None` when already at the first question.
    pub fn go_back(&mut self) -> Result<Option<StructuredQuestion>, QuestionError> {
        if let Some(recording) = &self.recording {
            return Err(QuestionError::AdvancePending {
                question_id: recording.clone(),
            });
        }
        let position = self.cursor.min(self.questions.len());
        if position == 0 {
            return Ok(None);
        }
        self.cursor = position - 1;
        self.draft = None;
        let reopened = self.questions[self.cursor].clone();
        self.responses.retain(|r| r.question_id != reopened.id);
        Ok(Some(reopened))
    }

    /// Switch the open question to free-text entry.
    pub fn open_other(&mut self) -> Result<(), QuestionError> {
        let current = self.current().ok_or(QuestionError::NoOpenQuestion)?;
        if !current.allow_other {
            return Err(QuestionError::OtherNotAllowed {
                question_id: current.id.clone(),
            });
        }
        if self.draft.is_none() {
            self.draft = Some(String::new());
        }
        Ok(())
    }

    pub fn edit_other(&mut self, text: &str) -> Result<(), QuestionError> {
        let draft = self.draft.as_mut().ok_or(QuestionError::NoDraft)?;
        draft.clear();
        draft.push_str(text);
        Ok(())
    }

    /// Enter submits, Shift+Enter inserts a newline, Escape discards the
    /// draft and returns to the option list.
    pub fn key(&mut self, key: Key) -> Result<DraftOutcome, QuestionError> {
        let draft = self.draft.as_mut().ok_or(QuestionError::NoDraft)?;
        match key {
            Key::Enter { shift: true } => {
                draft.push('\n');
                Ok(DraftOutcome::Edited)
            }
            Key::Enter { shift: false } => {
                let text = draft.clone();
                let question_id = self
                    .current()
                    .map(|q| q.id.clone())
                    .ok_or(QuestionError::NoOpenQuestion)?;
                let outcome = self.submit(&question_id, Answer::Other(text))?;
                Ok(DraftOutcome::Submitted(outcome))
            }
            Key::Escape => {
                self.draft = None;
                Ok(DraftOutcome::Discarded)
            }
        }
    }
}
