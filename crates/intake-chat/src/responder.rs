//! The seam to whatever produces the assistant's free-form replies.

use intake_core::models::message::{ChatPhase, Message};
use intake_core::BoxFuture;

use crate::error::ChatError;

/// Everything a responder sees for one turn. Owned, so the engine is free
/// to take further intents while a reply is being produced.
#[derive(Debug, Clone)]
pub struct ResponderRequest {
    pub phase: ChatPhase,
    pub messages: Vec<Message>,
    /// Free-form user messages so far, including the one being answered.
    pub user_turns: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResponderReply {
    pub content: String,
    pub intent: Option<String>,
    /// Ask the engine to move on to the structured questions now.
    pub ready_for_questions: bool,
}

pub trait ChatResponder: Send + Sync {
    fn respond<'a>(
        &'a self,
        request: &'a ResponderRequest,
    ) -> BoxFuture<'a, Result<ResponderReply, ChatError>>;
}

const DEFAULT_FOLLOW_UPS: [&str; 2] = [
    "Thank you for sharing that. When did you first notice this, and how is it \
     showing up in day-to-day life?",
    "That's really helpful. Is there anything else you'd like me to know before \
     a few quick questions?",
];

const CLOSING_FOLLOW_UP: &str = "Thank you. I've noted that.";

/// Deterministic replies, one per free-form turn. Used offline and in tests.
#[derive(Debug, Clone)]
pub struct ScriptedResponder {
    follow_ups: Vec<String>,
    ready_after: Option<usize>,
}

impl ScriptedResponder {
    pub fn new<I, S>(follow_ups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            follow_ups: follow_ups.into_iter().map(Into::into).collect(),
            ready_after: None,
        }
    }

    /// Signal readiness for the structured questions after `turns` turns.
    pub fn ready_after(mut self, turns: usize) -> Self {
        self.ready_after = Some(turns);
        self
    }
}

impl Default for ScriptedResponder {
    fn default() -> Self {
        Self::new(DEFAULT_FOLLOW_UPS)
    }
}

impl ChatResponder for ScriptedResponder {
    fn respond<'a>(
        &'a self,
        request: &'a ResponderRequest,
    ) -> BoxFuture<'a, Result<ResponderReply, ChatError>> {
        Box::pin(async move {
            let index = request.user_turns.saturating_sub(1);
            let content = self
                .follow_ups
                .get(index)
                .cloned()
                .unwrap_or_else(|| CLOSING_FOLLOW_UP.to_string());
            Ok(ResponderReply {
                content,
                intent: Some("follow_up".to_string()),
                ready_for_questions: self.ready_after.is_some_and(|n| request.user_turns >= n),
            })
        })
    }
}
