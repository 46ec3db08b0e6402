//! intake-chat
//!
//! The conversational assessment: a message-driven state machine that moves
//! a parent from open conversation through the structured questions to a
//! finished summary, scanning every message for crisis language on the way.

pub mod crisis;
pub mod engine;
pub mod error;
pub mod policy;
pub mod responder;
pub mod session;

use std::time::Duration;

pub use crate::crisis::{CrisisClassifier, CrisisMatch, KeywordClassifier};
pub use crate::engine::{ChatIntent, ChatSnapshot, Completed, ConversationEngine};
pub use crate::error::ChatError;
pub use crate::policy::{CompletenessPolicy, RequiredQuestions};
pub use crate::responder::{ChatResponder, ResponderReply, ResponderRequest, ScriptedResponder};
pub use crate::session::{resume_or_new, ChatSession};

/// How long a submitted answer stays in the recording phase before the
/// next question opens.
pub const RECORDING_DELAY: Duration = Duration::from_millis(200);

/// Free-form turns before the structured questions start, unless the
/// responder asks for them sooner.
pub const MIN_FREEFORM_TURNS: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct ChatSettings {
    pub recording_delay: Duration,
    pub min_freeform_turns: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            recording_delay: RECORDING_DELAY,
            min_freeform_turns: MIN_FREEFORM_TURNS,
        }
    }
}
