use intake_core::models::message::ChatPhase;
use intake_questions::error::QuestionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error("responder failed: {0}")]
    Responder(String),

    #[error("{intent} is not accepted while the chat is in {phase:?}")]
    InvalidIntent {
        intent: &'static str,
        phase: ChatPhase,
    },

    #[error("message is empty")]
    EmptyMessage,
}
