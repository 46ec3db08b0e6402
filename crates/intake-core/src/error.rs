use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("timestamp arithmetic failed: {0}")]
    Time(#[from] jiff::Error),

    #[error("session lifetime of {days} days is out of range")]
    InvalidTtl { days: i64 },

    #[error("invalid session id: {0}")]
    InvalidSessionId(#[from] uuid::Error),

    #[error("unknown choice '{value}' for {field}")]
    UnknownChoice { field: &'static str, value: String },
}
