use thiserror::Error;

use crate::reconcile::SyncState;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote call failed: {0}")]
    Remote(String),

    #[error("remote rejected {operation}: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },

    #[error("local record missing: {section}")]
    MissingRecord { section: &'static str },

    #[error("cannot {action} while {state:?}")]
    InvalidState {
        action: &'static str,
        state: SyncState,
    },

    #[error("storage error: {0}")]
    Storage(#[from] intake_storage::StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
