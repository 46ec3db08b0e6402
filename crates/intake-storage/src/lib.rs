//! intake-storage
//!
//! Local-first persistence for onboarding sessions. A minimal key-value
//! interface with in-memory and file-backed bindings, and the session and
//! summary stores layered on top of it.

pub mod error;
pub mod file;
pub mod kv;
pub mod session;
pub mod summary;

pub use crate::error::StorageError;
pub use crate::file::FileStore;
pub use crate::kv::{KeyValueStore, MemoryStore};
pub use crate::session::{Persisted, SavedData, SessionSettings, SessionStore};
pub use crate::summary::StoredSummary;
