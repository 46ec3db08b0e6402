//! intake-sync
//!
//! Reconciles a locally completed onboarding session with the remote system
//! of record. Local progress is authoritative; when the remote side is
//! missing records, the reconciler replays every mutation in a fixed order.

pub mod error;
pub mod local;
pub mod reconcile;
pub mod remote;

pub use crate::error::SyncError;
pub use crate::local::LocalRecords;
pub use crate::reconcile::{SyncReconciler, SyncReport, SyncState, SyncStep, SyncStepError, plan};
pub use crate::remote::{IntakeRecords, RemoteProgress};
