//! intake-core
//!
//! Pure domain types and persisted key conventions for the assessment intake.
//! No storage or transport dependency. This is the shared vocabulary of the
//! chat engine, the form engine, the summary synthesizer and the sync
//! reconciler.

pub mod crisis;
pub mod error;
pub mod keys;
pub mod models;

use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Walk the full error chain and join all causes into one string.
pub fn format_err_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}
