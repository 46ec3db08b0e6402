//! intake-form
//!
//! The three-page form assessment. Pages validate on blur and gate forward
//! navigation; blurs also queue a debounced save of the whole page.

pub mod autosave;
pub mod engine;
pub mod error;
pub mod fields;
pub mod pages;
pub mod session;

pub use crate::autosave::{AutoSaver, AutosaveSettings, PageSave};
pub use crate::engine::{FormCompleted, FormEngine, FormIntent, FormSnapshot};
pub use crate::error::FormError;
pub use crate::fields::{FieldErrors, FieldValue, FormField, FormPage};
pub use crate::session::{resume_or_new, FormSession};
