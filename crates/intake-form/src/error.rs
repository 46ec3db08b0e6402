use intake_core::error::CoreError;
use thiserror::Error;

use crate::fields::{FormField, FormPage};

#[derive(Debug, Error)]
pub enum FormError {
    #[error("{field:?} is not on page {page:?}")]
    FieldNotOnPage { field: FormField, page: FormPage },

    #[error("{field:?} does not take a {kind} value")]
    WrongValueKind { field: FormField, kind: &'static str },

    #[error(transparent)]
    Choice(#[from] CoreError),

    #[error("the form can only be submitted from the last page")]
    NotLastPage,
}
