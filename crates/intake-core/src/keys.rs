//! Persisted key conventions.
//!
//! Pure string functions. These define the canonical layout of the
//! session-scoped JSON documents in the key-value store.

use uuid::Uuid;

pub fn session(id: Uuid) -> String {
    format!("onboarding_session_{id}")
}

pub fn summary(id: Uuid) -> String {
    format!("assessment_summary_{id}")
}

/// Section names inside the `onboarding_session_{id}` document.
pub mod section {
    pub const SESSION: &str = "session";
    pub const PARENT_INFO: &str = "parent_info";
    pub const CHILD_INFO: &str = "child_info";
    pub const COVERAGE: &str = "coverage";
    pub const CHAT: &str = "chat";
    pub const FORM_PAGE_1: &str = "form_page_1";
    pub const FORM_PAGE_2: &str = "form_page_2";
    pub const FORM_PAGE_3: &str = "form_page_3";
    pub const ASSESSMENT_RESPONSES: &str = "assessment_responses";
}
