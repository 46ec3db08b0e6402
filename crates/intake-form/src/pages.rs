//! Per-page field sets and their validation rules. These are also the
//! documents persisted under `form_page_1..3`.

use intake_core::models::form::{
    AppetiteChanges, ConcernDuration, FormDraft, Page1, Page2, Page3, SchoolPerformance,
    SleepPatterns, SocialRelationships,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::fields::{FieldErrors, FormField, FormPage};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Page1Fields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Please describe what's been concerning you"),
        length(min = 10, max = 2000, message = "Please write between 10 and 2000 characters")
    )]
    pub primary_concerns: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(required(message = "Please choose how long this has been going on"))]
    pub concern_duration: Option<ConcernDuration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Please rate how severe the concerns are"),
        range(min = 1, max = 5, message = "Severity must be between 1 and 5")
    )]
    pub concern_severity: Option<u8>,
}

/// Every field on page 2 is optional, so it always validates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Page2Fields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_patterns: Option<SleepPatterns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appetite_changes: Option<AppetiteChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_performance: Option<SchoolPerformance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_relationships: Option<SocialRelationships>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Page3Fields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000, message = "Please keep this under 1000 characters"))]
    pub recent_events: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(
        required(message = "Please tell us what you hope therapy will help with"),
        length(min = 10, max = 1000, message = "Please write between 10 and 1000 characters")
    )]
    pub therapy_goals: Option<String>,
}

impl Page1Fields {
    pub fn from_draft(draft: &FormDraft) -> Self {
        Self {
            primary_concerns: draft.primary_concerns.clone(),
            concern_duration: draft.concern_duration,
            concern_severity: draft.concern_severity,
        }
    }

    pub fn apply(&self, draft: &mut FormDraft) {
        draft.primary_concerns = self.primary_concerns.clone();
        draft.concern_duration = self.concern_duration;
        draft.concern_severity = self.concern_severity;
    }

    /// The validated page. `None` when a required field is missing.
    pub fn to_page(&self) -> Option<Page1> {
        Some(Page1 {
            primary_concerns: self.primary_concerns.clone()?,
            concern_duration: self.concern_duration?,
            concern_severity: self.concern_severity?,
        })
    }
}

impl Page2Fields {
    pub fn from_draft(draft: &FormDraft) -> Self {
        Self {
            sleep_patterns: draft.sleep_patterns,
            appetite_changes: draft.appetite_changes,
            school_performance: draft.school_performance,
            social_relationships: draft.social_relationships,
        }
    }

    pub fn apply(&self, draft: &mut FormDraft) {
        draft.sleep_patterns = self.sleep_patterns;
        draft.appetite_changes = self.appetite_changes;
        draft.school_performance = self.school_performance;
        draft.social_relationships = self.social_relationships;
    }

    pub fn to_page(&self) -> Page2 {
        Page2 {
            sleep_patterns: self.sleep_patterns,
            appetite_changes: self.appetite_changes,
            school_performance: self.school_performance,
            social_relationships: self.social_relationships,
        }
    }
}

impl Page3Fields {
    pub fn from_draft(draft: &FormDraft) -> Self {
        Self {
            recent_events: draft.recent_events.clone(),
            therapy_goals: draft.therapy_goals.clone(),
        }
    }

    pub fn apply(&self, draft: &mut FormDraft) {
        draft.recent_events = self.recent_events.clone();
        draft.therapy_goals = self.therapy_goals.clone();
    }

    pub fn to_page(&self) -> Option<Page3> {
        Some(Page3 {
            recent_events: self
                .recent_events
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            therapy_goals: self.therapy_goals.clone()?,
        })
    }
}

/// Validate one page of a draft. Returns the failing fields with their
/// first message.
pub fn validate_page(page: FormPage, draft: &FormDraft) -> FieldErrors {
    let result = match page {
        FormPage::One => Page1Fields::from_draft(draft).validate(),
        FormPage::Two => Page2Fields::from_draft(draft).validate(),
        FormPage::Three => Page3Fields::from_draft(draft).validate(),
    };
    match result {
        Ok(()) => FieldErrors::new(),
        Err(errors) => field_errors(&errors),
    }
}

/// Serialized snapshot of one page, for autosave.
pub fn page_snapshot(page: FormPage, draft: &FormDraft) -> Result<serde_json::Value, serde_json::Error> {
    match page {
        FormPage::One => serde_json::to_value(Page1Fields::from_draft(draft)),
        FormPage::Two => serde_json::to_value(Page2Fields::from_draft(draft)),
        FormPage::Three => serde_json::to_value(Page3Fields::from_draft(draft)),
    }
}

fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .filter_map(|(key, errs)| {
            let field = FormField::from_key(&*key)?;
            let first = errs.first()?;
            let message = first
                .message
                .as_deref()
                .map(str::to_string)
                .unwrap_or_else(|| first.code.to_string());
            Some((field, message))
        })
        .collect()
}
