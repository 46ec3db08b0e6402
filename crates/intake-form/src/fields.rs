use std::collections::BTreeMap;

use intake_core::keys::section;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FormPage {
    One,
    Two,
    Three,
}

impl FormPage {
    pub const ALL: [FormPage; 3] = [FormPage::One, FormPage::Two, FormPage::Three];

    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// Section of the session document that holds this page.
    pub fn section(self) -> &'static str {
        match self {
            Self::One => section::FORM_PAGE_1,
            Self::Two => section::FORM_PAGE_2,
            Self::Three => section::FORM_PAGE_3,
        }
    }

    pub fn next(self) -> Option<Self> {
        match self {
            Self::One => Some(Self::Two),
            Self::Two => Some(Self::Three),
            Self::Three => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            Self::One => None,
            Self::Two => Some(Self::One),
            Self::Three => Some(Self::Two),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum FormField {
    PrimaryConcerns,
    ConcernDuration,
    ConcernSeverity,
    SleepPatterns,
    AppetiteChanges,
    SchoolPerformance,
    SocialRelationships,
    RecentEvents,
    TherapyGoals,
}

impl FormField {
    pub const ALL: [FormField; 9] = [
        FormField::PrimaryConcerns,
        FormField::ConcernDuration,
        FormField::ConcernSeverity,
        FormField::SleepPatterns,
        FormField::AppetiteChanges,
        FormField::SchoolPerformance,
        FormField::SocialRelationships,
        FormField::RecentEvents,
        FormField::TherapyGoals,
    ];

    /// Fields shown on one page, in display order.
    pub fn on_page(page: FormPage) -> impl Iterator<Item = FormField> {
        Self::ALL.into_iter().filter(move |f| f.page() == page)
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::PrimaryConcerns => "primary_concerns",
            Self::ConcernDuration => "concern_duration",
            Self::ConcernSeverity => "concern_severity",
            Self::SleepPatterns => "sleep_patterns",
            Self::AppetiteChanges => "appetite_changes",
            Self::SchoolPerformance => "school_performance",
            Self::SocialRelationships => "social_relationships",
            Self::RecentEvents => "recent_events",
            Self::TherapyGoals => "therapy_goals",
        }
    }

    pub fn page(self) -> FormPage {
        match self {
            Self::PrimaryConcerns | Self::ConcernDuration | Self::ConcernSeverity => FormPage::One,
            Self::SleepPatterns
            | Self::AppetiteChanges
            | Self::SchoolPerformance
            | Self::SocialRelationships => FormPage::Two,
            Self::RecentEvents | Self::TherapyGoals => FormPage::Three,
        }
    }

    /// Resolve a validation error key. Accepts the struct field name or its
    /// camelCase wire name.
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "primary_concerns" | "primaryConcerns" => Self::PrimaryConcerns,
            "concern_duration" | "concernDuration" => Self::ConcernDuration,
            "concern_severity" | "concernSeverity" => Self::ConcernSeverity,
            "sleep_patterns" | "sleepPatterns" => Self::SleepPatterns,
            "appetite_changes" | "appetiteChanges" => Self::AppetiteChanges,
            "school_performance" | "schoolPerformance" => Self::SchoolPerformance,
            "social_relationships" | "socialRelationships" => Self::SocialRelationships,
            "recent_events" | "recentEvents" => Self::RecentEvents,
            "therapy_goals" | "therapyGoals" => Self::TherapyGoals,
            _ => return None,
        })
    }
}

/// A raw edit from the UI. Choice text may be the wire value or the label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
#[ts(export)]
pub enum FieldValue {
    Text(String),
    Choice(String),
    Severity(u8),
    Clear,
}

/// Current validation message per field. Only fields that were validated
/// and failed have an entry.
pub type FieldErrors = BTreeMap<FormField, String>;
