use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// A closed set of answers shared by the form and the structured questions.
/// `value` is the persisted wire form, `label` the human-readable text shown
/// as a question option.
pub trait Choice: Sized + Copy + 'static {
    const FIELD: &'static str;

    fn all() -> &'static [Self];

    fn value(&self) -> &'static str;

    fn label(&self) -> &'static str;

    /// Accepts either the wire value or the label, case-insensitively.
    fn parse(input: &str) -> Result<Self, CoreError> {
        let needle = input.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.value().eq_ignore_ascii_case(needle) || c.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CoreError::UnknownChoice {
                field: Self::FIELD,
                value: needle.to_string(),
            })
    }

    fn labels() -> Vec<String> {
        Self::all().iter().map(|c| c.label().to_string()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum ConcernDuration {
    #[serde(rename = "less-than-1-month")]
    LessThanOneMonth,
    #[serde(rename = "1-3-months")]
    OneToThreeMonths,
    #[serde(rename = "3-6-months")]
    ThreeToSixMonths,
    #[serde(rename = "6-plus-months")]
    SixPlusMonths,
}

impl Choice for ConcernDuration {
    const FIELD: &'static str = "concernDuration";

    fn all() -> &'static [Self] {
        &[
            Self::LessThanOneMonth,
            Self::OneToThreeMonths,
            Self::ThreeToSixMonths,
            Self::SixPlusMonths,
        ]
    }

    fn value(&self) -> &'static str {
        match self {
            Self::LessThanOneMonth => "less-than-1-month",
            Self::OneToThreeMonths => "1-3-months",
            Self::ThreeToSixMonths => "3-6-months",
            Self::SixPlusMonths => "6-plus-months",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::LessThanOneMonth => "Less than 1 month",
            Self::OneToThreeMonths => "1-3 months",
            Self::ThreeToSixMonths => "3-6 months",
            Self::SixPlusMonths => "More than 6 months",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SleepPatterns {
    Normal,
    DifficultyFallingAsleep,
    FrequentWaking,
    SleepingMore,
}

impl SleepPatterns {
    pub fn is_disrupted(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl Choice for SleepPatterns {
    const FIELD: &'static str = "sleepPatterns";

    fn all() -> &'static [Self] {
        &[
            Self::Normal,
            Self::DifficultyFallingAsleep,
            Self::FrequentWaking,
            Self::SleepingMore,
        ]
    }

    fn value(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::DifficultyFallingAsleep => "difficulty-falling-asleep",
            Self::FrequentWaking => "frequent-waking",
            Self::SleepingMore => "sleeping-more",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Sleeping normally",
            Self::DifficultyFallingAsleep => "Trouble falling asleep",
            Self::FrequentWaking => "Waking often during the night",
            Self::SleepingMore => "Sleeping much more than usual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum AppetiteChanges {
    NoChange,
    EatingLess,
    EatingMore,
}

impl Choice for AppetiteChanges {
    const FIELD: &'static str = "appetiteChanges";

    fn all() -> &'static [Self] {
        &[Self::NoChange, Self::EatingLess, Self::EatingMore]
    }

    fn value(&self) -> &'static str {
        match self {
            Self::NoChange => "no-change",
            Self::EatingLess => "eating-less",
            Self::EatingMore => "eating-more",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::NoChange => "No change in appetite",
            Self::EatingLess => "Eating less than usual",
            Self::EatingMore => "Eating more than usual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SchoolPerformance {
    NoChange,
    SlightDecline,
    SignificantDecline,
    NotInSchool,
}

impl SchoolPerformance {
    pub fn is_declining(&self) -> bool {
        matches!(self, Self::SlightDecline | Self::SignificantDecline)
    }
}

impl Choice for SchoolPerformance {
    const FIELD: &'static str = "schoolPerformance";

    fn all() -> &'static [Self] {
        &[
            Self::NoChange,
            Self::SlightDecline,
            Self::SignificantDecline,
            Self::NotInSchool,
        ]
    }

    fn value(&self) -> &'static str {
        match self {
            Self::NoChange => "no-change",
            Self::SlightDecline => "slight-decline",
            Self::SignificantDecline => "significant-decline",
            Self::NotInSchool => "not-in-school",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::NoChange => "No change at school",
            Self::SlightDecline => "Grades or engagement slipping a little",
            Self::SignificantDecline => "Significant drop in grades or engagement",
            Self::NotInSchool => "Not currently in school",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SocialRelationships {
    NoChange,
    SomeWithdrawal,
    SignificantWithdrawal,
    IncreasedConflict,
}

impl SocialRelationships {
    pub fn is_withdrawn(&self) -> bool {
        matches!(self, Self::SomeWithdrawal | Self::SignificantWithdrawal)
    }
}

impl Choice for SocialRelationships {
    const FIELD: &'static str = "socialRelationships";

    fn all() -> &'static [Self] {
        &[
            Self::NoChange,
            Self::SomeWithdrawal,
            Self::SignificantWithdrawal,
            Self::IncreasedConflict,
        ]
    }

    fn value(&self) -> &'static str {
        match self {
            Self::NoChange => "no-change",
            Self::SomeWithdrawal => "some-withdrawal",
            Self::SignificantWithdrawal => "significant-withdrawal",
            Self::IncreasedConflict => "increased-conflict",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::NoChange => "No change with friends or family",
            Self::SomeWithdrawal => "Spending less time with friends",
            Self::SignificantWithdrawal => "Withdrawn from friends and family",
            Self::IncreasedConflict => "More conflict with others",
        }
    }
}

pub const SEVERITY_MIN: u8 = 1;
pub const SEVERITY_MAX: u8 = 5;

/// Option labels for the 1-5 severity scale, index 0 = severity 1.
pub const SEVERITY_LABELS: [&str; 5] = [
    "1 - Mild",
    "2 - Noticeable",
    "3 - Moderate",
    "4 - Serious",
    "5 - Severe",
];

pub fn severity_label(severity: u8) -> Option<&'static str> {
    if (SEVERITY_MIN..=SEVERITY_MAX).contains(&severity) {
        Some(SEVERITY_LABELS[usize::from(severity - 1)])
    } else {
        None
    }
}

/// Read a severity from free text: a leading digit in range wins, then an
/// exact label match.
pub fn parse_severity(text: &str) -> Option<u8> {
    let trimmed = text.trim();
    if let Some(d) = trimmed.chars().next().and_then(|c| c.to_digit(10)) {
        let value = d as u8;
        let single_digit = trimmed.chars().nth(1).is_none_or(|c| !c.is_ascii_digit());
        if single_digit && (SEVERITY_MIN..=SEVERITY_MAX).contains(&value) {
            return Some(value);
        }
        return None;
    }
    SEVERITY_LABELS
        .iter()
        .position(|l| l.eq_ignore_ascii_case(trimmed))
        .map(|i| i as u8 + 1)
}

/// Page 1: what is going on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page1 {
    pub primary_concerns: String,
    pub concern_duration: ConcernDuration,
    pub concern_severity: u8,
}

/// Page 2: impact on daily life. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page2 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_patterns: Option<SleepPatterns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appetite_changes: Option<AppetiteChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_performance: Option<SchoolPerformance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_relationships: Option<SocialRelationships>,
}

/// Page 3: context and goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Page3 {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_events: Option<String>,
    pub therapy_goals: String,
}

/// A fully validated form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FormAssessmentInput {
    pub primary_concerns: String,
    pub concern_duration: ConcernDuration,
    pub concern_severity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_patterns: Option<SleepPatterns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appetite_changes: Option<AppetiteChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_performance: Option<SchoolPerformance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_relationships: Option<SocialRelationships>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_events: Option<String>,
    pub therapy_goals: String,
}

impl FormAssessmentInput {
    pub fn from_pages(page1: Page1, page2: Page2, page3: Page3) -> Self {
        Self {
            primary_concerns: page1.primary_concerns,
            concern_duration: page1.concern_duration,
            concern_severity: page1.concern_severity,
            sleep_patterns: page2.sleep_patterns,
            appetite_changes: page2.appetite_changes,
            school_performance: page2.school_performance,
            social_relationships: page2.social_relationships,
            recent_events: page3.recent_events,
            therapy_goals: page3.therapy_goals,
        }
    }
}

/// `Partial<FormAssessmentInput>`: what the form holds while it is being
/// filled in, and what the mode bridge produces. Missing fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FormDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_concerns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concern_duration: Option<ConcernDuration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concern_severity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_patterns: Option<SleepPatterns>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appetite_changes: Option<AppetiteChanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school_performance: Option<SchoolPerformance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social_relationships: Option<SocialRelationships>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_events: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapy_goals: Option<String>,
}

impl From<&FormAssessmentInput> for FormDraft {
    fn from(input: &FormAssessmentInput) -> Self {
        Self {
            primary_concerns: Some(input.primary_concerns.clone()),
            concern_duration: Some(input.concern_duration),
            concern_severity: Some(input.concern_severity),
            sleep_patterns: input.sleep_patterns,
            appetite_changes: input.appetite_changes,
            school_performance: input.school_performance,
            social_relationships: input.social_relationships,
            recent_events: input.recent_events.clone(),
            therapy_goals: Some(input.therapy_goals.clone()),
        }
    }
}
