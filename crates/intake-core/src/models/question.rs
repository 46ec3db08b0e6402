use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single fixed-choice question with an optional free-text escape hatch.
/// Immutable; defined by question-bank configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StructuredQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionCategory,
    pub question: String,
    pub options: Vec<String>,
    pub allow_other: bool,
}

/// What part of the assessment a structured question collects. Each
/// category corresponds to one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum QuestionCategory {
    ConcernDuration,
    ConcernSeverity,
    SleepPatterns,
    AppetiteChanges,
    SchoolPerformance,
    SocialRelationships,
    RecentEvents,
    TherapyGoals,
}

impl StructuredQuestion {
    pub fn has_option(&self, answer: &str) -> bool {
        self.options.iter().any(|o| o == answer)
    }

    pub fn option_index(&self, answer: &str) -> Option<usize> {
        self.options.iter().position(|o| o == answer)
    }
}
