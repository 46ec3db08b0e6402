use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const MAX_KEY_CONCERNS: usize = 3;
pub const MAX_RECOMMENDED_FOCUS: usize = 5;

/// The normalized result of a completed assessment, consumed by the rest of
/// the onboarding flow. Always derived from the collected answers, never
/// edited directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AssessmentSummary {
    pub key_concerns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_name: Option<String>,
    pub recommended_focus: Vec<String>,
    pub generated_at: jiff::Timestamp,
    pub source: SummarySource,
    pub metadata: SummaryMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum SummarySource {
    Chat,
    Form,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SummaryMetadata {
    /// Human-readable duration label, e.g. "3-6 months".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concern_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concern_severity: Option<u8>,
    pub daily_life_impact: DailyLifeImpact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_events: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub therapy_goals: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailyLifeImpact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appetite: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<String>,
}

impl AssessmentSummary {
    /// Everything except `generated_at`, for comparing two syntheses.
    pub fn content_eq(&self, other: &Self) -> bool {
        self.key_concerns == other.key_concerns
            && self.child_name == other.child_name
            && self.recommended_focus == other.recommended_focus
            && self.source == other.source
            && self.metadata == other.metadata
    }
}
