//! intake-summary
//!
//! Pure transforms over collected assessment data: the summary synthesizer
//! and the bridge that carries answers between the chat and form modes.
//! Deterministic and offline so results are reproducible in tests.

pub mod bridge;
pub mod concerns;
pub mod focus;

use intake_core::models::form::{Choice, FormAssessmentInput, FormDraft};
use intake_core::models::summary::{
    AssessmentSummary, DailyLifeImpact, SummaryMetadata, SummarySource,
};

use crate::bridge::{chat_to_form, ExtractedChatState};

/// Summarize a validated form submission.
pub fn form_to_summary(input: &FormAssessmentInput, child_name: Option<&str>) -> AssessmentSummary {
    synthesize_at(
        &FormDraft::from(input),
        SummarySource::Form,
        child_name,
        jiff::Timestamp::now(),
    )
}

/// Summarize what the conversation collected.
pub fn chat_to_summary(state: &ExtractedChatState, child_name: Option<&str>) -> AssessmentSummary {
    synthesize_at(
        &chat_to_form(state),
        SummarySource::Chat,
        child_name,
        jiff::Timestamp::now(),
    )
}

/// Build a summary with an explicit timestamp. Identical inputs always
/// produce identical output.
pub fn synthesize_at(
    draft: &FormDraft,
    source: SummarySource,
    child_name: Option<&str>,
    generated_at: jiff::Timestamp,
) -> AssessmentSummary {
    let key_concerns = draft
        .primary_concerns
        .as_deref()
        .map(concerns::extract_key_concerns)
        .unwrap_or_default();
    let recommended_focus = focus::recommended_focus(draft);

    tracing::debug!(
        ?source,
        key_concerns = key_concerns.len(),
        recommended_focus = recommended_focus.len(),
        "assessment summary synthesized"
    );

    AssessmentSummary {
        key_concerns,
        child_name: child_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        recommended_focus,
        generated_at,
        source,
        metadata: metadata(draft),
    }
}

fn metadata(draft: &FormDraft) -> SummaryMetadata {
    SummaryMetadata {
        concern_duration: draft.concern_duration.map(|d| d.label().to_string()),
        concern_severity: draft.concern_severity,
        daily_life_impact: DailyLifeImpact {
            sleep: draft.sleep_patterns.map(|v| v.label().to_string()),
            appetite: draft.appetite_changes.map(|v| v.label().to_string()),
            school: draft.school_performance.map(|v| v.label().to_string()),
            social: draft.social_relationships.map(|v| v.label().to_string()),
        },
        recent_events: non_blank(draft.recent_events.as_deref()),
        therapy_goals: non_blank(draft.therapy_goals.as_deref()),
    }
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
