//! Mode bridge: best-effort mapping between what the conversation collected
//! and the form's fields.
//!
//! Both directions are pure, so repeating a switch without edits yields the
//! same values. Neither direction touches the source mode's own history.

use std::collections::BTreeMap;

use intake_core::models::form::{
    parse_severity, severity_label, AppetiteChanges, Choice, ConcernDuration, FormDraft,
    SchoolPerformance, SleepPatterns, SocialRelationships, SEVERITY_MAX, SEVERITY_MIN,
};
use intake_core::models::question::QuestionCategory;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// What the conversation has established so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExtractedChatState {
    /// Free-form descriptions the parent wrote, in order.
    pub concerns: Vec<String>,
    /// Structured answers keyed by the form field they collect.
    pub answers: BTreeMap<QuestionCategory, ExtractedAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExtractedAnswer {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl ExtractedAnswer {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            value: None,
        }
    }
}

pub fn chat_to_form(state: &ExtractedChatState) -> FormDraft {
    let concerns: Vec<&str> = state
        .concerns
        .iter()
        .map(String::as_str)
        .filter(|c| !c.trim().is_empty())
        .collect();
    let answer = move |category: QuestionCategory| state.answers.get(&category);

    FormDraft {
        primary_concerns: (!concerns.is_empty()).then(|| concerns.join(" ")),
        concern_duration: answer(QuestionCategory::ConcernDuration)
            .and_then(|a| ConcernDuration::parse(&a.text).ok()),
        concern_severity: answer(QuestionCategory::ConcernSeverity).and_then(severity_of),
        sleep_patterns: answer(QuestionCategory::SleepPatterns)
            .and_then(|a| SleepPatterns::parse(&a.text).ok()),
        appetite_changes: answer(QuestionCategory::AppetiteChanges)
            .and_then(|a| AppetiteChanges::parse(&a.text).ok()),
        school_performance: answer(QuestionCategory::SchoolPerformance)
            .and_then(|a| SchoolPerformance::parse(&a.text).ok()),
        social_relationships: answer(QuestionCategory::SocialRelationships)
            .and_then(|a| SocialRelationships::parse(&a.text).ok()),
        recent_events: answer(QuestionCategory::RecentEvents).and_then(|a| free_text(&a.text)),
        therapy_goals: answer(QuestionCategory::TherapyGoals).and_then(|a| free_text(&a.text)),
    }
}

pub fn form_to_chat(draft: &FormDraft) -> ExtractedChatState {
    let mut answers = BTreeMap::new();

    if let Some(d) = draft.concern_duration {
        answers.insert(QuestionCategory::ConcernDuration, ExtractedAnswer::plain(d.label()));
    }
    if let Some(label) = draft.concern_severity.and_then(severity_label) {
        answers.insert(
            QuestionCategory::ConcernSeverity,
            ExtractedAnswer {
                text: label.to_string(),
                value: draft.concern_severity.map(f64::from),
            },
        );
    }
    if let Some(v) = draft.sleep_patterns {
        answers.insert(QuestionCategory::SleepPatterns, ExtractedAnswer::plain(v.label()));
    }
    if let Some(v) = draft.appetite_changes {
        answers.insert(QuestionCategory::AppetiteChanges, ExtractedAnswer::plain(v.label()));
    }
    if let Some(v) = draft.school_performance {
        answers.insert(QuestionCategory::SchoolPerformance, ExtractedAnswer::plain(v.label()));
    }
    if let Some(v) = draft.social_relationships {
        answers.insert(QuestionCategory::SocialRelationships, ExtractedAnswer::plain(v.label()));
    }
    if let Some(text) = draft.recent_events.as_deref().and_then(free_text) {
        answers.insert(QuestionCategory::RecentEvents, ExtractedAnswer::plain(text));
    }
    if let Some(text) = draft.therapy_goals.as_deref().and_then(free_text) {
        answers.insert(QuestionCategory::TherapyGoals, ExtractedAnswer::plain(text));
    }

    ExtractedChatState {
        concerns: draft
            .primary_concerns
            .iter()
            .filter(|c| !c.trim().is_empty())
            .cloned()
            .collect(),
        answers,
    }
}

fn severity_of(answer: &ExtractedAnswer) -> Option<u8> {
    let from_value = answer
        .value
        .filter(|v| v.fract() == 0.0 && (f64::from(SEVERITY_MIN)..=f64::from(SEVERITY_MAX)).contains(v))
        .map(|v| v as u8);
    from_value.or_else(|| parse_severity(&answer.text))
}

fn free_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
