//! Recommended-focus rules, applied in precedence order.

use intake_core::models::form::{ConcernDuration, FormDraft, SEVERITY_MAX};
use intake_core::models::summary::MAX_RECOMMENDED_FOCUS;

pub const PRIORITY_FOCUS: &str = "Priority: severe impact reported, prompt clinical follow-up";
pub const LONG_STANDING_FOCUS: &str = "Long-standing concerns (more than 6 months)";
pub const SLEEP_FOCUS: &str = "Sleep and bedtime routines";
pub const SCHOOL_FOCUS: &str = "School and academic support";
pub const SOCIAL_FOCUS: &str = "Social connection and peer relationships";
pub const DEFAULT_FOCUS: &str = "General emotional wellbeing";

/// Therapy-goal keywords and the focus entry each topic produces. Keywords
/// are matched as lowercase substrings, so stems like "depress" cover
/// "depressed" and "depression".
const GOAL_TOPICS: &[(&[&str], &str)] = &[
    (
        &["anxiety", "anxious", "worr", "panic", "nervous", "fear"],
        "Anxiety and worry management",
    ),
    (
        &["depress", "sad", "low mood", "hopeless", "crying"],
        "Mood and depression support",
    ),
    (
        &["anger", "angry", "tantrum", "behavior", "behaviour", "aggress", "meltdown"],
        "Emotional regulation and behavior",
    ),
    (
        &["focus", "attention", "adhd", "concentrat"],
        "Attention and focus",
    ),
    (
        &["trauma", "grief", "loss", "divorce"],
        "Coping with loss and major changes",
    ),
    (
        &["confidence", "self-esteem", "self esteem"],
        "Self-esteem and confidence",
    ),
];

/// Focus entries for a draft, never empty and capped at five.
pub fn recommended_focus(draft: &FormDraft) -> Vec<String> {
    let mut focus: Vec<&str> = Vec::new();

    if draft.concern_severity == Some(SEVERITY_MAX) {
        focus.push(PRIORITY_FOCUS);
    }
    if draft.concern_duration == Some(ConcernDuration::SixPlusMonths) {
        focus.push(LONG_STANDING_FOCUS);
    }
    if draft.sleep_patterns.is_some_and(|s| s.is_disrupted()) {
        focus.push(SLEEP_FOCUS);
    }
    if draft.school_performance.is_some_and(|s| s.is_declining()) {
        focus.push(SCHOOL_FOCUS);
    }
    if draft.social_relationships.is_some_and(|s| s.is_withdrawn()) {
        focus.push(SOCIAL_FOCUS);
    }
    if let Some(goals) = draft.therapy_goals.as_deref() {
        focus.extend(goal_topics(goals));
    }
    if focus.is_empty() {
        focus.push(DEFAULT_FOCUS);
    }

    focus.truncate(MAX_RECOMMENDED_FOCUS);
    focus.into_iter().map(str::to_string).collect()
}

fn goal_topics(goals: &str) -> impl Iterator<Item = &'static str> {
    let lowered = goals.to_lowercase();
    GOAL_TOPICS
        .iter()
        .filter(move |(keywords, _)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(_, entry)| *entry)
}
