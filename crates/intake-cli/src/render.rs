//! Plain-text rendering for the terminal.

use intake_chat::ChatSnapshot;
use intake_core::models::form::{
    AppetiteChanges, Choice, ConcernDuration, FormDraft, SchoolPerformance, SleepPatterns,
    SocialRelationships, severity_label, SEVERITY_LABELS,
};
use intake_core::models::message::Sender;
use intake_core::models::onboarding::Coverage;
use intake_core::models::summary::AssessmentSummary;
use intake_form::{FormField, FormSnapshot};

/// Print messages past `shown`, returning the new count.
pub fn messages(snapshot: &ChatSnapshot, shown: usize) -> usize {
    for message in snapshot.messages.iter().skip(shown) {
        match message.sender {
            Sender::User => {}
            Sender::Ai => println!("\n{}", message.content),
            Sender::System => {
                println!();
                for line in message.content.lines() {
                    println!("!! {line}");
                }
            }
        }
    }
    snapshot.messages.len()
}

pub fn question_prompt(snapshot: &ChatSnapshot) {
    let Some(question) = &snapshot.current_question else {
        return;
    };
    if snapshot.draft.is_some() {
        println!("  (type your answer, /cancel to pick an option instead)");
        return;
    }
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }
    if question.allow_other {
        println!("  o) Something else");
    }
}

pub fn summary(summary: &AssessmentSummary) {
    println!("\n== Assessment summary ==");
    if let Some(name) = &summary.child_name {
        println!("Child: {name}");
    }
    println!("Key concerns:");
    for concern in &summary.key_concerns {
        println!("  - {concern}");
    }
    println!("Recommended focus:");
    for focus in &summary.recommended_focus {
        println!("  - {focus}");
    }
    let meta = &summary.metadata;
    if let Some(duration) = &meta.concern_duration {
        println!("Duration: {duration}");
    }
    if let Some(label) = meta.concern_severity.and_then(severity_label) {
        println!("Severity: {label}");
    }
    println!("Generated: {}", summary.generated_at);
}

pub fn page(snapshot: &FormSnapshot) {
    println!("\n-- Page {} of 3 --", snapshot.page.number());
    for field in FormField::on_page(snapshot.page) {
        let value = field_value(&snapshot.draft, field).unwrap_or_else(|| "-".to_string());
        println!("{:<22} {value}", field.key());
        if let Some(choices) = choices(field) {
            println!("{:<22} options: {}", "", choices.join(" | "));
        }
        if let Some(error) = snapshot.errors.get(&field) {
            println!("{:<22} ! {error}", "");
        }
    }
    println!("(field = value, /next, /back, /submit, /chat, /quit)");
}

/// Display labels for a choice field, `None` for free text.
pub fn choices(field: FormField) -> Option<Vec<String>> {
    Some(match field {
        FormField::ConcernDuration => ConcernDuration::labels(),
        FormField::ConcernSeverity => SEVERITY_LABELS.iter().map(|l| l.to_string()).collect(),
        FormField::SleepPatterns => SleepPatterns::labels(),
        FormField::AppetiteChanges => AppetiteChanges::labels(),
        FormField::SchoolPerformance => SchoolPerformance::labels(),
        FormField::SocialRelationships => SocialRelationships::labels(),
        FormField::PrimaryConcerns | FormField::RecentEvents | FormField::TherapyGoals => {
            return None;
        }
    })
}

fn field_value(draft: &FormDraft, field: FormField) -> Option<String> {
    match field {
        FormField::PrimaryConcerns => draft.primary_concerns.clone(),
        FormField::ConcernDuration => draft.concern_duration.map(|c| c.label().to_string()),
        FormField::ConcernSeverity => draft
            .concern_severity
            .and_then(severity_label)
            .map(str::to_string),
        FormField::SleepPatterns => draft.sleep_patterns.map(|c| c.label().to_string()),
        FormField::AppetiteChanges => draft.appetite_changes.map(|c| c.label().to_string()),
        FormField::SchoolPerformance => draft.school_performance.map(|c| c.label().to_string()),
        FormField::SocialRelationships => draft.social_relationships.map(|c| c.label().to_string()),
        FormField::RecentEvents => draft.recent_events.clone(),
        FormField::TherapyGoals => draft.therapy_goals.clone(),
    }
}

/// Coverage line for status output. Member IDs are always masked.
pub fn coverage(coverage: &Coverage) -> String {
    match coverage {
        Coverage::SelfPay => "self-pay".to_string(),
        Coverage::Insurance(insurance) => {
            format!("{} ({})", insurance.provider, insurance.masked_member_id())
        }
    }
}
