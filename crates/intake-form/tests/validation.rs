use intake_core::models::form::{ConcernDuration, FormDraft};
use intake_form::pages::{validate_page, Page2Fields, Page3Fields};
use intake_form::{FormField, FormPage};
use validator::Validate;

fn page1(concerns: &str, severity: u8) -> FormDraft {
    FormDraft {
        primary_concerns: Some(concerns.to_string()),
        concern_duration: Some(ConcernDuration::LessThanOneMonth),
        concern_severity: Some(severity),
        ..Default::default()
    }
}

#[test]
fn severity_bounds() {
    for severity in [1, 5] {
        assert!(validate_page(FormPage::One, &page1("Worried about sleep", severity)).is_empty());
    }
    for severity in [0, 6] {
        let errors = validate_page(FormPage::One, &page1("Worried about sleep", severity));
        assert_eq!(errors.keys().collect::<Vec<_>>(), vec![&FormField::ConcernSeverity]);
    }
}

#[test]
fn primary_concerns_length_bounds() {
    assert!(validate_page(FormPage::One, &page1("0123456789", 3)).is_empty());
    assert!(validate_page(FormPage::One, &page1(&"x".repeat(2000), 3)).is_empty());

    let short = validate_page(FormPage::One, &page1("too short", 3));
    assert!(short.contains_key(&FormField::PrimaryConcerns));
    let long = validate_page(FormPage::One, &page1(&"x".repeat(2001), 3));
    assert!(long.contains_key(&FormField::PrimaryConcerns));
}

#[test]
fn page_one_requires_every_field() {
    let errors = validate_page(FormPage::One, &FormDraft::default());
    assert_eq!(errors.len(), 3);
    assert_eq!(
        errors[&FormField::ConcernDuration],
        "Please choose how long this has been going on"
    );
}

#[test]
fn page_two_accepts_empty_object() {
    let page: Page2Fields = serde_json::from_str("{}").unwrap();
    assert!(page.validate().is_ok());
    assert!(validate_page(FormPage::Two, &FormDraft::default()).is_empty());
}

#[test]
fn page_three_rules() {
    let page: Page3Fields = serde_json::from_str(r#"{"therapyGoals":"Feel calmer at bedtime"}"#).unwrap();
    assert!(page.validate().is_ok());

    let missing = validate_page(FormPage::Three, &FormDraft::default());
    assert!(missing.contains_key(&FormField::TherapyGoals));
    assert!(!missing.contains_key(&FormField::RecentEvents));

    let draft = FormDraft {
        therapy_goals: Some("Feel calmer at bedtime".to_string()),
        recent_events: Some("e".repeat(1001)),
        ..Default::default()
    };
    let errors = validate_page(FormPage::Three, &draft);
    assert_eq!(errors.keys().collect::<Vec<_>>(), vec![&FormField::RecentEvents]);
}
