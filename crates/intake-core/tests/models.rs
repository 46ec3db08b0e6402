use intake_core::keys;
use intake_core::models::form::{
    parse_severity, severity_label, Choice, ConcernDuration, FormAssessmentInput, FormDraft,
    SchoolPerformance, SleepPatterns,
};
use intake_core::models::onboarding::{mask_identifier, InsuranceInfo};
use intake_core::models::response::{upsert_response, AssessmentResponse};
use intake_core::models::session::{OnboardingStep, Session, SessionStatus, SESSION_TTL_DAYS};
use uuid::Uuid;

fn ts(s: &str) -> jiff::Timestamp {
    s.parse().unwrap()
}

#[test]
fn session_expires_thirty_days_after_creation() {
    let created = ts("2026-01-01T00:00:00Z");
    let session = Session::new(Uuid::new_v4(), created, SESSION_TTL_DAYS).unwrap();

    assert_eq!(session.expires_at, ts("2026-01-31T00:00:00Z"));
    assert_eq!(session.status, SessionStatus::Started);
    assert!(!session.is_expired(ts("2026-01-30T23:59:59Z")));
    assert!(session.is_expired(ts("2026-01-31T00:00:00Z")));
}

#[test]
fn marking_steps_tracks_progress() {
    let mut session = Session::new(Uuid::new_v4(), jiff::Timestamp::now(), 30).unwrap();
    session.mark_step(OnboardingStep::ParentInfo);
    assert_eq!(session.status, SessionStatus::InProgress);
    assert!(!session.all_steps_complete());

    session.mark_step(OnboardingStep::ChildInfo);
    session.mark_step(OnboardingStep::Coverage);
    session.complete_assessment();
    assert!(session.all_steps_complete());
    assert_eq!(session.status, SessionStatus::AssessmentComplete);
}

#[test]
fn oversized_lifetime_is_an_error() {
    let now = ts("2026-01-01T00:00:00Z");
    for days in [i64::MAX / 2, i64::MAX, 500_000_000] {
        let err = Session::new(Uuid::new_v4(), now, days).unwrap_err();
        assert!(err.to_string().contains("out of range") || err.to_string().contains("timestamp"), "{err}");
    }
}

#[test]
fn reopening_assessment_clears_completion() {
    let mut session = Session::new(Uuid::new_v4(), jiff::Timestamp::now(), 30).unwrap();
    session.complete_assessment();
    session.reopen_assessment();

    assert_eq!(session.status, SessionStatus::InProgress);
    assert!(!session.is_step_complete(OnboardingStep::Assessment));
}

#[test]
fn session_serializes_with_kebab_status_and_camel_fields() {
    let mut session = Session::new(Uuid::nil(), ts("2026-01-01T00:00:00Z"), 30).unwrap();
    session.mark_step(OnboardingStep::ChildInfo);
    let json = serde_json::to_value(&session).unwrap();

    assert_eq!(json["status"], "in-progress");
    assert_eq!(json["progress"]["child_info"], true);
    assert!(json.get("expiresAt").is_some());
}

#[test]
fn keys_follow_session_scoped_layout() {
    let id = Uuid::nil();
    assert_eq!(
        keys::session(id),
        "onboarding_session_00000000-0000-0000-0000-000000000000"
    );
    assert_eq!(
        keys::summary(id),
        "assessment_summary_00000000-0000-0000-0000-000000000000"
    );
}

#[test]
fn choices_parse_from_value_or_label() {
    assert_eq!(
        ConcernDuration::parse("6-plus-months").unwrap(),
        ConcernDuration::SixPlusMonths
    );
    assert_eq!(
        ConcernDuration::parse("more than 6 months").unwrap(),
        ConcernDuration::SixPlusMonths
    );
    assert!(SleepPatterns::parse("sometimes").is_err());
    assert!(SchoolPerformance::SignificantDecline.is_declining());
    assert!(!SchoolPerformance::NotInSchool.is_declining());
}

#[test]
fn choice_values_match_serde_names() {
    for d in ConcernDuration::all() {
        let json = serde_json::to_value(d).unwrap();
        assert_eq!(json, d.value());
    }
    for s in SleepPatterns::all() {
        let json = serde_json::to_value(s).unwrap();
        assert_eq!(json, s.value());
    }
}

#[test]
fn severity_parsing() {
    assert_eq!(parse_severity("4 - Serious"), Some(4));
    assert_eq!(parse_severity("5"), Some(5));
    assert_eq!(parse_severity("0"), None);
    assert_eq!(parse_severity("6"), None);
    assert_eq!(parse_severity("10"), None);
    assert_eq!(parse_severity("3 - moderate"), Some(3));
    assert_eq!(severity_label(1), Some("1 - Mild"));
    assert_eq!(severity_label(6), None);
}

#[test]
fn member_ids_are_masked() {
    let info = InsuranceInfo {
        provider: "Acme Health".to_string(),
        member_id: "XJ99812345".to_string(),
        group_number: None,
    };
    assert_eq!(info.masked_member_id(), "******2345");
    assert_eq!(mask_identifier("123"), "****");
}

#[test]
fn upsert_replaces_existing_question() {
    let now = jiff::Timestamp::now();
    let mut responses = Vec::new();
    for text in ["first", "second"] {
        upsert_response(
            &mut responses,
            AssessmentResponse {
                question_id: "sleep_patterns".to_string(),
                response_text: text.to_string(),
                response_value: None,
                timestamp: now,
            },
        );
    }
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0].response_text, "second");
}

#[test]
fn draft_from_complete_input_keeps_every_field() {
    let input = FormAssessmentInput {
        primary_concerns: "Trouble sleeping and worrying a lot".to_string(),
        concern_duration: ConcernDuration::OneToThreeMonths,
        concern_severity: 3,
        sleep_patterns: Some(SleepPatterns::FrequentWaking),
        appetite_changes: None,
        school_performance: None,
        social_relationships: None,
        recent_events: None,
        therapy_goals: "Sleep through the night".to_string(),
    };
    let draft = FormDraft::from(&input);
    assert_eq!(draft.concern_severity, Some(3));
    assert_eq!(draft.sleep_patterns, Some(SleepPatterns::FrequentWaking));
    assert_eq!(draft.therapy_goals.as_deref(), Some("Sleep through the night"));
}
