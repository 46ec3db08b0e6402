use intake_cli::commands::{self, parse_edit, App, RecordKind};
use intake_cli::config::IntakeConfig;
use intake_core::keys::section;
use intake_core::models::form::ConcernDuration;
use intake_core::models::onboarding::ChildInfo;
use intake_core::models::session::{OnboardingStep, SessionStatus};
use intake_core::models::summary::SummarySource;
use intake_form::{FieldValue, FormField};
use uuid::Uuid;

fn app(dir: &tempfile::TempDir) -> App {
    App::new(IntakeConfig {
        storage_dir: dir.path().join("sessions"),
        recording_delay_ms: 10,
        ..IntakeConfig::default()
    })
}

#[test]
fn edits_parse_by_field_kind() {
    assert_eq!(
        parse_edit("concern_severity = 4").unwrap(),
        (FormField::ConcernSeverity, FieldValue::Severity(4))
    );
    assert_eq!(
        parse_edit("concernDuration = 2").unwrap(),
        (FormField::ConcernDuration, FieldValue::Choice("1-3 months".to_string()))
    );
    assert_eq!(
        parse_edit("sleep_patterns = trouble-falling-asleep").unwrap(),
        (
            FormField::SleepPatterns,
            FieldValue::Choice("trouble-falling-asleep".to_string())
        )
    );
    assert_eq!(
        parse_edit("recent_events =").unwrap(),
        (FormField::RecentEvents, FieldValue::Clear)
    );
    assert!(parse_edit("concern_severity = severe").is_err());
    assert!(parse_edit("favourite_colour = blue").is_err());
    assert!(parse_edit("no equals sign").is_err());
}

#[tokio::test]
async fn scripted_form_run_persists_a_summary() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    let id = Uuid::new_v4();
    let script = "\
primary_concerns = My child has anxiety at school for months
concern_duration = 3-6 months
concern_severity = 4
/next
/next
therapy_goals = help with anxiety
/submit
";

    commands::assess(&app, id, true, script.as_bytes()).await.unwrap();

    let stored = app.store.load_summary(id).expect("summary saved");
    assert_eq!(stored.summary.source, SummarySource::Form);
    assert_eq!(stored.summary.metadata.concern_severity, Some(4));
    assert_eq!(stored.form_data.concern_duration, Some(ConcernDuration::ThreeToSixMonths));
    assert_eq!(app.store.open(id).unwrap().status, SessionStatus::AssessmentComplete);
}

#[tokio::test]
async fn quitting_the_form_keeps_the_typed_page() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    let id = Uuid::new_v4();

    commands::assess(&app, id, true, "concern_severity = 2\n/quit\n".as_bytes())
        .await
        .unwrap();

    let page: serde_json::Value = app.store.load_section(id, section::FORM_PAGE_1).unwrap();
    assert_eq!(page["concernSeverity"], 2);
}

#[tokio::test]
async fn scripted_chat_run_reaches_the_summary() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    let id = Uuid::new_v4();
    let script = "\
He has been really anxious and worried about school
It started a few months ago and he cries most mornings
2
4
1
1
2
2
1
/quit
";

    commands::assess(&app, id, false, script.as_bytes()).await.unwrap();

    let stored = app.store.load_summary(id).expect("summary saved");
    assert_eq!(stored.summary.source, SummarySource::Chat);
    assert_eq!(stored.summary.metadata.concern_severity, Some(4));
    assert_eq!(app.store.open(id).unwrap().status, SessionStatus::AssessmentComplete);
}

#[tokio::test]
async fn chat_crisis_flag_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    let id = Uuid::new_v4();

    commands::assess(&app, id, false, "She told me she wants to die\n/quit\n".as_bytes())
        .await
        .unwrap();

    let chat: serde_json::Value = app.store.load_section(id, section::CHAT).unwrap();
    assert_eq!(chat["crisisDetected"], true);
}

#[tokio::test]
async fn switching_from_chat_carries_answers_into_the_form() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    let id = Uuid::new_v4();
    let script = "\
She refuses to go to school most days
It has been getting worse since spring
3
/form
concern_severity = 3
/quit
";

    commands::assess(&app, id, false, script.as_bytes()).await.unwrap();

    let page: serde_json::Value = app.store.load_section(id, section::FORM_PAGE_1).unwrap();
    assert_eq!(page["concernDuration"], "3-6-months");
    assert_eq!(page["concernSeverity"], 3);
}

#[tokio::test]
async fn reset_clears_session_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    let id = Uuid::new_v4();
    let script = "\
primary_concerns = Trouble sleeping and eating lately
concern_duration = 1
concern_severity = 3
/next
/next
therapy_goals = Sleep through the night again
/submit
";
    commands::assess(&app, id, true, script.as_bytes()).await.unwrap();
    commands::status(&app, id).unwrap();

    commands::reset(&app, id).unwrap();
    assert!(app.store.load(id).is_none());
    assert!(app.store.load_summary(id).is_none());
}

#[test]
fn recorded_onboarding_feeds_status_and_child_name() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(&dir);
    let id = Uuid::new_v4();

    commands::record(
        &app,
        id,
        RecordKind::Parent,
        r#"{ "firstName": "Ana", "lastName": "Reyes", "email": "ana@example.com" }"#,
    )
    .unwrap();
    commands::record(&app, id, RecordKind::Child, r#"{ "firstName": "Leo" }"#).unwrap();
    commands::record(
        &app,
        id,
        RecordKind::Coverage,
        r#"{ "type": "insurance", "provider": "Acme Health", "memberId": "XJ99887766" }"#,
    )
    .unwrap();
    assert!(commands::record(&app, id, RecordKind::Child, r#"{ "name": 1 }"#).is_err());

    let session = app.store.open(id).unwrap();
    assert!(session.is_step_complete(OnboardingStep::ParentInfo));
    assert!(session.is_step_complete(OnboardingStep::ChildInfo));
    assert!(session.is_step_complete(OnboardingStep::Coverage));
    assert!(!session.all_steps_complete());

    let child: ChildInfo = app.store.load_section(id, section::CHILD_INFO).unwrap();
    assert_eq!(child.first_name, "Leo");
    commands::status(&app, id).unwrap();
}
