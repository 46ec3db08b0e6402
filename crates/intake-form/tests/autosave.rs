use std::sync::Arc;
use std::time::Duration;

use intake_core::keys::section;
use intake_core::models::session::SessionStatus;
use intake_form::pages::Page1Fields;
use intake_form::{
    resume_or_new, AutoSaver, AutosaveSettings, FieldValue, FormEngine, FormField, FormIntent,
    FormSession,
};
use intake_questions::default_bank;
use intake_storage::{KeyValueStore, MemoryStore, SessionStore, StorageError};
use uuid::Uuid;

fn session(store: &SessionStore, session_id: Uuid) -> (FormSession, tokio::task::JoinHandle<()>) {
    let (autosaver, handle) = AutoSaver::spawn(store.clone(), AutosaveSettings::default());
    let engine = FormEngine::new(session_id, default_bank());
    (FormSession::new(engine, store.clone(), autosaver), handle)
}

fn blur(form: &mut FormSession, field: FormField, value: FieldValue) {
    form.handle(FormIntent::Edit { field, value }).unwrap();
    form.handle(FormIntent::SaveField { field }).unwrap();
}

#[tokio::test(start_paused = true)]
async fn blurs_within_one_window_make_one_write() {
    let kv = Arc::new(MemoryStore::new());
    let store = SessionStore::new(kv.clone());
    let session_id = Uuid::new_v4();
    let (mut form, _handle) = session(&store, session_id);

    blur(
        &mut form,
        FormField::PrimaryConcerns,
        FieldValue::Text("Short tempered".to_string()),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    blur(
        &mut form,
        FormField::PrimaryConcerns,
        FieldValue::Text("Short tempered with siblings".to_string()),
    );
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(kv.write_count(), 0);

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(kv.write_count(), 1);
    let page: Page1Fields = store.load_section(session_id, section::FORM_PAGE_1).unwrap();
    assert_eq!(
        page.primary_concerns.as_deref(),
        Some("Short tempered with siblings")
    );
}

#[tokio::test(start_paused = true)]
async fn page_snapshot_carries_every_field() {
    let kv = Arc::new(MemoryStore::new());
    let store = SessionStore::new(kv.clone());
    let session_id = Uuid::new_v4();
    let (mut form, _handle) = session(&store, session_id);

    blur(&mut form, FormField::ConcernSeverity, FieldValue::Severity(3));
    blur(
        &mut form,
        FormField::ConcernDuration,
        FieldValue::Choice("1-3 months".to_string()),
    );
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(kv.write_count(), 1);
    let page: Page1Fields = store.load_section(session_id, section::FORM_PAGE_1).unwrap();
    assert_eq!(page.concern_severity, Some(3));
    assert!(page.concern_duration.is_some());
}

#[tokio::test(start_paused = true)]
async fn separate_windows_write_separately() {
    let kv = Arc::new(MemoryStore::new());
    let store = SessionStore::new(kv.clone());
    let (mut form, _handle) = session(&store, Uuid::new_v4());

    blur(&mut form, FormField::ConcernSeverity, FieldValue::Severity(2));
    tokio::time::sleep(Duration::from_secs(1)).await;
    blur(&mut form, FormField::ConcernSeverity, FieldValue::Severity(4));
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(kv.write_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn leaving_the_form_still_completes_the_save() {
    let kv = Arc::new(MemoryStore::new());
    let store = SessionStore::new(kv.clone());
    let session_id = Uuid::new_v4();
    let (mut form, handle) = session(&store, session_id);

    blur(&mut form, FormField::ConcernSeverity, FieldValue::Severity(5));
    let snapshot = form.handle(FormIntent::SwitchMode).unwrap();
    assert!(snapshot.handoff.is_some());
    drop(form);

    handle.await.unwrap();
    let page: Page1Fields = store.load_section(session_id, section::FORM_PAGE_1).unwrap();
    assert_eq!(page.concern_severity, Some(5));
}

struct ReadOnlyStore;

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::QuotaExceeded {
            key: key.to_string(),
        })
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn failing_storage_does_not_stop_the_form() {
    let store = SessionStore::new(Arc::new(ReadOnlyStore));
    let (mut form, handle) = session(&store, Uuid::new_v4());

    blur(&mut form, FormField::ConcernSeverity, FieldValue::Severity(1));
    tokio::time::sleep(Duration::from_secs(1)).await;
    let snapshot = form.handle(FormIntent::Next).unwrap();
    assert_eq!(snapshot.draft.concern_severity, Some(1));

    drop(form);
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn submit_persists_summary_and_completes_session() {
    let store = SessionStore::new(Arc::new(MemoryStore::new()));
    let session_id = Uuid::new_v4();
    let (mut form, _handle) = session(&store, session_id);

    for (field, value) in [
        (
            FormField::PrimaryConcerns,
            FieldValue::Text("Refuses school most mornings".to_string()),
        ),
        (
            FormField::ConcernDuration,
            FieldValue::Choice("6-plus-months".to_string()),
        ),
        (FormField::ConcernSeverity, FieldValue::Severity(5)),
    ] {
        blur(&mut form, field, value);
    }
    form.handle(FormIntent::Next).unwrap();
    form.handle(FormIntent::Next).unwrap();
    blur(
        &mut form,
        FormField::TherapyGoals,
        FieldValue::Text("Feel safe going to school".to_string()),
    );
    let snapshot = form.handle(FormIntent::Submit).unwrap();
    assert!(snapshot.summary.is_some());

    let stored = store.load_summary(session_id).unwrap();
    assert_eq!(Some(&stored.summary), snapshot.summary.as_ref());
    assert_eq!(store.open(session_id).unwrap().status, SessionStatus::AssessmentComplete);
}

#[tokio::test(start_paused = true)]
async fn saved_pages_restore_the_draft() {
    let store = SessionStore::new(Arc::new(MemoryStore::new()));
    let session_id = Uuid::new_v4();
    {
        let (mut form, handle) = session(&store, session_id);
        blur(
            &mut form,
            FormField::PrimaryConcerns,
            FieldValue::Text("Nightmares and bedwetting".to_string()),
        );
        drop(form);
        handle.await.unwrap();
    }

    let engine = resume_or_new(&store, session_id, default_bank());
    assert_eq!(
        engine.draft().primary_concerns.as_deref(),
        Some("Nightmares and bedwetting")
    );
}
