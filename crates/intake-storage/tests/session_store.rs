use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use intake_core::keys::{self, section};
use intake_core::models::response::AssessmentResponse;
use intake_core::models::session::{OnboardingStep, SessionStatus};
use intake_storage::{KeyValueStore, MemoryStore, Persisted, SessionSettings, SessionStore, StorageError};
use serde_json::json;
use uuid::Uuid;

/// A store whose backing is disabled, like a browser with storage blocked.
struct UnavailableStore;

impl KeyValueStore for UnavailableStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }

    fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::QuotaExceeded {
            key: key.to_string(),
        })
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("storage disabled".to_string()))
    }
}

/// Memory-backed store whose reads can be switched off while writes still
/// land, like a flaky backing that rejects some calls.
#[derive(Default)]
struct FlakyReads {
    inner: MemoryStore,
    fail_reads: AtomicBool,
}

impl KeyValueStore for FlakyReads {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("read failed".to_string()));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

fn memory_store() -> (Arc<MemoryStore>, SessionStore) {
    let kv = Arc::new(MemoryStore::new());
    (kv.clone(), SessionStore::new(kv))
}

#[test]
fn load_after_save_returns_section() {
    let (_, store) = memory_store();
    let id = Uuid::new_v4();
    let data = json!({ "primaryConcerns": "Worries before school every morning" });

    assert_eq!(store.save(id, section::FORM_PAGE_1, &data), Persisted::Durable);

    let saved = store.load(id).expect("saved data");
    assert_eq!(saved.data[section::FORM_PAGE_1], data);
}

#[test]
fn save_overwrites_whole_section() {
    let (_, store) = memory_store();
    let id = Uuid::new_v4();

    store.save(id, section::FORM_PAGE_2, &json!({ "sleepPatterns": "normal", "appetiteChanges": "eating-less" }));
    store.save(id, section::FORM_PAGE_2, &json!({ "sleepPatterns": "frequent-waking" }));

    let saved = store.load(id).unwrap();
    assert_eq!(saved.data[section::FORM_PAGE_2], json!({ "sleepPatterns": "frequent-waking" }));
}

#[test]
fn sections_are_independent() {
    let (_, store) = memory_store();
    let id = Uuid::new_v4();

    store.save(id, section::FORM_PAGE_1, &json!({ "concernSeverity": 3 }));
    store.save(id, section::FORM_PAGE_3, &json!({ "therapyGoals": "Feel calmer" }));

    let saved = store.load(id).unwrap();
    assert_eq!(saved.data.len(), 2);
    assert_eq!(saved.data[section::FORM_PAGE_1]["concernSeverity"], 3);
}

#[test]
fn corrupted_session_is_discarded_and_replaced() {
    let (kv, store) = memory_store();
    let id = Uuid::new_v4();
    kv.set(&keys::session(id), "invalid json {{").unwrap();

    assert!(store.load(id).is_none());
    assert!(!kv.contains(&keys::session(id)));

    kv.set(&keys::session(id), "invalid json {{").unwrap();
    let session = store.open(id).unwrap();
    assert_eq!(session.id, id);
    assert_eq!(session.status, SessionStatus::InProgress);
    assert!(session.progress.is_empty());

    let reloaded = store.load(id).expect("fresh session persisted");
    assert!(reloaded.data.contains_key(section::SESSION));
}

#[test]
fn open_resumes_existing_session() {
    let (_, store) = memory_store();
    let id = Uuid::new_v4();

    let mut session = store.open(id).unwrap();
    store.record_step(&mut session, OnboardingStep::ParentInfo, section::PARENT_INFO, &json!({ "firstName": "Ana" }));

    let resumed = store.open(id).unwrap();
    assert_eq!(resumed.created_at, session.created_at);
    assert!(resumed.is_step_complete(OnboardingStep::ParentInfo));
}

#[test]
fn expired_session_is_reset() {
    let (_, store) = memory_store();
    let id = Uuid::new_v4();
    let created: jiff::Timestamp = "2026-01-01T00:00:00Z".parse().unwrap();

    let session = store.open_at(id, created).unwrap();
    store.save(id, section::FORM_PAGE_1, &json!({ "concernSeverity": 2 }));

    let later: jiff::Timestamp = "2026-03-01T00:00:00Z".parse().unwrap();
    let fresh = store.open_at(id, later).unwrap();

    assert_ne!(fresh.created_at, session.created_at);
    let saved = store.load(id).unwrap();
    assert!(!saved.data.contains_key(section::FORM_PAGE_1));
}

#[test]
fn unavailable_storage_degrades_to_memory() {
    let store = SessionStore::new(Arc::new(UnavailableStore));
    let id = Uuid::new_v4();

    assert_eq!(store.save(id, section::CHAT, &json!({})), Persisted::MemoryOnly);
    assert!(store.load(id).is_none());
    store.remove(id);

    let session = store.open(id).expect("open still succeeds in memory");
    assert_eq!(session.status, SessionStatus::InProgress);
}

#[test]
fn unreadable_section_is_treated_as_absent() {
    let (_, store) = memory_store();
    let id = Uuid::new_v4();
    store.save(id, section::SESSION, &json!({ "unexpected": true }));

    let session = store.open(id).unwrap();
    assert_eq!(session.id, id);
}

#[test]
fn complete_assessment_saves_responses_and_flips_status() {
    let (_, store) = memory_store();
    let id = Uuid::new_v4();
    store.open(id).unwrap();
    let responses = vec![AssessmentResponse {
        question_id: "concern_severity".to_string(),
        response_text: "4 - Significant".to_string(),
        response_value: Some(4.0),
        timestamp: jiff::Timestamp::now(),
    }];

    assert_eq!(store.complete_assessment(id, &responses).unwrap(), Persisted::Durable);

    let session = store.open(id).unwrap();
    assert_eq!(session.status, SessionStatus::AssessmentComplete);
    assert!(session.is_step_complete(OnboardingStep::Assessment));
    let saved: Vec<AssessmentResponse> = store
        .load_section(id, section::ASSESSMENT_RESPONSES)
        .unwrap();
    assert_eq!(saved, responses);
}

#[test]
fn complete_assessment_without_storage_is_memory_only() {
    let store = SessionStore::new(Arc::new(UnavailableStore));
    let persisted = store.complete_assessment(Uuid::new_v4(), &[]).unwrap();
    assert_eq!(persisted, Persisted::MemoryOnly);
}

#[test]
fn failed_read_leaves_other_sections_intact() {
    let kv = Arc::new(FlakyReads::default());
    let store = SessionStore::new(kv.clone());
    let id = Uuid::new_v4();
    store.open(id).unwrap();
    store.save(id, section::CHAT, &json!({ "phase": "structured-qa" }));

    kv.fail_reads.store(true, Ordering::SeqCst);
    let persisted = store.save(id, section::FORM_PAGE_1, &json!({ "concernSeverity": 3 }));
    assert_eq!(persisted, Persisted::MemoryOnly);

    kv.fail_reads.store(false, Ordering::SeqCst);
    let saved = store.load(id).expect("document survives");
    assert!(saved.data.contains_key(section::SESSION));
    assert_eq!(saved.data[section::CHAT]["phase"], "structured-qa");
    assert!(!saved.data.contains_key(section::FORM_PAGE_1));
}

#[test]
fn concurrent_saves_from_clones_keep_every_section() {
    let (_, store) = memory_store();
    let id = Uuid::new_v4();
    let sections = [
        section::CHAT,
        section::FORM_PAGE_1,
        section::FORM_PAGE_2,
        section::FORM_PAGE_3,
        section::PARENT_INFO,
        section::CHILD_INFO,
    ];

    std::thread::scope(|scope| {
        for name in sections {
            let store = store.clone();
            scope.spawn(move || {
                for round in 0..50 {
                    store.save(id, name, &json!({ "round": round }));
                }
            });
        }
    });

    let saved = store.load(id).unwrap();
    for name in sections {
        assert_eq!(saved.data[name]["round"], 49, "section {name}");
    }
}

#[test]
fn oversized_lifetime_fails_open_without_panicking() {
    let kv = Arc::new(MemoryStore::new());
    let store = SessionStore::with_settings(kv.clone(), SessionSettings { ttl_days: i64::MAX / 2 });
    let id = Uuid::new_v4();

    assert!(store.open(id).is_err());
    assert!(!kv.contains(&keys::session(id)));
}

#[test]
fn reopen_assessment_drops_summary_and_restores_progress() {
    let (kv, store) = memory_store();
    let id = Uuid::new_v4();
    store.open(id).unwrap();
    let response = AssessmentResponse {
        question_id: "concern_duration".to_string(),
        response_text: "1-3 months".to_string(),
        response_value: None,
        timestamp: jiff::Timestamp::now(),
    };
    store.complete_assessment(id, &[response.clone()]).unwrap();
    kv.set(&keys::summary(id), "{}").unwrap();

    assert_eq!(store.reopen_assessment(id, &[]).unwrap(), Persisted::Durable);

    let session = store.open(id).unwrap();
    assert_eq!(session.status, SessionStatus::InProgress);
    assert!(!session.is_step_complete(OnboardingStep::Assessment));
    assert!(!kv.contains(&keys::summary(id)));
    let saved: Vec<AssessmentResponse> = store.load_section(id, section::ASSESSMENT_RESPONSES).unwrap();
    assert!(saved.is_empty());
}
