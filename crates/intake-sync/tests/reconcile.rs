use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use intake_core::BoxFuture;
use intake_core::keys::section;
use intake_core::models::onboarding::{ChildInfo, Coverage, InsuranceInfo, ParentInfo};
use intake_core::models::response::AssessmentResponse;
use intake_core::models::session::OnboardingStep;
use intake_storage::{MemoryStore, SessionStore};
use intake_sync::{
    IntakeRecords, LocalRecords, RemoteProgress, SyncError, SyncReconciler, SyncState, SyncStep,
};
use uuid::Uuid;

/// Records every call in order and fails the calls it was told to.
#[derive(Default)]
struct RecordingRemote {
    progress: RemoteProgress,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, usize>>,
}

impl RecordingRemote {
    fn failing(call: &str, times: usize) -> Self {
        let remote = Self::default();
        remote.failures.lock().unwrap().insert(call.to_string(), times);
        remote
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), SyncError> {
        self.calls.lock().unwrap().push(call.clone());
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(&call) {
            Some(left) if *left > 0 => {
                *left -= 1;
                Err(SyncError::Remote("503 service unavailable".to_string()))
            }
            _ => Ok(()),
        }
    }
}

impl IntakeRecords for RecordingRemote {
    fn fetch_progress(&self, _session_id: Uuid) -> BoxFuture<'_, Result<RemoteProgress, SyncError>> {
        Box::pin(async move { Ok(self.progress.clone()) })
    }

    fn submit_parent_info<'a>(
        &'a self,
        _session_id: Uuid,
        _parent: &'a ParentInfo,
    ) -> BoxFuture<'a, Result<(), SyncError>> {
        Box::pin(async move { self.record("parent_info".to_string()) })
    }

    fn submit_child_info<'a>(
        &'a self,
        _session_id: Uuid,
        _child: &'a ChildInfo,
    ) -> BoxFuture<'a, Result<(), SyncError>> {
        Box::pin(async move { self.record("child_info".to_string()) })
    }

    fn select_self_pay(&self, _session_id: Uuid) -> BoxFuture<'_, Result<(), SyncError>> {
        Box::pin(async move { self.record("self_pay".to_string()) })
    }

    fn submit_insurance_info<'a>(
        &'a self,
        _session_id: Uuid,
        insurance: &'a InsuranceInfo,
    ) -> BoxFuture<'a, Result<(), SyncError>> {
        Box::pin(async move { self.record(format!("insurance:{}", insurance.provider)) })
    }

    fn submit_assessment_response<'a>(
        &'a self,
        _session_id: Uuid,
        question_id: &'a str,
        _response_text: &'a str,
        _response_value: Option<f64>,
    ) -> BoxFuture<'a, Result<(), SyncError>> {
        Box::pin(async move { self.record(format!("response:{question_id}")) })
    }

    fn complete_assessment(&self, _session_id: Uuid, force: bool) -> BoxFuture<'_, Result<(), SyncError>> {
        Box::pin(async move { self.record(format!("complete:{force}")) })
    }
}

fn response(question_id: &str, text: &str) -> AssessmentResponse {
    AssessmentResponse {
        question_id: question_id.to_string(),
        response_text: text.to_string(),
        response_value: None,
        timestamp: jiff::Timestamp::now(),
    }
}

fn completed_session(store: &SessionStore, coverage: Coverage) -> Uuid {
    let id = Uuid::new_v4();
    let mut session = store.open(id).unwrap();
    store.record_step(
        &mut session,
        OnboardingStep::ParentInfo,
        section::PARENT_INFO,
        &ParentInfo {
            first_name: "Dana".to_string(),
            last_name: "Reyes".to_string(),
            email: "dana@example.com".to_string(),
            phone: None,
        },
    );
    store.record_step(
        &mut session,
        OnboardingStep::ChildInfo,
        section::CHILD_INFO,
        &ChildInfo {
            first_name: "Sam".to_string(),
            date_of_birth: None,
        },
    );
    store.record_step(&mut session, OnboardingStep::Coverage, section::COVERAGE, &coverage);
    store
        .complete_assessment(
            id,
            &[
                response("concern_duration", "3-6 months"),
                response("concern_severity", "4 - Significant"),
                response("therapy_goals", "Help with anxiety and worry"),
            ],
        )
        .unwrap();
    id
}

fn store() -> SessionStore {
    SessionStore::new(Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn incomplete_session_is_never_checked() {
    let store = store();
    let id = Uuid::new_v4();
    store.open(id).unwrap();
    let remote = Arc::new(RecordingRemote::default());

    let mut reconciler = SyncReconciler::new(remote.clone(), LocalRecords::load(&store, id));
    let report = reconciler.check().await.unwrap();

    assert_eq!(report.state, SyncState::NotChecked);
    assert!(report.items_to_sync.is_empty());
    assert!(matches!(
        reconciler.sync().await,
        Err(SyncError::InvalidState { state: SyncState::NotChecked, .. })
    ));
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn remote_up_to_date_is_synced_without_calls() {
    let store = store();
    let id = completed_session(&store, Coverage::SelfPay);
    let remote = Arc::new(RecordingRemote {
        progress: RemoteProgress {
            has_parent_info: true,
            has_child_info: true,
            has_coverage: true,
            response_count: 3,
            assessment_complete: true,
        },
        ..Default::default()
    });

    let mut reconciler = SyncReconciler::new(remote.clone(), LocalRecords::load(&store, id));
    assert_eq!(reconciler.check().await.unwrap().state, SyncState::Synced);
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn mismatch_replays_in_fixed_order() {
    let store = store();
    let id = completed_session(&store, Coverage::SelfPay);
    let remote = Arc::new(RecordingRemote::default());

    let mut reconciler = SyncReconciler::new(remote.clone(), LocalRecords::load(&store, id));
    let report = reconciler.check().await.unwrap();
    assert_eq!(report.state, SyncState::MismatchDetected);
    assert_eq!(report.items_to_sync.len(), 7);

    let report = reconciler.sync().await.unwrap();
    assert_eq!(report.state, SyncState::Synced);
    assert_eq!(report.synced_items, report.items_to_sync);
    assert!(report.errors.is_empty());
    assert_eq!(
        remote.calls(),
        vec![
            "parent_info",
            "child_info",
            "self_pay",
            "response:concern_duration",
            "response:concern_severity",
            "response:therapy_goals",
            "complete:true",
        ]
    );
}

#[tokio::test]
async fn insurance_replaces_self_pay() {
    let store = store();
    let id = completed_session(
        &store,
        Coverage::Insurance(InsuranceInfo {
            provider: "Acme Health".to_string(),
            member_id: "XJ4410982".to_string(),
            group_number: None,
        }),
    );
    let remote = Arc::new(RecordingRemote::default());

    let mut reconciler = SyncReconciler::new(remote.clone(), LocalRecords::load(&store, id));
    reconciler.check().await.unwrap();
    reconciler.sync().await.unwrap();

    let calls = remote.calls();
    assert_eq!(calls[2], "insurance:Acme Health");
    assert!(!calls.contains(&"self_pay".to_string()));
}

#[tokio::test]
async fn failure_halts_and_keeps_partial_progress() {
    let store = store();
    let id = completed_session(&store, Coverage::SelfPay);
    let remote = Arc::new(RecordingRemote::failing("response:concern_severity", 1));

    let mut reconciler = SyncReconciler::new(remote.clone(), LocalRecords::load(&store, id));
    reconciler.check().await.unwrap();
    let report = reconciler.sync().await.unwrap();

    assert_eq!(report.state, SyncState::SyncFailed);
    assert_eq!(report.synced_items.len(), 4);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.errors[0].step,
        SyncStep::AssessmentResponse {
            question_id: "concern_severity".to_string()
        }
    );
    assert!(report.errors[0].message.contains("503"));
    assert_eq!(remote.calls().len(), 5);
    assert!(!remote.calls().iter().any(|c| c.starts_with("complete")));
}

#[tokio::test]
async fn retry_restarts_the_whole_sequence() {
    let store = store();
    let id = completed_session(&store, Coverage::SelfPay);
    let remote = Arc::new(RecordingRemote::failing("child_info", 1));

    let mut reconciler = SyncReconciler::new(remote.clone(), LocalRecords::load(&store, id));
    reconciler.check().await.unwrap();
    assert_eq!(reconciler.sync().await.unwrap().state, SyncState::SyncFailed);

    let report = reconciler.retry().await.unwrap();
    assert_eq!(report.state, SyncState::Synced);
    assert!(report.errors.is_empty());
    assert_eq!(report.synced_items.len(), 7);

    let calls = remote.calls();
    assert_eq!(&calls[..3], &["parent_info", "child_info", "parent_info"]);
    assert_eq!(calls.len(), 9);
}

#[tokio::test]
async fn retry_requires_a_failed_sync() {
    let store = store();
    let id = completed_session(&store, Coverage::SelfPay);
    let mut reconciler =
        SyncReconciler::new(Arc::new(RecordingRemote::default()), LocalRecords::load(&store, id));
    reconciler.check().await.unwrap();

    assert!(matches!(
        reconciler.retry().await,
        Err(SyncError::InvalidState { action: "retry", .. })
    ));
}

#[test]
fn report_serializes_for_the_ui() {
    let step = SyncStep::AssessmentResponse {
        question_id: "therapy_goals".to_string(),
    };
    let json = serde_json::to_value(&step).unwrap();
    assert_eq!(json["step"], "assessment_response");
    assert_eq!(json["questionId"], "therapy_goals");
    assert_eq!(step.to_string(), "assessment_response:therapy_goals");
    assert_eq!(
        serde_json::to_value(SyncState::MismatchDetected).unwrap(),
        "MISMATCH_DETECTED"
    );
}
