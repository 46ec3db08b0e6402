//! Mismatch detection and ordered replay.
//!
//! `NotChecked → MismatchDetected → Syncing → Synced | SyncFailed`. A replay
//! runs one mutation at a time and stops at the first failure; the steps
//! that already went through stay in the report. Retrying replays the whole
//! sequence from the start, relying on the remote side treating repeated
//! mutations as idempotent.

use std::fmt;
use std::sync::Arc;

use intake_core::format_err_chain;
use intake_core::keys::section;
use intake_core::models::onboarding::Coverage;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::SyncError;
use crate::local::LocalRecords;
use crate::remote::{IntakeRecords, RemoteProgress};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum SyncState {
    NotChecked,
    MismatchDetected,
    Syncing,
    Synced,
    SyncFailed,
}

/// One remote mutation in the replay sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "step", rename_all = "snake_case")]
#[ts(export)]
pub enum SyncStep {
    ParentInfo,
    ChildInfo,
    SelfPay,
    InsuranceInfo,
    AssessmentResponse {
        #[serde(rename = "questionId")]
        question_id: String,
    },
    CompleteAssessment,
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParentInfo => f.write_str("parent_info"),
            Self::ChildInfo => f.write_str("child_info"),
            Self::SelfPay => f.write_str("self_pay"),
            Self::InsuranceInfo => f.write_str("insurance_info"),
            Self::AssessmentResponse { question_id } => write!(f, "assessment_response:{question_id}"),
            Self::CompleteAssessment => f.write_str("complete_assessment"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SyncStepError {
    pub step: SyncStep,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SyncReport {
    pub state: SyncState,
    pub items_to_sync: Vec<SyncStep>,
    pub synced_items: Vec<SyncStep>,
    pub errors: Vec<SyncStepError>,
}

impl Default for SyncReport {
    fn default() -> Self {
        Self {
            state: SyncState::NotChecked,
            items_to_sync: Vec::new(),
            synced_items: Vec::new(),
            errors: Vec::new(),
        }
    }
}

/// The fixed replay order: parent, child, coverage, each response in the
/// order it was given, then completion.
pub fn plan(local: &LocalRecords) -> Vec<SyncStep> {
    let mut steps = vec![SyncStep::ParentInfo, SyncStep::ChildInfo];
    match &local.coverage {
        Some(Coverage::Insurance(_)) => steps.push(SyncStep::InsuranceInfo),
        _ => steps.push(SyncStep::SelfPay),
    }
    steps.extend(local.responses.iter().map(|r| SyncStep::AssessmentResponse {
        question_id: r.question_id.clone(),
    }));
    steps.push(SyncStep::CompleteAssessment);
    steps
}

/// True when the remote side is missing anything the device holds.
fn remote_is_behind(local: &LocalRecords, remote: &RemoteProgress) -> bool {
    !remote.has_parent_info
        || !remote.has_child_info
        || !remote.has_coverage
        || remote.response_count < local.responses.len()
        || !remote.assessment_complete
}

pub struct SyncReconciler {
    remote: Arc<dyn IntakeRecords>,
    local: LocalRecords,
    report: SyncReport,
}

impl SyncReconciler {
    pub fn new(remote: Arc<dyn IntakeRecords>, local: LocalRecords) -> Self {
        Self {
            remote,
            local,
            report: SyncReport::default(),
        }
    }

    pub fn state(&self) -> SyncState {
        self.report.state
    }

    pub fn report(&self) -> &SyncReport {
        &self.report
    }

    /// Compare local progress with the remote record. A session that is not
    /// complete locally is never checked.
    pub async fn check(&mut self) -> Result<&SyncReport, SyncError> {
        let session_id = self.local.session_id;
        if !self.local.is_complete() {
            tracing::debug!(%session_id, "session incomplete locally, skipping sync check");
            self.report = SyncReport::default();
            return Ok(&self.report);
        }

        let progress = self.remote.fetch_progress(session_id).await?;
        if remote_is_behind(&self.local, &progress) {
            let items = plan(&self.local);
            tracing::info!(%session_id, items = items.len(), "remote record is behind local progress");
            self.report = SyncReport {
                state: SyncState::MismatchDetected,
                items_to_sync: items,
                ..SyncReport::default()
            };
        } else {
            self.report = SyncReport {
                state: SyncState::Synced,
                ..SyncReport::default()
            };
        }
        Ok(&self.report)
    }

    /// Replay every mutation in order. Remote failures end up in the report,
    /// not in the returned error.
    pub async fn sync(&mut self) -> Result<&SyncReport, SyncError> {
        match self.report.state {
            SyncState::MismatchDetected | SyncState::SyncFailed => {}
            state => {
                return Err(SyncError::InvalidState {
                    action: "sync",
                    state,
                });
            }
        }

        let session_id = self.local.session_id;
        let steps = plan(&self.local);
        self.report = SyncReport {
            state: SyncState::Syncing,
            items_to_sync: steps.clone(),
            ..SyncReport::default()
        };
        tracing::info!(%session_id, items = steps.len(), "syncing session");

        for step in steps {
            match self.dispatch(&step).await {
                Ok(()) => {
                    tracing::debug!(%session_id, %step, "synced");
                    self.report.synced_items.push(step);
                }
                Err(e) => {
                    let message = format_err_chain(&e);
                    tracing::error!(%session_id, %step, error = %message, "sync step failed");
                    self.report.errors.push(SyncStepError { step, message });
                    self.report.state = SyncState::SyncFailed;
                    return Ok(&self.report);
                }
            }
        }

        tracing::info!(%session_id, synced = self.report.synced_items.len(), "session synced");
        self.report.state = SyncState::Synced;
        Ok(&self.report)
    }

    /// Run the full sequence again after a failure.
    pub async fn retry(&mut self) -> Result<&SyncReport, SyncError> {
        if self.report.state != SyncState::SyncFailed {
            return Err(SyncError::InvalidState {
                action: "retry",
                state: self.report.state,
            });
        }
        self.sync().await
    }

    async fn dispatch(&self, step: &SyncStep) -> Result<(), SyncError> {
        let local = &self.local;
        let id = local.session_id;
        match step {
            SyncStep::ParentInfo => {
                let parent = local.parent.as_ref().ok_or(SyncError::MissingRecord {
                    section: section::PARENT_INFO,
                })?;
                self.remote.submit_parent_info(id, parent).await
            }
            SyncStep::ChildInfo => {
                let child = local.child.as_ref().ok_or(SyncError::MissingRecord {
                    section: section::CHILD_INFO,
                })?;
                self.remote.submit_child_info(id, child).await
            }
            SyncStep::SelfPay => self.remote.select_self_pay(id).await,
            SyncStep::InsuranceInfo => match &local.coverage {
                Some(Coverage::Insurance(insurance)) => {
                    self.remote.submit_insurance_info(id, insurance).await
                }
                _ => Err(SyncError::MissingRecord {
                    section: section::COVERAGE,
                }),
            },
            SyncStep::AssessmentResponse { question_id } => {
                let response = local
                    .responses
                    .iter()
                    .find(|r| &r.question_id == question_id)
                    .ok_or(SyncError::MissingRecord {
                        section: section::ASSESSMENT_RESPONSES,
                    })?;
                self.remote
                    .submit_assessment_response(
                        id,
                        &response.question_id,
                        &response.response_text,
                        response.response_value,
                    )
                    .await
            }
            SyncStep::CompleteAssessment => self.remote.complete_assessment(id, true).await,
        }
    }
}
