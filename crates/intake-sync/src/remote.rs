//! The remote mutation contract. Transport is the implementor's concern;
//! only the operation shapes are fixed here.

use intake_core::BoxFuture;
use intake_core::models::onboarding::{ChildInfo, InsuranceInfo, ParentInfo};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::SyncError;

/// What the system of record already holds for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RemoteProgress {
    pub has_parent_info: bool,
    pub has_child_info: bool,
    pub has_coverage: bool,
    pub response_count: usize,
    pub assessment_complete: bool,
}

pub trait IntakeRecords: Send + Sync {
    fn fetch_progress(&self, session_id: Uuid) -> BoxFuture<'_, Result<RemoteProgress, SyncError>>;

    fn submit_parent_info<'a>(
        &'a self,
        session_id: Uuid,
        parent: &'a ParentInfo,
    ) -> BoxFuture<'a, Result<(), SyncError>>;

    fn submit_child_info<'a>(
        &'a self,
        session_id: Uuid,
        child: &'a ChildInfo,
    ) -> BoxFuture<'a, Result<(), SyncError>>;

    fn select_self_pay(&self, session_id: Uuid) -> BoxFuture<'_, Result<(), SyncError>>;

    fn submit_insurance_info<'a>(
        &'a self,
        session_id: Uuid,
        insurance: &'a InsuranceInfo,
    ) -> BoxFuture<'a, Result<(), SyncError>>;

    fn submit_assessment_response<'a>(
        &'a self,
        session_id: Uuid,
        question_id: &'a str,
        response_text: &'a str,
        response_value: Option<f64>,
    ) -> BoxFuture<'a, Result<(), SyncError>>;

    /// `force` completes even if the remote side thinks answers are missing.
    fn complete_assessment(&self, session_id: Uuid, force: bool) -> BoxFuture<'_, Result<(), SyncError>>;
}
