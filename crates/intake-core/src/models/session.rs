use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreError;

/// Default lifetime of an onboarding session.
pub const SESSION_TTL_DAYS: i64 = 30;

/// One onboarding attempt. Created once, reset only by an explicit
/// "start over" or by expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Session {
    pub id: Uuid,
    pub status: SessionStatus,
    pub created_at: jiff::Timestamp,
    pub expires_at: jiff::Timestamp,
    #[serde(default)]
    pub progress: BTreeMap<OnboardingStep, bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum SessionStatus {
    Started,
    InProgress,
    AssessmentComplete,
    Expired,
}

/// The onboarding steps whose completion is tracked in `Session::progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OnboardingStep {
    ParentInfo,
    ChildInfo,
    Coverage,
    Assessment,
}

impl OnboardingStep {
    pub const ALL: [OnboardingStep; 4] = [
        OnboardingStep::ParentInfo,
        OnboardingStep::ChildInfo,
        OnboardingStep::Coverage,
        OnboardingStep::Assessment,
    ];
}

impl Session {
    pub fn new(id: Uuid, now: jiff::Timestamp, ttl_days: i64) -> Result<Self, CoreError> {
        let lifetime = ttl_days
            .checked_mul(24)
            .and_then(jiff::SignedDuration::try_from_hours)
            .ok_or(CoreError::InvalidTtl { days: ttl_days })?;
        let expires_at = now.checked_add(lifetime)?;
        Ok(Self {
            id,
            status: SessionStatus::Started,
            created_at: now,
            expires_at,
            progress: BTreeMap::new(),
        })
    }

    pub fn is_expired(&self, now: jiff::Timestamp) -> bool {
        self.status == SessionStatus::Expired || now >= self.expires_at
    }

    pub fn mark_step(&mut self, step: OnboardingStep) {
        self.progress.insert(step, true);
        if self.status == SessionStatus::Started {
            self.status = SessionStatus::InProgress;
        }
    }

    pub fn is_step_complete(&self, step: OnboardingStep) -> bool {
        self.progress.get(&step).copied().unwrap_or(false)
    }

    /// True once every tracked onboarding step has been completed locally.
    pub fn all_steps_complete(&self) -> bool {
        OnboardingStep::ALL.iter().all(|s| self.is_step_complete(*s))
    }

    pub fn complete_assessment(&mut self) {
        self.mark_step(OnboardingStep::Assessment);
        self.status = SessionStatus::AssessmentComplete;
    }

    /// Undo [`complete_assessment`](Self::complete_assessment) when answers
    /// are being revised.
    pub fn reopen_assessment(&mut self) {
        self.progress.insert(OnboardingStep::Assessment, false);
        if self.status == SessionStatus::AssessmentComplete {
            self.status = SessionStatus::InProgress;
        }
    }
}
