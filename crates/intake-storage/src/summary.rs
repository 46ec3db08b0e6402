use intake_core::keys;
use intake_core::models::form::FormDraft;
use intake_core::models::summary::AssessmentSummary;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;
use crate::session::{Persisted, SessionStore};

/// The document persisted under `assessment_summary_{id}`. There is at
/// most one per session; saving replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSummary {
    pub summary: AssessmentSummary,
    pub form_data: FormDraft,
    pub generated_at: jiff::Timestamp,
}

impl SessionStore {
    pub fn save_summary(
        &self,
        session_id: Uuid,
        summary: &AssessmentSummary,
        form_data: &FormDraft,
    ) -> Persisted {
        let stored = StoredSummary {
            summary: summary.clone(),
            form_data: form_data.clone(),
            generated_at: summary.generated_at,
        };
        match self.write_summary(session_id, &stored) {
            Ok(()) => {
                tracing::info!(%session_id, source = ?summary.source, "assessment summary saved");
                Persisted::Durable
            }
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "failed to save summary, continuing in memory");
                Persisted::MemoryOnly
            }
        }
    }

    fn write_summary(&self, session_id: Uuid, stored: &StoredSummary) -> Result<(), StorageError> {
        let json = serde_json::to_string(stored)?;
        self.kv().set(&keys::summary(session_id), &json)
    }

    pub fn load_summary(&self, session_id: Uuid) -> Option<StoredSummary> {
        let key = keys::summary(session_id);
        let raw = match self.kv().get(&key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "failed to read summary");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(stored) => Some(stored),
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "discarding corrupted summary");
                self.remove_summary(session_id);
                None
            }
        }
    }

    pub fn remove_summary(&self, session_id: Uuid) {
        if let Err(e) = self.kv().remove(&keys::summary(session_id)) {
            tracing::warn!(%session_id, error = %e, "failed to remove summary");
        }
    }
}
