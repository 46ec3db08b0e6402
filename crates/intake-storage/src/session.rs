use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use intake_core::keys::{self, section};
use intake_core::models::response::AssessmentResponse;
use intake_core::models::session::{OnboardingStep, Session, SessionStatus, SESSION_TTL_DAYS};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageError;
use crate::kv::KeyValueStore;

/// The document persisted under `onboarding_session_{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedData {
    pub data: BTreeMap<String, serde_json::Value>,
    pub saved_at: jiff::Timestamp,
}

/// Whether a write reached durable storage. `MemoryOnly` means the write
/// failed, a warning was logged, and the caller keeps its state in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persisted {
    Durable,
    MemoryOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub ttl_days: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_days: SESSION_TTL_DAYS,
        }
    }
}

/// Session-scoped JSON documents over a [`KeyValueStore`].
///
/// None of the operations here fail: storage errors are logged and the
/// operation degrades to a no-op, corrupted documents are discarded.
///
/// Clones share one write lock, so section saves from the chat, the form
/// autosaver and the CLI never interleave their read-modify-write.
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
    settings: SessionSettings,
    write_lock: Arc<Mutex<()>>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_settings(kv, SessionSettings::default())
    }

    pub fn with_settings(kv: Arc<dyn KeyValueStore>, settings: SessionSettings) -> Self {
        Self {
            kv,
            settings,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub(crate) fn kv(&self) -> &dyn KeyValueStore {
        self.kv.as_ref()
    }

    /// Load the saved document for a session. Unparsable data is removed and
    /// treated as absent.
    pub fn load(&self, session_id: Uuid) -> Option<SavedData> {
        let key = keys::session(session_id);
        let raw = match self.kv.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "failed to read session, continuing in memory");
                return None;
            }
        };

        match serde_json::from_str::<SavedData>(&raw) {
            Ok(saved) => Some(saved),
            Err(e) => {
                tracing::warn!(%session_id, error = %e, "discarding corrupted session data");
                if let Err(e) = self.kv.remove(&key) {
                    tracing::warn!(%session_id, error = %e, "failed to clear corrupted session data");
                }
                None
            }
        }
    }

    /// Replace one section of the session document and stamp `savedAt`.
    pub fn save<T: Serialize + ?Sized>(&self, session_id: Uuid, section: &str, data: &T) -> Persisted {
        match self.try_save(session_id, section, data) {
            Ok(()) => {
                tracing::debug!(%session_id, section, "section saved");
                Persisted::Durable
            }
            Err(e) => {
                tracing::warn!(%session_id, section, error = %e, "failed to save section, continuing in memory");
                Persisted::MemoryOnly
            }
        }
    }

    fn try_save<T: Serialize + ?Sized>(
        &self,
        session_id: Uuid,
        section: &str,
        data: &T,
    ) -> Result<(), StorageError> {
        let value = serde_json::to_value(data)?;
        let key = keys::session(session_id);
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // A read error aborts the save. Only a missing or corrupted document
        // starts fresh.
        let existing = match self.kv.get(&key)? {
            Some(raw) => serde_json::from_str::<SavedData>(&raw)
                .inspect_err(|e| {
                    tracing::warn!(%session_id, error = %e, "discarding corrupted session data");
                })
                .ok(),
            None => None,
        };
        let mut saved = existing.unwrap_or_else(|| SavedData {
            data: BTreeMap::new(),
            saved_at: jiff::Timestamp::now(),
        });
        saved.data.insert(section.to_string(), value);
        saved.saved_at = jiff::Timestamp::now();

        let json = serde_json::to_string(&saved)?;
        self.kv.set(&key, &json)
    }

    /// Read and deserialize a single section. A section that no longer
    /// matches its type is treated as absent.
    pub fn load_section<T: DeserializeOwned>(&self, session_id: Uuid, section: &str) -> Option<T> {
        let mut saved = self.load(session_id)?;
        let value = saved.data.remove(section)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(%session_id, section, error = %e, "ignoring unreadable section");
                None
            }
        }
    }

    pub fn remove(&self, session_id: Uuid) {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.kv.remove(&keys::session(session_id)) {
            tracing::warn!(%session_id, error = %e, "failed to remove session");
        }
    }

    /// Resume a session or start a fresh one.
    pub fn open(&self, session_id: Uuid) -> Result<Session, StorageError> {
        self.open_at(session_id, jiff::Timestamp::now())
    }

    /// [`open`](Self::open) with an explicit clock, for expiry checks.
    pub fn open_at(&self, session_id: Uuid, now: jiff::Timestamp) -> Result<Session, StorageError> {
        if let Some(session) = self.load_section::<Session>(session_id, section::SESSION) {
            if !session.is_expired(now) {
                return Ok(session);
            }
            tracing::info!(%session_id, "session expired, starting over");
            self.start_over(session_id);
        }

        let mut session = Session::new(session_id, now, self.settings.ttl_days)?;
        session.status = SessionStatus::InProgress;
        self.save(session_id, section::SESSION, &session);
        tracing::info!(%session_id, "started new onboarding session");
        Ok(session)
    }

    pub fn save_session(&self, session: &Session) -> Persisted {
        self.save(session.id, section::SESSION, session)
    }

    /// Persist an onboarding record and mark its step complete.
    pub fn record_step<T: Serialize>(
        &self,
        session: &mut Session,
        step: OnboardingStep,
        section: &str,
        record: &T,
    ) -> Persisted {
        session.mark_step(step);
        let record_saved = self.save(session.id, section, record);
        let session_saved = self.save_session(session);
        if record_saved == Persisted::Durable && session_saved == Persisted::Durable {
            Persisted::Durable
        } else {
            Persisted::MemoryOnly
        }
    }

    /// Persist the final responses and flip the session to
    /// assessment-complete. Needs no network round trip.
    pub fn complete_assessment(
        &self,
        session_id: Uuid,
        responses: &[AssessmentResponse],
    ) -> Result<Persisted, StorageError> {
        let mut session = self.open(session_id)?;
        session.complete_assessment();
        let responses_saved = self.save(session_id, section::ASSESSMENT_RESPONSES, responses);
        let session_saved = self.save_session(&session);
        tracing::info!(%session_id, responses = responses.len(), "assessment complete");
        Ok(
            if responses_saved == Persisted::Durable && session_saved == Persisted::Durable {
                Persisted::Durable
            } else {
                Persisted::MemoryOnly
            },
        )
    }

    /// Reverse [`complete_assessment`](Self::complete_assessment) after the
    /// user goes back to revise an answer: the summary is dropped and the
    /// stored responses are replaced with the ones still standing.
    pub fn reopen_assessment(
        &self,
        session_id: Uuid,
        responses: &[AssessmentResponse],
    ) -> Result<Persisted, StorageError> {
        let mut session = self.open(session_id)?;
        session.reopen_assessment();
        self.remove_summary(session_id);
        let responses_saved = self.save(session_id, section::ASSESSMENT_RESPONSES, responses);
        let session_saved = self.save_session(&session);
        tracing::info!(%session_id, responses = responses.len(), "assessment reopened");
        Ok(
            if responses_saved == Persisted::Durable && session_saved == Persisted::Durable {
                Persisted::Durable
            } else {
                Persisted::MemoryOnly
            },
        )
    }

    /// Explicit reset: clears the session document and its summary.
    pub fn start_over(&self, session_id: Uuid) {
        self.remove(session_id);
        self.remove_summary(session_id);
        tracing::info!(%session_id, "session cleared");
    }
}
