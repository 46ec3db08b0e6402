use intake_core::keys::section;
use intake_core::models::onboarding::{ChildInfo, Coverage, ParentInfo};
use intake_core::models::response::AssessmentResponse;
use intake_core::models::session::{Session, SessionStatus};
use intake_storage::SessionStore;
use uuid::Uuid;

/// Everything the device holds for one session, read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalRecords {
    pub session_id: Uuid,
    pub session: Option<Session>,
    pub parent: Option<ParentInfo>,
    pub child: Option<ChildInfo>,
    pub coverage: Option<Coverage>,
    pub responses: Vec<AssessmentResponse>,
}

impl LocalRecords {
    /// Read without creating anything: a session that was never opened
    /// loads as empty.
    pub fn load(store: &SessionStore, session_id: Uuid) -> Self {
        Self {
            session_id,
            session: store.load_section(session_id, section::SESSION),
            parent: store.load_section(session_id, section::PARENT_INFO),
            child: store.load_section(session_id, section::CHILD_INFO),
            coverage: store.load_section(session_id, section::COVERAGE),
            responses: store
                .load_section(session_id, section::ASSESSMENT_RESPONSES)
                .unwrap_or_default(),
        }
    }

    /// Every onboarding step is done and every record it produced is on hand.
    pub fn is_complete(&self) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        session.status == SessionStatus::AssessmentComplete
            && session.all_steps_complete()
            && self.parent.is_some()
            && self.child.is_some()
            && self.coverage.is_some()
    }
}
