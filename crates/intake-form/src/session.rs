use intake_core::keys::section;
use intake_questions::QuestionBank;
use intake_storage::SessionStore;
use uuid::Uuid;

use crate::autosave::AutoSaver;
use crate::engine::{FormEngine, FormIntent, FormSnapshot};
use crate::error::FormError;
use crate::pages::{Page1Fields, Page2Fields, Page3Fields};

/// Rebuild the form from its saved pages, or start empty.
pub fn resume_or_new(store: &SessionStore, session_id: Uuid, bank: Box<dyn QuestionBank>) -> FormEngine {
    let page1 = store.load_section::<Page1Fields>(session_id, section::FORM_PAGE_1);
    let page2 = store.load_section::<Page2Fields>(session_id, section::FORM_PAGE_2);
    let page3 = store.load_section::<Page3Fields>(session_id, section::FORM_PAGE_3);
    if page1.is_some() || page2.is_some() || page3.is_some() {
        tracing::info!(%session_id, "resuming form");
    }
    FormEngine::restore(session_id, bank, page1, page2, page3)
}

/// Routes a [`FormEngine`]'s side effects: page saves go to the debounced
/// writer, a submission is persisted immediately.
pub struct FormSession {
    engine: FormEngine,
    store: SessionStore,
    autosaver: AutoSaver,
}

impl FormSession {
    pub fn new(engine: FormEngine, store: SessionStore, autosaver: AutoSaver) -> Self {
        Self {
            engine,
            store,
            autosaver,
        }
    }

    pub fn engine(&self) -> &FormEngine {
        &self.engine
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.engine.snapshot()
    }

    pub fn handle(&mut self, intent: FormIntent) -> Result<FormSnapshot, FormError> {
        let snapshot = self.engine.handle(intent)?;

        if let Some(save) = self.engine.take_pending_save() {
            self.autosaver.queue(save);
        }

        if let Some(done) = self.engine.take_completed() {
            let session_id = self.engine.session_id();
            self.store.save_summary(session_id, &done.summary, &done.form_data);
            if let Err(e) = self.store.complete_assessment(session_id, &done.responses) {
                tracing::warn!(%session_id, error = %e, "failed to mark assessment complete");
            }
        }

        Ok(snapshot)
    }
}
