//! Async driver around [`ConversationEngine`]: persistence, the recording
//! delay, and snapshot broadcast.

use std::sync::Arc;
use std::time::Duration;

use intake_core::keys::section;
use intake_questions::QuestionBank;
use intake_storage::SessionStore;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

use crate::engine::{ChatIntent, ChatSnapshot, ConversationEngine};
use crate::error::ChatError;
use crate::responder::ChatResponder;

/// Load the saved conversation for a session, or start a new one.
pub fn resume_or_new(
    store: &SessionStore,
    session_id: Uuid,
    bank: &dyn QuestionBank,
    responder: Arc<dyn ChatResponder>,
) -> ConversationEngine {
    match store.load_section::<ChatSnapshot>(session_id, section::CHAT) {
        Some(snapshot) if snapshot.session_id == session_id => {
            tracing::info!(%session_id, phase = ?snapshot.phase, "resuming chat");
            ConversationEngine::restore(snapshot, bank, responder)
        }
        _ => ConversationEngine::new(session_id, bank, responder),
    }
}

#[derive(Clone)]
struct Publisher {
    store: SessionStore,
    session_id: Uuid,
    updates: watch::Sender<ChatSnapshot>,
}

impl Publisher {
    /// Persist and broadcast the engine's state. Returns the question id
    /// whose commit is now due, if any.
    fn publish(&self, engine: &mut ConversationEngine, snapshot: &ChatSnapshot) -> Option<String> {
        let persisted = ChatSnapshot {
            handoff: None,
            ..snapshot.clone()
        };
        self.store.save(self.session_id, section::CHAT, &persisted);

        if engine.take_reopened() {
            if let Err(e) = self.store.reopen_assessment(self.session_id, engine.responses()) {
                tracing::warn!(session_id = %self.session_id, error = %e, "failed to reopen assessment");
            }
        }
        if let Some(done) = engine.take_completed() {
            self.store
                .save_summary(self.session_id, &done.summary, &done.form_data);
            if let Err(e) = self.store.complete_assessment(self.session_id, &done.responses) {
                tracing::warn!(session_id = %self.session_id, error = %e, "failed to mark assessment complete");
            }
        }

        self.updates.send_replace(snapshot.clone());
        engine.take_scheduled_commit()
    }
}

/// One open conversation. Intents are applied in arrival order; a pending
/// responder call does not hold the engine, so crisis scanning of a newer
/// message is never queued behind it.
pub struct ChatSession {
    engine: Arc<Mutex<ConversationEngine>>,
    publisher: Publisher,
    recording_delay: Duration,
}

impl ChatSession {
    pub fn new(mut engine: ConversationEngine, store: SessionStore) -> Self {
        let session_id = engine.session_id();
        let recording_delay = engine.settings().recording_delay;
        let snapshot = engine.snapshot();
        let (updates, _) = watch::channel(snapshot.clone());
        let publisher = Publisher {
            store,
            session_id,
            updates,
        };
        // A restore may have finished an assessment that was mid-commit.
        publisher.publish(&mut engine, &snapshot);

        Self {
            engine: Arc::new(Mutex::new(engine)),
            publisher,
            recording_delay,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.publisher.session_id
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatSnapshot> {
        self.publisher.updates.subscribe()
    }

    pub async fn snapshot(&self) -> ChatSnapshot {
        self.engine.lock().await.snapshot()
    }

    pub async fn handle(&self, intent: ChatIntent) -> Result<ChatSnapshot, ChatError> {
        let (request, responder) = {
            let mut engine = self.engine.lock().await;
            let (request, snapshot) = match intent {
                ChatIntent::SendMessage { text } => {
                    let request = engine.receive_message(&text)?;
                    (request, engine.snapshot())
                }
                other => (None, engine.handle_sync(other)?),
            };
            self.settle(&mut engine, &snapshot);
            match request {
                Some(request) => (request, engine.responder()),
                None => return Ok(snapshot),
            }
        };

        let reply = responder.respond(&request).await;

        let mut engine = self.engine.lock().await;
        engine.apply_reply(reply);
        let snapshot = engine.snapshot();
        self.settle(&mut engine, &snapshot);
        Ok(snapshot)
    }

    fn settle(&self, engine: &mut ConversationEngine, snapshot: &ChatSnapshot) {
        if let Some(question_id) = self.publisher.publish(engine, snapshot) {
            self.schedule_commit(question_id);
        }
    }

    /// Commit a recorded answer once the recording delay has passed. Runs
    /// detached and survives the session being dropped.
    fn schedule_commit(&self, question_id: String) {
        let engine = Arc::clone(&self.engine);
        let publisher = self.publisher.clone();
        let delay = self.recording_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut engine = engine.lock().await;
            if engine.recording() != Some(question_id.as_str()) {
                tracing::debug!(%question_id, "commit superseded");
                return;
            }
            match engine.handle_sync(ChatIntent::CommitAnswer) {
                Ok(snapshot) => {
                    publisher.publish(&mut engine, &snapshot);
                }
                Err(e) => {
                    tracing::warn!(%question_id, error = %e, "failed to commit answer");
                }
            }
        });
    }
}
