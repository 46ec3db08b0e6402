//! Debounced, fire-and-forget page saves.
//!
//! Saves are queued on a channel and written by a background task once no
//! newer save has arrived for the debounce window. A newer snapshot of the
//! same section replaces the queued one, so a burst of blurs produces one
//! write carrying the latest values. Dropping every [`AutoSaver`] flushes
//! whatever is still queued before the task exits.

use std::collections::BTreeMap;
use std::time::Duration;

use intake_storage::SessionStore;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

pub const AUTOSAVE_DEBOUNCE: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Copy)]
pub struct AutosaveSettings {
    pub debounce: Duration,
}

impl Default for AutosaveSettings {
    fn default() -> Self {
        Self {
            debounce: AUTOSAVE_DEBOUNCE,
        }
    }
}

/// A full snapshot of one page, bound for one section.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSave {
    pub session_id: Uuid,
    pub section: &'static str,
    pub data: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct AutoSaver {
    tx: mpsc::UnboundedSender<PageSave>,
}

impl AutoSaver {
    /// Start the background writer. The returned handle completes after the
    /// last sender is dropped and pending saves are flushed.
    pub fn spawn(store: SessionStore, settings: AutosaveSettings) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, settings.debounce, rx));
        (Self { tx }, handle)
    }

    pub fn queue(&self, save: PageSave) {
        if let Err(e) = self.tx.send(save) {
            tracing::warn!(
                session_id = %e.0.session_id,
                section = e.0.section,
                "autosave writer has stopped, dropping save"
            );
        }
    }
}

type Pending = BTreeMap<(Uuid, &'static str), serde_json::Value>;

async fn run(store: SessionStore, debounce: Duration, mut rx: mpsc::UnboundedReceiver<PageSave>) {
    let mut pending = Pending::new();

    loop {
        if pending.is_empty() {
            match rx.recv().await {
                Some(save) => {
                    pending.insert((save.session_id, save.section), save.data);
                }
                None => break,
            }
            continue;
        }

        tokio::select! {
            received = rx.recv() => match received {
                Some(save) => {
                    pending.insert((save.session_id, save.section), save.data);
                }
                None => {
                    flush(&store, &mut pending);
                    break;
                }
            },
            _ = tokio::time::sleep(debounce) => flush(&store, &mut pending),
        }
    }

    tracing::debug!("autosave writer stopped");
}

fn flush(store: &SessionStore, pending: &mut Pending) {
    for ((session_id, section), data) in std::mem::take(pending) {
        store.save(session_id, section, &data);
    }
}
