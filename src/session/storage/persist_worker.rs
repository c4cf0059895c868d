//! Background write-through worker.
//!
//! Mutations enqueue serialized snapshots and return immediately. A single
//! tokio task drains the queue in order, so the last write for a key always
//! wins. Failures are logged and dropped.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::session::storage::durable_store::DurableStore;

enum PersistCommand {
    Save { key: String, value: String },
    Flush(oneshot::Sender<()>),
}

/// Handle to the background writer.
#[derive(Clone)]
pub struct PersistWorker {
    tx: mpsc::UnboundedSender<PersistCommand>,
}

impl PersistWorker {
    /// Spawn the writer task on the current tokio runtime.
    ///
    /// The task exits once every handle has been dropped.
    #[must_use]
    pub fn spawn(store: Arc<dyn DurableStore>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, rx));
        (Self { tx }, handle)
    }

    /// Serialize `value` and queue it for `key`.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let value = match serde_json::to_string(value) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "Failed to serialize state for persistence");
                return;
            }
        };

        let command = PersistCommand::Save {
            key: key.to_string(),
            value,
        };
        if self.tx.send(command).is_err() {
            warn!(key, "Persistence worker is gone, dropping write");
        }
    }

    /// Wait until every write queued before this call has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(PersistCommand::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }
}

async fn run(store: Arc<dyn DurableStore>, mut rx: mpsc::UnboundedReceiver<PersistCommand>) {
    while let Some(command) = rx.recv().await {
        match command {
            PersistCommand::Save { key, value } => {
                if let Err(err) = store.save(&key, value).await {
                    warn!(key, %err, "Persistence write failed");
                } else {
                    debug!(key, "Persisted state");
                }
            }
            PersistCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Persistence worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::memory_store::InMemoryStore;

    #[tokio::test]
    async fn test_writes_apply_in_order() {
        let store = Arc::new(InMemoryStore::new());
        let (worker, _handle) = PersistWorker::spawn(store.clone());

        for n in 0..10 {
            worker.save("counter", &n);
        }
        worker.flush().await;

        assert_eq!(store.raw("counter").as_deref(), Some("9"));
    }

    #[tokio::test]
    async fn test_worker_stops_when_handles_drop() {
        let store = Arc::new(InMemoryStore::new());
        let (worker, handle) = PersistWorker::spawn(store.clone());
        worker.save("k", "v");
        drop(worker);

        handle.await.unwrap();
        assert_eq!(store.raw("k").as_deref(), Some("\"v\""));
    }
}
