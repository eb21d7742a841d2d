use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use nextwatch_core::error::CoreError;
use nextwatch_core::storage::Storage;

/// Async handle to the settings store. All SQLite access happens on one
/// dedicated thread; callers exchange messages with it.
#[derive(Clone)]
pub struct DbHandle {
    tx: mpsc::UnboundedSender<DbCommand>,
}

enum DbCommand {
    Get {
        key: String,
        reply: oneshot::Sender<Result<Option<String>, CoreError>>,
    },
    Set {
        key: String,
        value: serde_json::Value,
        reply: oneshot::Sender<Result<(), CoreError>>,
    },
    Remove {
        key: String,
        reply: oneshot::Sender<Result<(), CoreError>>,
    },
}

impl DbHandle {
    pub fn open(path: &Path) -> Option<Self> {
        let storage = Storage::open(path)
            .map_err(|e| tracing::error!("Failed to open database: {e}"))
            .ok()?;
        Self::spawn(storage)
    }

    /// Handle backed by an in-memory database (for tests).
    pub fn open_memory() -> Option<Self> {
        let storage = Storage::open_memory()
            .map_err(|e| tracing::error!("Failed to open in-memory database: {e}"))
            .ok()?;
        Self::spawn(storage)
    }

    /// Handle whose actor has already stopped; every request fails.
    #[cfg(test)]
    pub(crate) fn closed() -> Self {
        let (tx, _rx) = mpsc::unbounded_channel();
        Self { tx }
    }

    fn spawn(storage: Storage) -> Option<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("db-actor".into())
            .spawn(move || actor_loop(storage, rx))
            .map_err(|e| tracing::error!("Failed to spawn DB thread: {e}"))
            .ok()?;

        Some(Self { tx })
    }

    /// Decode the value under `key`, or `default` when absent or undecodable.
    pub async fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, CoreError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::Get {
            key: key.to_string(),
            reply,
        });
        let raw = rx.await.unwrap_or_else(|_| Err(actor_closed()))?;
        Ok(raw
            .and_then(|s| {
                serde_json::from_str(&s)
                    .map_err(|e| tracing::warn!(key, error = %e, "Ignoring undecodable stored value"))
                    .ok()
            })
            .unwrap_or(default))
    }

    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CoreError> {
        let value = serde_json::to_value(value)
            .map_err(|e| CoreError::Config(format!("cannot encode {key}: {e}")))?;
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::Set {
            key: key.to_string(),
            value,
            reply,
        });
        rx.await.unwrap_or_else(|_| Err(actor_closed()))
    }

    pub async fn remove(&self, key: &str) -> Result<(), CoreError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::Remove {
            key: key.to_string(),
            reply,
        });
        rx.await.unwrap_or_else(|_| Err(actor_closed()))
    }
}

fn actor_closed() -> CoreError {
    CoreError::Config("DB actor closed".into())
}

fn actor_loop(storage: Storage, mut rx: mpsc::UnboundedReceiver<DbCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            DbCommand::Get { key, reply } => {
                let _ = reply.send(storage.get_raw(&key));
            }
            DbCommand::Set { key, value, reply } => {
                let _ = reply.send(storage.set(&key, &value));
            }
            DbCommand::Remove { key, reply } => {
                let _ = reply.send(storage.remove(&key));
            }
        }
    }
    tracing::debug!("DB actor stopped");
}
