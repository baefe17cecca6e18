//! Durable key-value storage shared between the update pipeline and display
//! clients.
//!
//! Entries live in a single JSON object on disk. Every write rewrites the
//! whole file through a temporary sibling and a rename, then notifies all
//! subscribers of the changed key.

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::{
    background::gas_state::{GasState, GAS_STATE_KEY},
    errors::pipeline_error::StorageError,
};

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Notification delivered to subscribers after a successful write.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    pub new_value: Value,
}

#[derive(Clone)]
pub struct GasStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: Option<PathBuf>,
    entries: Mutex<Map<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl GasStore {
    /// Opens the store backed by `path`. A missing file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Map<String, Value>>(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        info!(path = %path.display(), keys = entries.len(), "Opened storage");
        Ok(Self::with_entries(Some(path), entries))
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::with_entries(None, Map::new())
    }

    fn with_entries(path: Option<PathBuf>, entries: Map<String, Value>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                path,
                entries: Mutex::new(entries),
                changes,
            }),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let entries = self.inner.entries.lock().await;
        entries
            .get(key)
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(StorageError::from)
    }

    /// Overwrites `key`. Nothing changes in memory if the disk write fails.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let new_value = serde_json::to_value(value)?;
        let mut entries = self.inner.entries.lock().await;

        let mut next = entries.clone();
        next.insert(key.to_string(), new_value.clone());

        if let Some(path) = &self.inner.path {
            write_atomically(path, &next).await?;
        }
        *entries = next;
        drop(entries);

        debug!(key, "Storage entry written");
        // No subscribers is fine.
        let _ = self.inner.changes.send(StorageChange {
            key: key.to_string(),
            new_value,
        });

        Ok(())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.inner.changes.subscribe()
    }

    pub async fn load_gas_state(&self) -> Result<Option<GasState>, StorageError> {
        self.get(GAS_STATE_KEY).await
    }

    pub async fn save_gas_state(&self, state: &GasState) -> Result<(), StorageError> {
        self.set(GAS_STATE_KEY, state).await
    }
}

async fn write_atomically(path: &Path, entries: &Map<String, Value>) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(entries)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
