//! HistoryStore - observable history of past scan sessions.
//!
//! Wraps a [`PreferenceBackend`] and adds change notification through a
//! `tokio::sync::watch` channel. Subscribers receive the full decoded
//! collection on subscribe and after every append or clear.
//!
//! Entries are persisted as JSON strings inside one string set stored under
//! [`HISTORY_KEY`]. Members that fail to decode are skipped with a warning
//! instead of failing the whole read.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Mutex};
use tokio_stream::wrappers::WatchStream;
use tracing::{info, warn};

use super::backend::{FileBackend, MemoryBackend, PreferenceBackend, StoreError};
use crate::client::ScanSession;

/// Preference key holding the history set.
pub const HISTORY_KEY: &str = "history";

/// Persisted record of one scan session.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub key: String,
    pub name: String,
}

impl HistoryEntry {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl From<&ScanSession> for HistoryEntry {
    fn from(session: &ScanSession) -> Self {
        Self::new(session.key.clone(), session.name.clone())
    }
}

impl From<HistoryEntry> for ScanSession {
    fn from(entry: HistoryEntry) -> Self {
        ScanSession::new(entry.key, entry.name)
    }
}

/// Receiver that yields on every history change.
pub type HistoryWatcher = watch::Receiver<Vec<HistoryEntry>>;

pub struct HistoryStore {
    backend: Arc<dyn PreferenceBackend>,
    /// Serializes read-modify-write cycles on the backend.
    write_lock: Mutex<()>,
    sender: watch::Sender<Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Open a store over `backend`, loading the current history.
    pub async fn open(backend: Arc<dyn PreferenceBackend>) -> Result<Self, StoreError> {
        let members = backend.read_set(HISTORY_KEY).await?;
        let (sender, _) = watch::channel(decode_members(members.as_ref()));
        Ok(Self {
            backend,
            write_lock: Mutex::new(()),
            sender,
        })
    }

    /// Open a store persisted in a JSON file at `path`.
    pub async fn open_file(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open(Arc::new(FileBackend::new(path))).await
    }

    /// Open a volatile store.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::open(Arc::new(MemoryBackend::new())).await
    }

    /// Live view of the history: yields the current collection first, then
    /// again after every change.
    pub fn observe(&self) -> WatchStream<Vec<HistoryEntry>> {
        WatchStream::new(self.sender.subscribe())
    }

    pub fn subscribe(&self) -> HistoryWatcher {
        self.sender.subscribe()
    }

    /// Current collection.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.sender.borrow().clone()
    }

    /// Add `entry` to the persisted set.
    pub async fn append(&self, entry: &HistoryEntry) -> Result<(), StoreError> {
        let serialized = entry.to_json()?;

        let _guard = self.write_lock.lock().await;
        let mut members = self
            .backend
            .read_set(HISTORY_KEY)
            .await?
            .unwrap_or_default();
        members.insert(serialized);
        self.backend.write_set(HISTORY_KEY, &members).await?;

        self.sender.send_replace(decode_members(Some(&members)));
        info!(key = %entry.key, name = %entry.name, "Saved history entry");
        Ok(())
    }

    /// Remove the whole history.
    pub async fn clear(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.backend.remove(HISTORY_KEY).await?;
        self.sender.send_replace(Vec::new());
        info!("Cleared history");
        Ok(())
    }
}

fn decode_members(members: Option<&BTreeSet<String>>) -> Vec<HistoryEntry> {
    let Some(members) = members else {
        return Vec::new();
    };
    members
        .iter()
        .filter_map(|raw| match HistoryEntry::from_json(raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(member = %raw, error = %e, "Skipping corrupt history entry");
                None
            }
        })
        .collect()
}
