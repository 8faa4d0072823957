//! Preference storage backends.
//!
//! A preference store maps string keys to sets of strings. The history keeps
//! one entry in it; the trait stays generic so the same file can hold other
//! preferences later.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::{ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// On-disk and in-memory shape of a preference store.
pub type Preferences = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to replace preference file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Persistence trait for string-set preferences.
#[async_trait]
pub trait PreferenceBackend: Send + Sync {
    /// Current set stored under `key`, `None` when the key is unset.
    async fn read_set(&self, key: &str) -> Result<Option<BTreeSet<String>>, StoreError>;

    /// Replace the set stored under `key`.
    async fn write_set(&self, key: &str, values: &BTreeSet<String>) -> Result<(), StoreError>;

    /// Remove `key` entirely.
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Volatile backend for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    prefs: RwLock<Preferences>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with raw preferences.
    pub fn with_preferences(prefs: Preferences) -> Self {
        Self {
            prefs: RwLock::new(prefs),
        }
    }
}

#[async_trait]
impl PreferenceBackend for MemoryBackend {
    async fn read_set(&self, key: &str) -> Result<Option<BTreeSet<String>>, StoreError> {
        Ok(self.prefs.read().await.get(key).cloned())
    }

    async fn write_set(&self, key: &str, values: &BTreeSet<String>) -> Result<(), StoreError> {
        self.prefs
            .write()
            .await
            .insert(key.to_string(), values.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.prefs.write().await.remove(key);
        Ok(())
    }
}

/// Single JSON file backend.
///
/// Every write replaces the whole file through a temp file in the same
/// directory and an atomic rename, so a crash never leaves a torn file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn update<F>(&self, edit: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Preferences) + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut prefs = load_preferences(&path)?;
            edit(&mut prefs);
            save_preferences(&path, &prefs)
        })
        .await?
    }
}

#[async_trait]
impl PreferenceBackend for FileBackend {
    async fn read_set(&self, key: &str) -> Result<Option<BTreeSet<String>>, StoreError> {
        let path = self.path.clone();
        let mut prefs = tokio::task::spawn_blocking(move || load_preferences(&path)).await??;
        Ok(prefs.remove(key))
    }

    async fn write_set(&self, key: &str, values: &BTreeSet<String>) -> Result<(), StoreError> {
        let key = key.to_string();
        let values = values.clone();
        self.update(move |prefs| {
            prefs.insert(key, values);
        })
        .await
    }

    /// Remove `key`. A file that no longer parses is replaced by an empty
    /// store, so clearing always recovers from corruption.
    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let key = key.to_string();
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut prefs = match load_preferences(&path) {
                Ok(prefs) => prefs,
                Err(StoreError::Serialization(e)) => {
                    warn!(path = %path.display(), error = %e, "Discarding unreadable preferences");
                    Preferences::new()
                }
                Err(e) => return Err(e),
            };
            prefs.remove(&key);
            save_preferences(&path, &prefs)
        })
        .await?
    }
}

fn load_preferences(path: &Path) -> Result<Preferences, StoreError> {
    match fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Preferences::new()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(Preferences::new()),
        Err(e) => Err(e.into()),
    }
}

fn save_preferences(path: &Path, prefs: &Preferences) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
    serde_json::to_writer_pretty(&mut tmp, prefs)?;
    tmp.write_all(b"\n")?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    debug!(path = %path.display(), keys = prefs.len(), "Saved preferences");
    Ok(())
}
