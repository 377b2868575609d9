//! Durable state backends.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use touchline_error::{StorageError, StorageErrorKind};
use tracing::{debug, info, instrument};

use crate::{StateRecord, migrate};

/// Result type for state operations.
pub type StateResult<T> = Result<T, StorageError>;

/// Loads and saves the state record.
///
/// Implementations must make `save` atomic: after a crash the previous record
/// or the new one is readable, never a mixture.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the record, upgrading older layouts.
    ///
    /// A store with nothing saved yet returns the default record.
    async fn load(&self) -> StateResult<StateRecord>;

    /// Replace the saved record.
    async fn save(&self, record: &StateRecord) -> StateResult<()>;

    /// Short description used in logs.
    fn describe(&self) -> String;
}

#[async_trait]
impl<T: StateStore + ?Sized> StateStore for std::sync::Arc<T> {
    async fn load(&self) -> StateResult<StateRecord> {
        (**self).load().await
    }

    async fn save(&self, record: &StateRecord) -> StateResult<()> {
        (**self).save(record).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// JSON file backend with temp-file-plus-rename writes.
///
/// # Examples
///
/// ```no_run
/// use touchline_state::{JsonStateStore, StateStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = JsonStateStore::new("bot_state.json");
/// let record = store.load().await?;
/// store.save(&record).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "state".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl StateStore for JsonStateStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> StateResult<StateRecord> {
        let exists = tokio::fs::try_exists(&self.path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })?;
        if !exists {
            info!("No state file yet, starting from defaults");
            return Ok(StateRecord::default());
        }

        let json = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })?;
        let value: serde_json::Value = serde_json::from_str(&json).map_err(|e| {
            StorageError::new(StorageErrorKind::Parse(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })?;

        let record = migrate(value)?;
        debug!(
            actions = record.actions.timestamps().len(),
            seen = record.seen.len(),
            cursors = record.cursors.len(),
            "State loaded"
        );
        Ok(record)
    }

    #[instrument(skip(self, record), fields(path = %self.path.display()))]
    async fn save(&self, record: &StateRecord) -> StateResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::new(StorageErrorKind::Parse(e.to_string())))?;

        // Write to a sibling temp file, then rename over the target.
        let temp = self.temp_path();
        tokio::fs::write(&temp, json).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp.display(),
                e
            )))
        })?;
        tokio::fs::rename(&temp, &self.path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                self.path.display(),
                e
            )))
        })?;

        debug!("State saved");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

/// In-memory backend for tests and dry runs without a state file.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    record: Mutex<Option<StateRecord>>,
}

impl MemoryStateStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with `record`.
    pub fn with_record(record: StateRecord) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    /// Last saved record, if any.
    pub fn snapshot(&self) -> Option<StateRecord> {
        self.record.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self) -> StateResult<StateRecord> {
        Ok(self.snapshot().unwrap_or_default())
    }

    async fn save(&self, record: &StateRecord) -> StateResult<()> {
        let mut guard = self.record.lock().map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "memory store poisoned: {e}"
            )))
        })?;
        *guard = Some(record.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
