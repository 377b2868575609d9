//! In-memory state paired with its durable backend.

use touchline_core::{ItemId, SourceKey, Timestamp};
use tracing::{debug, instrument};

use crate::{StateRecord, StateResult, StateStore};

/// The live state record and the store it is flushed to.
///
/// The record is mutated in memory by the single control loop and written
/// back with [`persist`](Self::persist) after every mutation, so a crash loses
/// at most the in-flight cycle.
pub struct PersistentState {
    record: StateRecord,
    store: Box<dyn StateStore>,
    retention_secs: i64,
}

impl std::fmt::Debug for PersistentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentState")
            .field("store", &self.store.describe())
            .field("retention_secs", &self.retention_secs)
            .field("record", &self.record)
            .finish()
    }
}

impl PersistentState {
    /// Load the record from `store`.
    ///
    /// `retention_secs` bounds the action log on every persist and
    /// `dedupe_capacity` bounds the seen set.
    #[instrument(skip(store), fields(store = %store.describe()))]
    pub async fn open(
        store: Box<dyn StateStore>,
        retention_secs: i64,
        dedupe_capacity: usize,
    ) -> StateResult<Self> {
        let mut record = store.load().await?;
        record.seen.set_capacity(dedupe_capacity);
        Ok(Self {
            record,
            store,
            retention_secs,
        })
    }

    /// Current record.
    pub fn record(&self) -> &StateRecord {
        &self.record
    }

    /// Mutable access to the record; call [`persist`](Self::persist) afterwards.
    pub fn record_mut(&mut self) -> &mut StateRecord {
        &mut self.record
    }

    /// Prune the action log and write the record through the store.
    #[instrument(skip(self))]
    pub async fn persist(&mut self, now: Timestamp) -> StateResult<()> {
        self.record.prune(now, self.retention_secs);
        self.store.save(&self.record).await
    }

    /// Whether the item key was already handled.
    pub fn is_seen(&self, key: &str) -> bool {
        self.record.seen.contains(key)
    }

    /// Remember an item key as handled.
    pub fn mark_seen(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        debug!(item_id = %key, "Marking item seen");
        self.record.seen.insert(key)
    }

    /// Last seen id for `source`.
    pub fn cursor(&self, source: &SourceKey) -> Option<&ItemId> {
        self.record.cursors.get(source)
    }

    /// Move the cursor for `source` forward to `newest`.
    pub fn advance_cursor(&mut self, source: &SourceKey, newest: ItemId) -> bool {
        let moved = self.record.cursors.advance(source, newest.clone());
        if moved {
            debug!(source = %source, cursor = %newest, "Advanced cursor");
        }
        moved
    }

    /// Description of the backing store.
    pub fn describe_store(&self) -> String {
        self.store.describe()
    }
}
