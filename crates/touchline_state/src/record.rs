//! The state record and its bounded collections.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet, VecDeque};
use touchline_core::{ItemId, SourceKey, Timestamp};

use crate::CURRENT_SCHEMA_VERSION;

/// Default number of dedupe keys kept.
pub const DEFAULT_DEDUPE_CAPACITY: usize = 2000;

/// Default number of recently used techniques kept.
pub const DEFAULT_TECHNIQUE_CAPACITY: usize = 20;

/// Everything the bot persists between runs.
///
/// # Examples
///
/// ```
/// use touchline_state::{StateRecord, CURRENT_SCHEMA_VERSION};
///
/// let record = StateRecord::default();
/// assert_eq!(record.schema_version, CURRENT_SCHEMA_VERSION);
/// assert!(record.actions.timestamps().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateRecord {
    /// Layout version of this record
    pub schema_version: u32,
    /// Publish log owned by the rate governor
    #[serde(default)]
    pub actions: ActionLog,
    /// Item keys already handled or intentionally skipped
    #[serde(default)]
    pub seen: DedupeSet,
    /// Per-source polling cursors
    #[serde(default)]
    pub cursors: Cursors,
    /// Metaphor keywords used by recent accepted replies
    #[serde(default)]
    pub recent_techniques: RecentTechniques,
}

impl Default for StateRecord {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            actions: ActionLog::default(),
            seen: DedupeSet::default(),
            cursors: Cursors::default(),
            recent_techniques: RecentTechniques::default(),
        }
    }
}

impl StateRecord {
    /// Drop action timestamps older than `retention_secs` before `now`.
    pub fn prune(&mut self, now: Timestamp, retention_secs: i64) {
        self.actions.prune(now - retention_secs);
    }
}

/// Append-only log of publish timestamps plus the humanized not-before mark.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLog {
    #[serde(default)]
    timestamps: Vec<Timestamp>,
    #[serde(default)]
    last_action_at: Option<Timestamp>,
    #[serde(default)]
    next_action_after: Option<Timestamp>,
}

impl ActionLog {
    /// Build a log from raw parts.
    pub fn from_parts(
        mut timestamps: Vec<Timestamp>,
        last_action_at: Option<Timestamp>,
        next_action_after: Option<Timestamp>,
    ) -> Self {
        timestamps.sort_unstable();
        let last_action_at = last_action_at.max(timestamps.last().copied());
        Self {
            timestamps,
            last_action_at,
            next_action_after,
        }
    }

    /// Recorded publish times, oldest first.
    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    /// Time of the most recent publish, surviving pruning.
    pub fn last_action_at(&self) -> Option<Timestamp> {
        self.last_action_at
    }

    /// Earliest time the next publish may happen.
    pub fn next_action_after(&self) -> Option<Timestamp> {
        self.next_action_after
    }

    /// Number of publishes at or after `cutoff`.
    pub fn count_since(&self, cutoff: Timestamp) -> usize {
        self.timestamps.iter().filter(|&&t| t >= cutoff).count()
    }

    /// Append a publish at `at` and set the next not-before mark.
    pub fn push(&mut self, at: Timestamp, next_action_after: Timestamp) {
        self.timestamps.push(at);
        self.last_action_at = self.last_action_at.max(Some(at));
        self.next_action_after = Some(next_action_after);
    }

    /// Keep only timestamps at or after `cutoff`.
    pub fn prune(&mut self, cutoff: Timestamp) {
        self.timestamps.retain(|&t| t >= cutoff);
    }
}

/// Bounded insertion-ordered set of handled item keys.
///
/// When full, inserting drops the oldest key. The de-duplication horizon is
/// therefore the set capacity, not a time span.
///
/// # Examples
///
/// ```
/// use touchline_state::DedupeSet;
///
/// let mut seen = DedupeSet::with_capacity(2);
/// assert!(seen.insert("a"));
/// assert!(!seen.insert("a"));
/// seen.insert("b");
/// seen.insert("c");
/// assert!(!seen.contains("a"));
/// assert!(seen.contains("c"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct DedupeSet {
    order: VecDeque<String>,
    index: HashSet<String>,
    capacity: usize,
}

impl DedupeSet {
    /// Empty set holding at most `capacity` keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            index: HashSet::new(),
            capacity: capacity.max(1),
        }
    }

    /// Change the bound, evicting the oldest keys if needed.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        self.evict();
    }

    /// Whether `key` has been handled.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains(key)
    }

    /// Record `key`. Returns false when it was already present.
    pub fn insert(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.index.contains(&key) {
            return false;
        }
        self.index.insert(key.clone());
        self.order.push_back(key);
        self.evict();
        true
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn evict(&mut self) {
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.index.remove(&oldest);
            }
        }
    }
}

impl Default for DedupeSet {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DEDUPE_CAPACITY)
    }
}

/// Loads every stored key; the owner applies its configured bound afterwards.
impl From<Vec<String>> for DedupeSet {
    fn from(keys: Vec<String>) -> Self {
        let mut set = Self::with_capacity(keys.len().max(DEFAULT_DEDUPE_CAPACITY));
        for key in keys {
            set.insert(key);
        }
        set
    }
}

impl From<DedupeSet> for Vec<String> {
    fn from(set: DedupeSet) -> Self {
        set.order.into_iter().collect()
    }
}

/// Per-source "last seen id" pointers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursors(BTreeMap<String, ItemId>);

impl Cursors {
    /// Last seen id for `source`.
    pub fn get(&self, source: &SourceKey) -> Option<&ItemId> {
        self.0.get(&source.to_string())
    }

    /// Move the cursor for `source` to `newest` if it is newer.
    ///
    /// Returns true when the cursor moved.
    ///
    /// # Examples
    ///
    /// ```
    /// use touchline_core::{ItemId, SourceKey};
    /// use touchline_state::Cursors;
    ///
    /// let mut cursors = Cursors::default();
    /// assert!(cursors.advance(&SourceKey::Mentions, ItemId::from("900")));
    /// assert!(!cursors.advance(&SourceKey::Mentions, ItemId::from("899")));
    /// assert!(cursors.advance(&SourceKey::Mentions, ItemId::from("1000")));
    /// ```
    pub fn advance(&mut self, source: &SourceKey, newest: ItemId) -> bool {
        let key = source.to_string();
        match self.0.get(&key) {
            Some(current) if !is_newer(&newest, current) => false,
            _ => {
                self.0.insert(key, newest);
                true
            }
        }
    }

    /// Number of sources with a cursor.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no cursor has been set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Platform ids are decimal snowflakes; a longer id is a later id.
fn is_newer(candidate: &ItemId, current: &ItemId) -> bool {
    let (a, b) = (candidate.as_str(), current.as_str());
    (a.len(), a) > (b.len(), b)
}

/// Bounded list of metaphor keywords used by recent accepted replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RecentTechniques {
    entries: VecDeque<String>,
    capacity: usize,
}

impl RecentTechniques {
    /// Empty log holding at most `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a technique used by an accepted reply.
    pub fn push(&mut self, technique: impl Into<String>) {
        self.entries.push_back(technique.into());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Whether `technique` appears among the last `window` entries.
    pub fn used_recently(&self, technique: &str, window: usize) -> bool {
        self.entries
            .iter()
            .rev()
            .take(window)
            .any(|t| t.eq_ignore_ascii_case(technique))
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RecentTechniques {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TECHNIQUE_CAPACITY)
    }
}

impl From<Vec<String>> for RecentTechniques {
    fn from(entries: Vec<String>) -> Self {
        let mut log = Self::default();
        for entry in entries {
            log.push(entry);
        }
        log
    }
}

impl From<RecentTechniques> for Vec<String> {
    fn from(log: RecentTechniques) -> Self {
        log.entries.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use touchline_core::UserId;

    #[test]
    fn test_count_since_includes_boundary() {
        let log = ActionLog::from_parts(vec![100, 200, 300], None, None);
        assert_eq!(log.count_since(200), 2);
        assert_eq!(log.count_since(301), 0);
        assert_eq!(log.last_action_at(), Some(300));
    }

    #[test]
    fn test_prune_keeps_last_action() {
        let mut record = StateRecord::default();
        record.actions.push(1_000, 1_600);
        record.actions.push(90_000, 90_700);
        record.prune(100_000, 86_400);

        assert_eq!(record.actions.timestamps(), &[90_000]);
        assert_eq!(record.actions.last_action_at(), Some(90_000));
        assert_eq!(record.actions.next_action_after(), Some(90_700));
    }

    #[test]
    fn test_dedupe_evicts_oldest() {
        let mut seen = DedupeSet::with_capacity(3);
        for key in ["1", "2", "3", "4"] {
            seen.insert(key);
        }
        assert_eq!(seen.len(), 3);
        assert!(!seen.contains("1"));
        assert_eq!(seen.iter().collect::<Vec<_>>(), vec!["2", "3", "4"]);
    }

    #[test]
    fn test_dedupe_shrinking_capacity_evicts() {
        let mut seen = DedupeSet::from(vec!["a".into(), "b".into(), "c".into()]);
        seen.set_capacity(1);
        assert!(seen.contains("c"));
        assert!(!seen.contains("b"));
    }

    #[test]
    fn test_dedupe_serializes_as_list() {
        let mut seen = DedupeSet::default();
        seen.insert("365_ft_9");
        seen.insert("1790");
        let json = serde_json::to_string(&seen).unwrap();
        assert_eq!(json, r#"["365_ft_9","1790"]"#);
    }

    #[test]
    fn test_cursor_only_moves_forward() {
        let mut cursors = Cursors::default();
        let source = SourceKey::Timeline(UserId::from("19672628"));
        assert!(cursors.advance(&source, ItemId::from("99")));
        assert!(cursors.advance(&source, ItemId::from("100")));
        assert!(!cursors.advance(&source, ItemId::from("100")));
        assert!(!cursors.advance(&source, ItemId::from("98")));
        assert_eq!(cursors.get(&source), Some(&ItemId::from("100")));
        assert_eq!(cursors.get(&SourceKey::Mentions), None);
    }

    #[test]
    fn test_recent_techniques_window() {
        let mut log = RecentTechniques::with_capacity(20);
        log.push("firmware");
        log.push("server");
        log.push("patch");

        assert!(log.used_recently("patch", 1));
        assert!(!log.used_recently("firmware", 2));
        assert!(log.used_recently("FIRMWARE", 3));
    }

    #[test]
    fn test_recent_techniques_bounded() {
        let mut log = RecentTechniques::with_capacity(20);
        for i in 0..25 {
            log.push(format!("t{i}"));
        }
        assert_eq!(log.len(), 20);
        assert_eq!(log.iter().next(), Some("t5"));
    }
}
