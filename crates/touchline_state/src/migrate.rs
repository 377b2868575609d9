//! Versioned schema migrations.
//!
//! Each step is a pure function from one on-disk layout to the next. Steps run
//! in order until the record reaches [`CURRENT_SCHEMA_VERSION`], after which it
//! is deserialized into a typed [`StateRecord`].
//!
//! | Version | Layout |
//! |---------|--------|
//! | 1 | `actions_log`, `next_action_after`, `replied_ids`, `last_mention_id`, `last_tweet_ids` |
//! | 2 | `schema_version`, `tweets_today`, `posted_event_ids`, cursors as in v1, `recent_metaphors` |
//! | 3 | `schema_version`, `actions`, `seen`, `cursors`, `recent_techniques` |

use serde_json::{Map, Value, json};
use touchline_error::{StorageError, StorageErrorKind};
use tracing::{debug, info};

use crate::{StateRecord, StateResult};

/// Newest layout this build reads and writes.
pub const CURRENT_SCHEMA_VERSION: u32 = 3;

type Object = Map<String, Value>;
type Step = fn(Object) -> Result<Object, String>;

/// Migration steps indexed by the version they migrate from.
const STEPS: [(u32, Step); 2] = [(1, v1_to_v2), (2, v2_to_v3)];

/// Work out which layout a raw record uses.
///
/// Records without an explicit `schema_version` predate versioning: the ones
/// carrying `tweets_today` or `posted_event_ids` are v2, anything else is v1.
pub fn detect_version(raw: &Object) -> u64 {
    if let Some(version) = raw.get("schema_version").and_then(Value::as_u64) {
        return version;
    }
    if raw.contains_key("tweets_today") || raw.contains_key("posted_event_ids") {
        2
    } else {
        1
    }
}

/// Upgrade a raw record of any known version and parse it.
///
/// # Errors
///
/// Fails when the value is not a JSON object, when it was written by a newer
/// release, when a step rejects it, or when the upgraded record does not match
/// the current layout.
#[tracing::instrument(skip(value))]
pub fn migrate(value: Value) -> StateResult<StateRecord> {
    let Value::Object(mut raw) = value else {
        return Err(StorageError::new(StorageErrorKind::Parse(
            "state root must be a JSON object".to_string(),
        )));
    };

    let found = detect_version(&raw);
    let mut version = u32::try_from(found)
        .ok()
        .filter(|&v| v <= CURRENT_SCHEMA_VERSION)
        .ok_or_else(|| {
            StorageError::new(StorageErrorKind::UnsupportedVersion {
                found,
                supported: CURRENT_SCHEMA_VERSION,
            })
        })?;

    for (from, step) in STEPS {
        if version != from {
            continue;
        }
        raw = step(raw)
            .map_err(|reason| StorageError::new(StorageErrorKind::Migration { from, reason }))?;
        version = from + 1;
        info!(from, to = version, "Migrated state schema");
    }

    debug!(version, "State schema is current");
    serde_json::from_value(Value::Object(raw))
        .map_err(|e| StorageError::new(StorageErrorKind::Parse(e.to_string())))
}

/// v1 to v2: rename the action and dedupe lists, drop stray keys.
pub fn v1_to_v2(mut v1: Object) -> Result<Object, String> {
    let mut v2 = Object::new();
    v2.insert("schema_version".into(), json!(2));
    v2.insert(
        "tweets_today".into(),
        array_or_empty(v1.remove("actions_log"), "actions_log")?,
    );
    v2.insert(
        "posted_event_ids".into(),
        array_or_empty(v1.remove("replied_ids"), "replied_ids")?,
    );
    for key in ["next_action_after", "last_mention_id", "last_tweet_ids"] {
        if let Some(value) = v1.remove(key) {
            v2.insert(key.into(), value);
        }
    }
    Ok(v2)
}

/// v2 to v3: group the action fields, stringify ids, collect cursors.
pub fn v2_to_v3(mut v2: Object) -> Result<Object, String> {
    let mut timestamps = Vec::new();
    for entry in as_array(v2.remove("tweets_today"), "tweets_today")? {
        let secs = entry
            .as_f64()
            .ok_or_else(|| format!("tweets_today entry {entry} is not a number"))?;
        timestamps.push(secs.floor() as i64);
    }
    timestamps.sort_unstable();

    let next_action_after = match v2.remove("next_action_after") {
        None | Some(Value::Null) => Value::Null,
        Some(v) => {
            let secs = v
                .as_f64()
                .ok_or_else(|| format!("next_action_after {v} is not a number"))?;
            json!(secs.ceil() as i64)
        }
    };

    let mut seen = Vec::new();
    for entry in as_array(v2.remove("posted_event_ids"), "posted_event_ids")? {
        seen.push(Value::String(id_string(&entry, "posted_event_ids")?));
    }

    let mut cursors = Object::new();
    if let Some(id) = v2.remove("last_mention_id").filter(|v| !v.is_null()) {
        cursors.insert("mentions".into(), json!(id_string(&id, "last_mention_id")?));
    }
    match v2.remove("last_tweet_ids") {
        None | Some(Value::Null) => {}
        Some(Value::Object(per_user)) => {
            for (user, id) in per_user {
                if id.is_null() {
                    continue;
                }
                cursors.insert(
                    format!("timeline:{user}"),
                    json!(id_string(&id, "last_tweet_ids")?),
                );
            }
        }
        Some(other) => return Err(format!("last_tweet_ids {other} is not an object")),
    }

    let recent_techniques = as_array(v2.remove("recent_metaphors"), "recent_metaphors")?;

    let mut v3 = Object::new();
    v3.insert("schema_version".into(), json!(3));
    v3.insert(
        "actions".into(),
        json!({
            "timestamps": timestamps,
            "last_action_at": timestamps.last(),
            "next_action_after": next_action_after,
        }),
    );
    v3.insert("seen".into(), Value::Array(seen));
    v3.insert("cursors".into(), Value::Object(cursors));
    v3.insert("recent_techniques".into(), Value::Array(recent_techniques));
    Ok(v3)
}

fn array_or_empty(value: Option<Value>, field: &str) -> Result<Value, String> {
    as_array(value, field).map(Value::Array)
}

fn as_array(value: Option<Value>, field: &str) -> Result<Vec<Value>, String> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(format!("{field} must be a list, found {other}")),
    }
}

/// Older layouts stored ids as JSON numbers.
fn id_string(value: &Value, field: &str) -> Result<String, String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("{field} entry {other} is not an id")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(value: Value) -> Object {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_detect_version() {
        assert_eq!(detect_version(&object(json!({"schema_version": 3}))), 3);
        assert_eq!(detect_version(&object(json!({"tweets_today": []}))), 2);
        assert_eq!(detect_version(&object(json!({"posted_event_ids": []}))), 2);
        assert_eq!(detect_version(&object(json!({"actions_log": []}))), 1);
        assert_eq!(detect_version(&Object::new()), 1);
    }

    #[test]
    fn test_v1_to_v2_renames_and_drops_strays() {
        let v1 = object(json!({
            "actions_log": [100.5, 200.0],
            "replied_ids": [1790, "1791"],
            "last_mention_id": 1800,
            "debug_counter": 7,
        }));
        let v2 = v1_to_v2(v1).unwrap();

        assert_eq!(v2["schema_version"], json!(2));
        assert_eq!(v2["tweets_today"], json!([100.5, 200.0]));
        assert_eq!(v2["posted_event_ids"], json!([1790, "1791"]));
        assert_eq!(v2["last_mention_id"], json!(1800));
        assert!(!v2.contains_key("debug_counter"));
        assert!(!v2.contains_key("actions_log"));
    }

    #[test]
    fn test_v2_to_v3_builds_typed_layout() {
        let v2 = object(json!({
            "schema_version": 2,
            "tweets_today": [300.9, 100.2],
            "posted_event_ids": [1790, "365_ft_9"],
            "next_action_after": 999.1,
            "last_mention_id": "1800",
            "last_tweet_ids": {"19672628": 1801, "34613288": null},
            "recent_metaphors": ["firmware"],
        }));
        let v3 = v2_to_v3(v2).unwrap();

        assert_eq!(v3["actions"]["timestamps"], json!([100, 300]));
        assert_eq!(v3["actions"]["last_action_at"], json!(300));
        assert_eq!(v3["actions"]["next_action_after"], json!(1000));
        assert_eq!(v3["seen"], json!(["1790", "365_ft_9"]));
        assert_eq!(
            v3["cursors"],
            json!({"mentions": "1800", "timeline:19672628": "1801"})
        );
        assert_eq!(v3["recent_techniques"], json!(["firmware"]));
    }

    #[test]
    fn test_v2_to_v3_rejects_bad_timestamp() {
        let v2 = object(json!({"tweets_today": ["yesterday"]}));
        let err = v2_to_v3(v2).unwrap_err();
        assert!(err.contains("tweets_today"));
    }

    #[test]
    fn test_migrate_rejects_newer_version() {
        let err = migrate(json!({"schema_version": 4})).unwrap_err();
        assert_eq!(
            err.kind(),
            &StorageErrorKind::UnsupportedVersion {
                found: 4,
                supported: 3
            }
        );
    }

    #[test]
    fn test_migrate_rejects_version_beyond_u32() {
        let err = migrate(json!({"schema_version": 4_294_967_299u64})).unwrap_err();
        assert_eq!(
            err.kind(),
            &StorageErrorKind::UnsupportedVersion {
                found: 4_294_967_299,
                supported: 3
            }
        );
    }

    #[test]
    fn test_migrate_rejects_non_object() {
        let err = migrate(json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err.kind(), StorageErrorKind::Parse(_)));
    }

    #[test]
    fn test_migrate_reports_failing_step() {
        let err = migrate(json!({"schema_version": 2, "last_tweet_ids": [1]})).unwrap_err();
        assert!(matches!(
            err.kind(),
            StorageErrorKind::Migration { from: 2, .. }
        ));
    }
}
