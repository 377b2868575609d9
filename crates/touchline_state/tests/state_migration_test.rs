use serde_json::json;
use touchline_core::{ItemId, SourceKey, UserId};
use touchline_state::{CURRENT_SCHEMA_VERSION, migrate};

#[test]
fn test_v1_record_reaches_current_layout() {
    let v1 = json!({
        "actions_log": [1_700_000_100.7, 1_700_000_000.1],
        "next_action_after": 1_700_000_800.2,
        "replied_ids": [1790, 1791],
        "last_mention_id": 1800,
        "last_tweet_ids": {"19672628": 1801, "34613288": null},
        "stale_flag": true
    });

    let record = migrate(v1).unwrap();

    assert_eq!(record.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(
        record.actions.timestamps(),
        &[1_700_000_000, 1_700_000_100]
    );
    assert_eq!(record.actions.last_action_at(), Some(1_700_000_100));
    assert_eq!(record.actions.next_action_after(), Some(1_700_000_801));
    assert!(record.seen.contains("1790"));
    assert!(record.seen.contains("1791"));
    assert_eq!(
        record.cursors.get(&SourceKey::Mentions),
        Some(&ItemId::from("1800"))
    );
    assert_eq!(
        record
            .cursors
            .get(&SourceKey::Timeline(UserId::from("19672628"))),
        Some(&ItemId::from("1801"))
    );
    assert_eq!(
        record
            .cursors
            .get(&SourceKey::Timeline(UserId::from("34613288"))),
        None
    );
    assert!(record.recent_techniques.is_empty());
}

#[test]
fn test_empty_object_is_an_empty_record() {
    let record = migrate(json!({})).unwrap();
    assert!(record.actions.timestamps().is_empty());
    assert!(record.seen.is_empty());
    assert!(record.cursors.is_empty());
}

#[test]
fn test_current_record_passes_through() {
    let v3 = json!({
        "schema_version": 3,
        "actions": {"timestamps": [10, 20], "last_action_at": 20, "next_action_after": 650},
        "seen": ["a", "b"],
        "cursors": {"mentions": "42"},
        "recent_techniques": ["lag"]
    });

    let record = migrate(v3).unwrap();
    assert_eq!(record.actions.timestamps(), &[10, 20]);
    assert_eq!(record.actions.next_action_after(), Some(650));
    assert_eq!(record.seen.len(), 2);
    assert_eq!(record.recent_techniques.iter().collect::<Vec<_>>(), ["lag"]);
}

#[test]
fn test_oversized_seen_list_loads_whole_then_bounds_to_newest() {
    let ids: Vec<String> = (0..2100).map(|i| i.to_string()).collect();
    let mut record = migrate(json!({"posted_event_ids": ids})).unwrap();
    assert_eq!(record.seen.len(), 2100);

    record.seen.set_capacity(2000);

    assert_eq!(record.seen.len(), 2000);
    assert!(!record.seen.contains("99"));
    assert!(record.seen.contains("2099"));
}
