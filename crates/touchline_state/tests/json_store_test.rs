use serde_json::json;
use touchline_core::{ItemId, SourceKey, UserId};
use touchline_error::StorageErrorKind;
use touchline_state::{JsonStateStore, PersistentState, StateRecord, StateStore};

#[tokio::test]
async fn test_missing_file_loads_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStateStore::new(dir.path().join("bot_state.json"));

    let record = store.load().await.unwrap();
    assert_eq!(record, StateRecord::default());
}

#[tokio::test]
async fn test_save_then_load_preserves_record() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStateStore::new(dir.path().join("nested/dir/bot_state.json"));

    let mut record = StateRecord::default();
    record.actions.push(1_700_000_000, 1_700_000_630);
    record.seen.insert("1790");
    record
        .cursors
        .advance(&SourceKey::Mentions, ItemId::from("1800"));
    record.recent_techniques.push("firmware");
    store.save(&record).await.unwrap();

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, record);
    assert!(!dir.path().join("nested/dir/bot_state.json.tmp").exists());
}

#[tokio::test]
async fn test_saved_file_carries_schema_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot_state.json");
    let store = JsonStateStore::new(&path);
    store.save(&StateRecord::default()).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["schema_version"], json!(3));
}

#[tokio::test]
async fn test_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot_state.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = JsonStateStore::new(&path).load().await.unwrap_err();
    assert!(matches!(err.kind(), StorageErrorKind::Parse(_)));
}

#[tokio::test]
async fn test_legacy_file_is_upgraded_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot_state.json");
    std::fs::write(
        &path,
        json!({
            "tweets_today": [1_700_000_000.25],
            "posted_event_ids": ["365_ft_9"],
            "last_mention_id": null,
            "last_tweet_ids": {"19672628": "1801"}
        })
        .to_string(),
    )
    .unwrap();

    let store = JsonStateStore::new(&path);
    let record = store.load().await.unwrap();
    assert_eq!(record.actions.timestamps(), &[1_700_000_000]);
    assert!(record.seen.contains("365_ft_9"));
    assert_eq!(
        record
            .cursors
            .get(&SourceKey::Timeline(UserId::from("19672628"))),
        Some(&ItemId::from("1801"))
    );
    assert_eq!(record.cursors.get(&SourceKey::Mentions), None);
}

#[tokio::test]
async fn test_persistent_state_writes_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot_state.json");

    let mut state = PersistentState::open(Box::new(JsonStateStore::new(&path)), 86_400, 2000)
        .await
        .unwrap();
    state.mark_seen("1790");
    state.advance_cursor(&SourceKey::Mentions, ItemId::from("1791"));
    state.persist(1_700_000_000).await.unwrap();

    let reopened = PersistentState::open(Box::new(JsonStateStore::new(&path)), 86_400, 2000)
        .await
        .unwrap();
    assert!(reopened.is_seen("1790"));
    assert_eq!(
        reopened.cursor(&SourceKey::Mentions),
        Some(&ItemId::from("1791"))
    );
}

#[tokio::test]
async fn test_large_dedupe_bound_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bot_state.json");

    let mut state = PersistentState::open(Box::new(JsonStateStore::new(&path)), 86_400, 5000)
        .await
        .unwrap();
    for i in 0..3000 {
        state.mark_seen(i.to_string());
    }
    state.persist(1_700_000_000).await.unwrap();

    let reopened = PersistentState::open(Box::new(JsonStateStore::new(&path)), 86_400, 5000)
        .await
        .unwrap();
    assert_eq!(reopened.record().seen.len(), 3000);
    assert!(reopened.is_seen("0"));
    assert!(reopened.is_seen("2999"));

    let trimmed = PersistentState::open(Box::new(JsonStateStore::new(&path)), 86_400, 1000)
        .await
        .unwrap();
    assert_eq!(trimmed.record().seen.len(), 1000);
    assert!(!trimmed.is_seen("1999"));
    assert!(trimmed.is_seen("2000"));
}
