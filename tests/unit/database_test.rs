//! Unit tests for the tabwarden database layer (connection, migrations, key/value store).

use serde_json::json;
use tempfile::TempDir;

use tabwarden::database::migrations::{get_schema_version, CURRENT_SCHEMA_VERSION};
use tabwarden::database::{Database, SqliteStorage};
use tabwarden::host::StorageArea;

#[test]
fn test_open_in_memory_succeeds() {
    let db = Database::open_in_memory();
    assert!(db.is_ok(), "open_in_memory should succeed");
}

#[test]
fn test_migrations_create_kv_store() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let exists: bool = db
        .connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='kv_store'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);
    assert!(exists, "kv_store should exist after migrations");
}

#[test]
fn test_migrations_create_indexes() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    let exists: bool = db
        .connection()
        .query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='index' AND name='idx_kv_store_updated_at'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);
    assert!(exists, "updated_at index should exist after migrations");
}

#[test]
fn test_schema_version_is_current() {
    let db = Database::open_in_memory().expect("open_in_memory failed");
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
}

#[test]
fn test_reopen_keeps_data_and_version() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tabwarden.db");

    {
        let mut storage = SqliteStorage::new(Database::open(&path).unwrap());
        storage.set("lastSessionId", json!("1700000000000")).unwrap();
    }

    let db = Database::open(&path).unwrap();
    assert_eq!(get_schema_version(db.connection()), CURRENT_SCHEMA_VERSION);
    let storage = SqliteStorage::new(db);
    assert_eq!(
        storage.get("lastSessionId").unwrap(),
        Some(json!("1700000000000"))
    );
}

#[test]
fn test_kv_store_roundtrips_nested_json() {
    let mut storage = SqliteStorage::in_memory().unwrap();
    let value = json!({
        "https://example.com/": {"lastShown": 1, "totalShown": 2, "responses": {"close": 1, "ignore": 0}}
    });
    storage.set("notificationRecord", value.clone()).unwrap();
    assert_eq!(storage.get("notificationRecord").unwrap(), Some(value));
}

#[test]
fn test_kv_store_remove_and_keys() {
    let mut storage = SqliteStorage::in_memory().unwrap();
    storage.set("b", json!(2)).unwrap();
    storage.set("a", json!(1)).unwrap();
    assert_eq!(storage.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

    storage.remove("a").unwrap();
    storage.remove("missing").unwrap();
    assert_eq!(storage.get("a").unwrap(), None);
    assert_eq!(storage.keys().unwrap(), vec!["b".to_string()]);
}
