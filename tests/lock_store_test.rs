//! Integration tests for the SQLite lock store adapter.

use remedy::domain::ports::LockStore;
use remedy::infrastructure::database::SqliteLockStore;
use tempfile::TempDir;

async fn temp_store(dir: &TempDir) -> SqliteLockStore {
    SqliteLockStore::connect(&dir.path().join("locks.db"), 5)
        .await
        .expect("store should open in a fresh directory")
}

#[tokio::test]
async fn test_connect_creates_database_and_schema() {
    let dir = TempDir::new().unwrap();
    let store = temp_store(&dir).await;

    assert!(dir.path().join("locks.db").exists());
    assert_eq!(store.get("network_error").await.unwrap(), None);
}

#[tokio::test]
async fn test_set_get_roundtrip_and_upsert() {
    let dir = TempDir::new().unwrap();
    let store = temp_store(&dir).await;

    store.set("network_error", 1_000_000).await.unwrap();
    assert_eq!(store.get("network_error").await.unwrap(), Some(1_000_000));

    // Second set replaces the record instead of erroring.
    store.set("network_error", 2_000_000).await.unwrap();
    assert_eq!(store.get("network_error").await.unwrap(), Some(2_000_000));
}

#[tokio::test]
async fn test_records_survive_reconnect() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("locks.db");

    {
        let store = SqliteLockStore::connect(&path, 5).await.unwrap();
        store.set("disk_full", 1_700_000_000).await.unwrap();
    }

    let reopened = SqliteLockStore::connect(&path, 5).await.unwrap();
    assert_eq!(reopened.get("disk_full").await.unwrap(), Some(1_700_000_000));
}

#[tokio::test]
async fn test_list_ordered_and_clear() {
    let dir = TempDir::new().unwrap();
    let store = temp_store(&dir).await;

    store.set("worker_oom", 2).await.unwrap();
    store.set("disk_full", 1).await.unwrap();

    let records = store.list().await.unwrap();
    let types: Vec<_> = records.iter().map(|r| r.failure_type.as_str()).collect();
    assert_eq!(types, vec!["disk_full", "worker_oom"]);

    assert!(store.clear("worker_oom").await.unwrap());
    assert!(!store.clear("worker_oom").await.unwrap());
    assert_eq!(store.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_writers_lose_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("locks.db");

    // Two independent connections to the same database file, as if two
    // dispatcher processes raced on near-simultaneous webhooks.
    let store_a = SqliteLockStore::connect(&path, 2).await.unwrap();
    let store_b = SqliteLockStore::connect(&path, 2).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20i64 {
        let store = if i % 2 == 0 {
            store_a.clone()
        } else {
            store_b.clone()
        };
        handles.push(tokio::spawn(async move {
            store
                .set(&format!("failure_{i}"), 1_000_000 + i)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let records = store_a.list().await.unwrap();
    assert_eq!(records.len(), 20, "no concurrent write may be lost");
}

#[tokio::test]
async fn test_contended_key_keeps_one_record() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("locks.db");
    let store_a = SqliteLockStore::connect(&path, 2).await.unwrap();
    let store_b = SqliteLockStore::connect(&path, 2).await.unwrap();

    let a = tokio::spawn({
        let store = store_a.clone();
        async move { store.set("network_error", 111).await }
    });
    let b = tokio::spawn({
        let store = store_b.clone();
        async move { store.set("network_error", 222).await }
    });
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let value = store_a.get("network_error").await.unwrap();
    assert!(
        value == Some(111) || value == Some(222),
        "one writer wins cleanly, got {value:?}"
    );
    assert_eq!(store_a.list().await.unwrap().len(), 1);
}
