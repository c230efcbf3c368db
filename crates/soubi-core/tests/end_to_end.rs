//! Encrypted store behaviour through the public API

use serde_json::json;
use soubi_core::storage::{FORMAT_VERSION, MAGIC};
use soubi_core::{
    Document, EncryptedStore, Inventory, NewAsset, SoubiError, StorePaths, StoreState,
};
use tempfile::TempDir;

fn store_paths(dir: &TempDir) -> StorePaths {
    StorePaths::new(dir.path().join("soubi.db"))
}

#[tokio::test]
async fn test_write_then_reopen() {
    let temp_dir = TempDir::new().unwrap();

    let store = EncryptedStore::open(store_paths(&temp_dir), "abc123").await.unwrap();
    store.write(&json!({"foo": 1})).await.unwrap();
    drop(store);

    let store = EncryptedStore::open(store_paths(&temp_dir), "abc123").await.unwrap();
    let doc: Option<Document> = store.read().await.unwrap();
    assert_eq!(doc, Some(json!({"foo": 1})));

    let raw = std::fs::read(temp_dir.path().join("soubi.db")).unwrap();
    assert_eq!(&raw[..4], &MAGIC);
    assert_eq!(raw[4], FORMAT_VERSION);
    assert!(!raw.windows(5).any(|w| w == b"\"foo\""));

    let salt = std::fs::read(temp_dir.path().join("soubi.db.salt")).unwrap();
    assert_eq!(salt.len(), 32);
}

#[tokio::test]
async fn test_wrong_password_fails_to_read() {
    let temp_dir = TempDir::new().unwrap();

    let store = EncryptedStore::open(store_paths(&temp_dir), "abc123").await.unwrap();
    store.write(&json!({"foo": 1})).await.unwrap();

    let intruder = EncryptedStore::open(store_paths(&temp_dir), "letmein").await.unwrap();
    assert!(matches!(
        intruder.read::<Document>().await,
        Err(SoubiError::DecryptionFailed)
    ));
}

#[tokio::test]
async fn test_rejected_password_change_leaves_store_intact() {
    let temp_dir = TempDir::new().unwrap();

    let mut store = EncryptedStore::open(store_paths(&temp_dir), "abc123").await.unwrap();
    store.write(&json!({"foo": 1})).await.unwrap();
    let salt_before = std::fs::read(temp_dir.path().join("soubi.db.salt")).unwrap();

    let outcome = store.change_password("wrong", "new").await;
    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("Wrong password"));
    assert_eq!(store.state(), StoreState::Ready);
    assert_eq!(
        std::fs::read(temp_dir.path().join("soubi.db.salt")).unwrap(),
        salt_before
    );

    let store = EncryptedStore::open(store_paths(&temp_dir), "abc123").await.unwrap();
    let doc: Option<Document> = store.read().await.unwrap();
    assert_eq!(doc, Some(json!({"foo": 1})));
}

#[tokio::test]
async fn test_password_rotation() {
    let temp_dir = TempDir::new().unwrap();

    let mut store = EncryptedStore::open(store_paths(&temp_dir), "abc123").await.unwrap();
    store.write(&json!({"foo": 1})).await.unwrap();
    let salt_before = std::fs::read(temp_dir.path().join("soubi.db.salt")).unwrap();

    let outcome = store.change_password("abc123", "hunter2").await;
    assert!(outcome.success);
    assert!(outcome.error.is_none());
    assert_ne!(
        std::fs::read(temp_dir.path().join("soubi.db.salt")).unwrap(),
        salt_before
    );

    // The same instance keeps working under the new key
    let doc: Option<Document> = store.read().await.unwrap();
    assert_eq!(doc, Some(json!({"foo": 1})));

    let old = EncryptedStore::open(store_paths(&temp_dir), "abc123").await.unwrap();
    assert!(old.read::<Document>().await.is_err());

    let new = EncryptedStore::open(store_paths(&temp_dir), "hunter2").await.unwrap();
    let doc: Option<Document> = new.read().await.unwrap();
    assert_eq!(doc, Some(json!({"foo": 1})));
}

#[tokio::test]
async fn test_change_password_on_empty_store() {
    let temp_dir = TempDir::new().unwrap();

    let mut store = EncryptedStore::open(store_paths(&temp_dir), "abc123").await.unwrap();
    let outcome = store.change_password("abc123", "hunter2").await;

    assert!(!outcome.success);
    assert!(outcome.error.unwrap().contains("Nothing to re-encrypt"));
}

#[tokio::test]
async fn test_inventory_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let data_path = temp_dir.path().display().to_string();

    let store = EncryptedStore::open(store_paths(&temp_dir), "abc123").await.unwrap();
    let mut inventory = Inventory::load(store, data_path.clone()).await.unwrap();
    let asset = inventory
        .create_asset(NewAsset {
            name: Some("Flipper Zero".to_string()),
            ..NewAsset::default()
        })
        .await
        .unwrap();
    drop(inventory);

    let store = EncryptedStore::open(store_paths(&temp_dir), "abc123").await.unwrap();
    let inventory = Inventory::load(store, data_path).await.unwrap();
    assert_eq!(inventory.asset(asset.id).unwrap().name, "Flipper Zero");
}
