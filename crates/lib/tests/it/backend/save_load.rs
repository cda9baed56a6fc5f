use filefly::{
    Store, StoreConfig,
    backend::{BackendImpl, Namespace, database::InMemory},
};
use tempfile::TempDir;

use crate::helpers::create_user;

#[tokio::test]
async fn test_in_memory_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("filefly.json");

    let backend = InMemory::new();
    backend
        .put(Namespace::Accounts, "alice", "{}".to_string())
        .await
        .unwrap();
    backend
        .put(Namespace::Preferences, "id.1", r#"{"ui.theme":"dark"}"#.to_string())
        .await
        .unwrap();
    backend.save_to_file(&path).await.unwrap();

    let loaded = InMemory::load_from_file(&path).await.unwrap();
    assert_eq!(loaded.len(Namespace::Accounts).await, 1);
    assert_eq!(
        loaded.get(Namespace::Preferences, "id.1").await.unwrap(),
        r#"{"ui.theme":"dark"}"#
    );
}

#[tokio::test]
async fn test_load_non_existent_file() {
    let dir = TempDir::new().unwrap();
    let loaded = InMemory::load_from_file(dir.path().join("missing.json"))
        .await
        .unwrap();
    assert_eq!(loaded.len(Namespace::Accounts).await, 0);
}

#[tokio::test]
async fn test_load_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "not json").unwrap();

    let err = InMemory::load_from_file(&path).await.unwrap_err();
    assert!(err.is_io_error());
}

#[tokio::test]
async fn test_store_state_survives_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("filefly.json");

    let identity = {
        let store = Store::open(Box::new(InMemory::new()), StoreConfig::default())
            .await
            .unwrap();
        let identity = create_user(&store, "alice").await;
        store
            .preferences()
            .set(&identity, "ui.theme", Some("dark".into()))
            .await
            .unwrap();
        let backend = store
            .backend()
            .as_any()
            .downcast_ref::<InMemory>()
            .unwrap();
        backend.save_to_file(&path).await.unwrap();
        identity
    };

    let backend = InMemory::load_from_file(&path).await.unwrap();
    let store = Store::open(Box::new(backend), StoreConfig::default())
        .await
        .unwrap();
    assert_eq!(store.accounts().administrator_count().await.unwrap(), 1);
    let alice = store.accounts().get("alice").await.unwrap().unwrap();
    assert_eq!(alice.identity, identity);
    assert_eq!(
        store
            .preferences()
            .get(&identity, "ui.theme")
            .await
            .unwrap()
            .unwrap()
            .as_str(),
        Some("dark")
    );
}
