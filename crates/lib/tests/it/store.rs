use std::time::Duration;

use filefly::{
    Store, StoreConfig,
    backend::{BackendImpl, Namespace, database::InMemory},
};

use crate::helpers::*;

#[tokio::test]
async fn test_open_bootstraps_administrator() {
    let (store, _clock) = test_store().await;
    let accounts = store.accounts();

    assert_eq!(accounts.list_usernames().await.unwrap(), vec!["admin"]);
    let admin = accounts.verify_credentials("admin", "admin").await.unwrap();
    assert!(admin.is_administrator);
}

#[tokio::test]
async fn test_reopen_keeps_existing_administrator() {
    let backend = InMemory::new();
    backend
        .put(
            Namespace::Accounts,
            "root",
            r#"{"identity":"abc.1","password_hash":"$argon2id$bogus","is_administrator":true,"created_at":"2024-01-01T00:00:00Z"}"#
                .to_string(),
        )
        .await
        .unwrap();

    let store = Store::open(Box::new(backend), StoreConfig::default())
        .await
        .unwrap();
    assert_eq!(store.accounts().list_usernames().await.unwrap(), vec!["root"]);
    assert_eq!(store.accounts().administrator_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_bootstrap_fails_on_name_clash() {
    let backend = InMemory::new();
    backend
        .put(
            Namespace::Accounts,
            "admin",
            r#"{"identity":"abc.1","password_hash":"$argon2id$bogus","is_administrator":false,"created_at":"2024-01-01T00:00:00Z"}"#
                .to_string(),
        )
        .await
        .unwrap();

    let err = Store::open(Box::new(backend), StoreConfig::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some("NAME_TAKEN"));
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_corrupt_record_is_reported() {
    let backend = InMemory::new();
    backend
        .put(Namespace::Accounts, "admin", "{not json".to_string())
        .await
        .unwrap();

    let err = Store::open(Box::new(backend), StoreConfig::default())
        .await
        .unwrap_err();
    assert!(err.is_database_error());
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let config = StoreConfig::default().with_lock_timeout(Duration::ZERO);
    let err = Store::open(Box::new(InMemory::new()), config)
        .await
        .unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(err.module(), "config");
}

#[tokio::test]
async fn test_clones_share_state() {
    let (store, _clock) = test_store().await;
    let other = store.clone();

    let id = create_user(&store, "alice").await;
    other
        .preferences()
        .set(&id, "ui.theme", Some("dark".into()))
        .await
        .unwrap();

    assert!(other.accounts().exists("alice").await.unwrap());
    assert!(store.preferences().is_resident(&id).await);
    assert_eq!(store.config(), other.config());
}
