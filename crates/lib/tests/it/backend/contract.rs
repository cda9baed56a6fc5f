//! The BackendImpl contract, checked against every engine.

use filefly::backend::{BackendImpl, Namespace, WriteOp, database::InMemory};

use crate::helpers::test_backend;

async fn check_get_put_delete(backend: &dyn BackendImpl) {
    let err = backend.get(Namespace::Accounts, "alice").await.unwrap_err();
    assert!(err.is_not_found());

    backend
        .put(Namespace::Accounts, "alice", "v1".to_string())
        .await
        .unwrap();
    backend
        .put(Namespace::Accounts, "alice", "v2".to_string())
        .await
        .unwrap();
    assert_eq!(backend.get(Namespace::Accounts, "alice").await.unwrap(), "v2");

    // Namespaces are disjoint.
    assert!(
        backend
            .get(Namespace::Preferences, "alice")
            .await
            .unwrap_err()
            .is_not_found()
    );

    backend.delete(Namespace::Accounts, "alice").await.unwrap();
    let err = backend.delete(Namespace::Accounts, "alice").await.unwrap_err();
    assert!(err.is_not_found());
}

async fn check_keys_and_scan(backend: &dyn BackendImpl) {
    for key in ["carol", "alice", "bob"] {
        backend
            .put(Namespace::Preferences, key, format!("{key}-doc"))
            .await
            .unwrap();
    }
    assert!(backend.keys(Namespace::Accounts).await.unwrap().is_empty());
    assert_eq!(
        backend.keys(Namespace::Preferences).await.unwrap(),
        vec!["alice", "bob", "carol"]
    );
    assert_eq!(
        backend.scan(Namespace::Preferences).await.unwrap(),
        vec![
            ("alice".to_string(), "alice-doc".to_string()),
            ("bob".to_string(), "bob-doc".to_string()),
            ("carol".to_string(), "carol-doc".to_string()),
        ]
    );
}

async fn check_write_batch(backend: &dyn BackendImpl) {
    backend
        .put(Namespace::Accounts, "old", "x".to_string())
        .await
        .unwrap();
    backend
        .write_batch(vec![
            WriteOp::put(Namespace::Accounts, "new", "1"),
            WriteOp::put(Namespace::Preferences, "new", "{}"),
            WriteOp::delete(Namespace::Accounts, "old"),
            WriteOp::delete(Namespace::Accounts, "never-existed"),
        ])
        .await
        .unwrap();

    assert_eq!(backend.keys(Namespace::Accounts).await.unwrap(), vec!["new"]);
    assert_eq!(
        backend.get(Namespace::Preferences, "new").await.unwrap(),
        "{}"
    );
}

async fn check_contract(backend: &dyn BackendImpl) {
    check_get_put_delete(backend).await;
    check_keys_and_scan(backend).await;
    check_write_batch(backend).await;
}

#[tokio::test]
async fn test_contract_selected_backend() {
    let backend = test_backend().await;
    check_contract(backend.as_ref()).await;
}

#[tokio::test]
async fn test_contract_in_memory() {
    check_contract(&InMemory::new()).await;
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_contract_sqlite() {
    use filefly::backend::{ReadConcurrency, database::Sqlite};

    let backend = Sqlite::sqlite_in_memory().await.unwrap();
    assert!(backend.is_sqlite());
    assert_eq!(backend.read_concurrency(), ReadConcurrency::Exclusive);
    check_contract(&backend).await;
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_file_survives_reopen() {
    use filefly::backend::database::Sqlite;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.db");
    {
        let backend = Sqlite::open_sqlite(&path).await.unwrap();
        backend
            .put(Namespace::Accounts, "alice", "record".to_string())
            .await
            .unwrap();
        backend.close().await;
    }

    let backend = Sqlite::open_sqlite(&path).await.unwrap();
    assert_eq!(
        backend.get(Namespace::Accounts, "alice").await.unwrap(),
        "record"
    );
}
