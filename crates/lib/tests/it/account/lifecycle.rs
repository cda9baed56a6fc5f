use crate::helpers::*;

#[tokio::test]
async fn test_create_list_delete() {
    let (store, _clock) = test_store().await;
    let accounts = store.accounts();

    let alice = create_user(&store, "alice").await;
    let bob = create_user(&store, "bob").await;
    assert_ne!(alice, bob);

    assert_eq!(
        accounts.list_usernames().await.unwrap(),
        vec!["admin".to_string(), "alice".to_string(), "bob".to_string()]
    );
    assert!(accounts.exists("alice").await.unwrap());

    accounts.delete("alice").await.unwrap();
    assert!(!accounts.exists("alice").await.unwrap());
    assert!(accounts.get_by_identity(&alice).await.unwrap().is_none());
    assert_eq!(accounts.list_accounts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_identity_lookup() {
    let (store, _clock) = test_store().await;
    let identity = create_user(&store, "carol").await;

    let record = store
        .accounts()
        .get_by_identity(&identity)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.username, "carol");
    assert!(!record.is_administrator);
    assert!(record.last_login_at.is_none());
}

#[tokio::test]
async fn test_recreated_account_gets_fresh_identity() {
    let (store, clock) = test_store().await;
    let _hold = clock.hold();

    let first = create_user(&store, "alice").await;
    store.accounts().delete("alice").await.unwrap();
    let second = create_user(&store, "alice").await;

    // Same username at the same instant still yields a new identity.
    assert_ne!(first, second);
    let (digest_a, _) = first.as_str().split_once('.').unwrap();
    let (digest_b, _) = second.as_str().split_once('.').unwrap();
    assert_eq!(digest_a, digest_b);
}

#[tokio::test]
async fn test_duplicate_username() {
    let (store, _clock) = test_store().await;
    create_user(&store, "alice").await;

    let result = store
        .accounts()
        .create("alice", "Another1!", false, false)
        .await;
    assert_eq!(code_of(result), "NAME_TAKEN");

    let result = store.accounts().create("admin", "x", false, true).await;
    assert_eq!(code_of(result), "NAME_TAKEN");
}

#[tokio::test]
async fn test_last_administrator_is_protected() {
    let (store, _clock) = test_store().await;
    let accounts = store.accounts();
    assert_eq!(accounts.administrator_count().await.unwrap(), 1);

    assert_eq!(
        code_of(accounts.delete("admin").await),
        "CANT_DELETE_LAST_ADMIN"
    );
    assert_eq!(
        code_of(accounts.set_administrator("admin", false).await),
        "CANT_DEMOTE_LAST_ADMIN"
    );

    accounts
        .create("root", "password1", true, false)
        .await
        .unwrap();
    accounts.set_administrator("admin", false).await.unwrap();
    assert_eq!(accounts.administrator_count().await.unwrap(), 1);
    assert_eq!(
        code_of(accounts.delete("root").await),
        "CANT_DELETE_LAST_ADMIN"
    );

    accounts.set_administrator("admin", true).await.unwrap();
    accounts.delete("root").await.unwrap();
    assert_eq!(accounts.administrator_count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_missing_user_operations() {
    let (store, _clock) = test_store().await;
    let accounts = store.accounts();

    assert!(accounts.get("ghost").await.unwrap().is_none());
    assert_eq!(code_of(accounts.delete("ghost").await), "USER_NOT_FOUND");
    assert_eq!(
        code_of(accounts.record_login("ghost").await),
        "USER_NOT_FOUND"
    );
    assert_eq!(
        code_of(accounts.set_password("ghost", "password2", false).await),
        "USER_NOT_FOUND"
    );
    assert_eq!(
        code_of(accounts.set_administrator("ghost", true).await),
        "USER_NOT_FOUND"
    );
}

#[tokio::test]
async fn test_failed_write_leaves_no_account() {
    let (store, _clock) = faulty_store(FaultyBackend::new()).await;
    FaultyBackend::of(&store).set_fail_writes(true);

    let err = store
        .accounts()
        .create("alice", "password1", false, false)
        .await
        .unwrap_err();
    assert!(err.is_io_error());

    FaultyBackend::of(&store).set_fail_writes(false);
    assert!(!store.accounts().exists("alice").await.unwrap());
    create_user(&store, "alice").await;
}

#[tokio::test]
async fn test_exclusive_backend_serializes_reads() {
    let (store, _clock) = faulty_store(FaultyBackend::exclusive()).await;
    create_user(&store, "alice").await;

    let guard = store.access_queue().lock().await;
    let read = tokio::spawn({
        let store = store.clone();
        async move { store.accounts().get("alice").await }
    });
    tokio::task::yield_now().await;
    assert!(!read.is_finished());

    drop(guard);
    let record = read.await.unwrap().unwrap().unwrap();
    assert_eq!(record.username, "alice");
}
