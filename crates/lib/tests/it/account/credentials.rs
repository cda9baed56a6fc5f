use crate::helpers::*;

#[tokio::test]
async fn test_verify_credentials() {
    let (store, _clock) = test_store().await;
    create_user(&store, "alice").await;
    let accounts = store.accounts();

    let record = accounts
        .verify_credentials("alice", "password1")
        .await
        .unwrap();
    assert_eq!(record.username, "alice");

    let wrong_pass = accounts.verify_credentials("alice", "password2").await;
    let wrong_name = accounts.verify_credentials("nobody", "password1").await;
    assert_eq!(code_of(wrong_pass), "WRONG_PASS_OR_NAME");
    assert_eq!(code_of(wrong_name), "WRONG_PASS_OR_NAME");
}

#[tokio::test]
async fn test_password_hash_is_argon2id() {
    let (store, _clock) = test_store().await;
    create_user(&store, "alice").await;

    let record = store.accounts().get("alice").await.unwrap().unwrap();
    assert!(record.password_hash.starts_with("$argon2id$"));
    assert!(!record.password_hash.contains("password1"));
}

#[tokio::test]
async fn test_change_password() {
    let (store, _clock) = test_store().await;
    create_user(&store, "alice").await;
    let accounts = store.accounts();

    assert_eq!(
        code_of(accounts.set_password("alice", "short", false).await),
        "PASS_TOO_SHORT"
    );
    accounts
        .set_password("alice", "password2", false)
        .await
        .unwrap();

    assert!(accounts.verify_credentials("alice", "password1").await.is_err());
    accounts
        .verify_credentials("alice", "password2")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_record_login_uses_clock() {
    let (store, clock) = test_store().await;
    create_user(&store, "alice").await;

    clock.set(1_704_067_260_000);
    let record = store.accounts().record_login("alice").await.unwrap();
    let stamp = record.last_login_at.unwrap();
    assert_eq!(stamp.to_rfc3339(), "2024-01-01T00:01:00+00:00");

    let stored = store.accounts().get("alice").await.unwrap().unwrap();
    assert_eq!(stored.last_login_at, Some(stamp));
}
