use filefly::{AccountPolicy, StoreConfig};

use crate::helpers::*;

#[tokio::test]
async fn test_default_policy_violations() {
    let (store, _clock) = test_store().await;
    let accounts = store.accounts();

    let long_name = "a".repeat(65);
    let cases = [
        ("al", "password1", "NAME_TOO_SHORT"),
        (long_name.as_str(), "password1", "NAME_TOO_LONG"),
        ("alice", "pass1", "PASS_TOO_SHORT"),
        ("alice", "password", "PASS_NO_DIGIT"),
        ("", "password1", "BAD_ENTRY"),
        ("bad name", "password1", "BAD_ENTRY"),
    ];
    for (username, password, code) in cases {
        let result = accounts.create(username, password, false, false).await;
        assert_eq!(code_of(result), code, "{username:?}/{password:?}");
    }
    assert_eq!(accounts.list_usernames().await.unwrap(), vec!["admin"]);
}

#[tokio::test]
async fn test_skip_policy_checks_keeps_shape_checks() {
    let (store, _clock) = test_store().await;
    let accounts = store.accounts();

    accounts.create("x", "y", false, true).await.unwrap();

    let too_long = "p".repeat(257);
    let result = accounts.create("yy", &too_long, false, true).await;
    assert_eq!(code_of(result), "BAD_ENTRY");
}

#[tokio::test]
async fn test_strict_policy_from_config() {
    let policy = AccountPolicy {
        password_require_mixed_case: true,
        password_require_special: true,
        ..AccountPolicy::default()
    };
    let (store, _clock) = test_store_with_config(StoreConfig::default().with_policy(policy)).await;
    let accounts = store.accounts();

    assert_eq!(
        code_of(accounts.create("alice", "password1", false, false).await),
        "PASS_NO_UPPER"
    );
    assert_eq!(
        code_of(accounts.create("alice", "Password1", false, false).await),
        "PASS_NO_SPECIAL"
    );
    accounts
        .create("alice", "Password1!", false, false)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_single_character_usernames_when_allowed() {
    let policy = AccountPolicy {
        username_min_length: 1,
        ..AccountPolicy::default()
    };
    let (store, _clock) = test_store_with_config(StoreConfig::default().with_policy(policy)).await;
    let accounts = store.accounts();

    assert_eq!(
        code_of(accounts.create("u", "short", false, false).await),
        "PASS_TOO_SHORT"
    );
    assert!(!accounts.exists("u").await.unwrap());

    accounts
        .create("u", "longenough1", false, false)
        .await
        .unwrap();
    assert!(accounts.exists("u").await.unwrap());
}
