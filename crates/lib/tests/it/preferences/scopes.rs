use filefly::PreferenceValue;

use crate::helpers::*;

#[tokio::test]
async fn test_scoped_handle_prefixes_keys() {
    let (store, _clock) = test_store().await;
    let id = create_user(&store, "alice").await;

    let sharing = store.preferences().register_scope("sharing").unwrap();
    assert_eq!(sharing.scope(), "sharing");

    assert_eq!(
        sharing
            .define_default(&id, "expiry_days", 7i32.into())
            .await
            .unwrap(),
        PreferenceValue::Number(7.0)
    );
    sharing
        .set(&id, "expiry_days", Some(30i32.into()))
        .await
        .unwrap();
    assert_eq!(
        store
            .preferences()
            .get(&id, "sharing.expiry_days")
            .await
            .unwrap(),
        Some(PreferenceValue::Number(30.0))
    );
    assert_eq!(
        sharing.get(&id, "expiry_days").await.unwrap(),
        Some(PreferenceValue::Number(30.0))
    );
}

#[tokio::test]
async fn test_scope_registration_rules() {
    let (store, _clock) = test_store().await;
    let prefs = store.preferences();

    prefs.register_scope("ui").unwrap();
    assert_eq!(
        code_of(prefs.register_scope("ui").map(|s| s.scope().to_string())),
        "DUPLICATE_SCOPE"
    );
    for bad in ["", "a.b", "tab\tscope"] {
        assert_eq!(
            code_of(prefs.register_scope(bad).map(|s| s.scope().to_string())),
            "INVALID_SCOPE",
            "{bad:?}"
        );
    }
    // Registration is per store.
    let (other, _clock) = test_store().await;
    other.preferences().register_scope("ui").unwrap();
}

#[tokio::test]
async fn test_scoped_name_validation() {
    let (store, _clock) = test_store().await;
    let id = create_user(&store, "alice").await;
    let ui = store.preferences().register_scope("ui").unwrap();

    assert_eq!(code_of(ui.get(&id, "").await), "INVALID_KEY");
}
