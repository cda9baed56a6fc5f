//! Access queue behaviour as seen through a Store.
//!
//! These run on InMemory with paused time so timeouts are exact.

use std::sync::Arc;
use std::time::Duration;

use filefly::{
    FixedClock, Store, StoreConfig, backend::database::InMemory, queue::StuckHolderPolicy,
};
use tokio::time::Instant;

async fn paused_store(config: StoreConfig) -> Store {
    Store::open_with_clock(
        Box::new(InMemory::new()),
        config,
        Arc::new(FixedClock::default()),
    )
    .await
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_stuck_holder_does_not_block_forever() {
    let store = paused_store(StoreConfig::default()).await;
    let stuck = store.access_queue().lock().await;
    let start = Instant::now();

    store
        .accounts()
        .create("alice", "password1", false, false)
        .await
        .unwrap();

    assert_eq!(start.elapsed(), Duration::from_secs(5));
    assert!(!store.access_queue().is_current(&stuck));
    assert!(!stuck.release());
    assert!(!store.access_queue().is_locked());
}

#[tokio::test(start_paused = true)]
async fn test_configured_timeout_applies() {
    let config = StoreConfig::default().with_lock_timeout(Duration::from_millis(250));
    let store = paused_store(config).await;
    assert_eq!(
        store.access_queue().default_timeout(),
        Duration::from_millis(250)
    );

    let _stuck = store.access_queue().lock().await;
    let start = Instant::now();
    store.accounts().delete("nobody").await.unwrap_err();
    assert_eq!(start.elapsed(), Duration::from_millis(250));
}

#[tokio::test(start_paused = true)]
async fn test_wait_for_release_policy() {
    let config = StoreConfig::default().with_stuck_holder_policy(StuckHolderPolicy::WaitForRelease);
    let store = paused_store(config).await;
    assert_eq!(
        store.access_queue().policy(),
        StuckHolderPolicy::WaitForRelease
    );

    let holder = store.access_queue().lock().await;
    let create = tokio::spawn({
        let store = store.clone();
        async move {
            store
                .accounts()
                .create("alice", "password1", false, false)
                .await
        }
    });

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert!(!create.is_finished());
    assert!(store.access_queue().is_current(&holder));

    assert!(holder.release());
    create.await.unwrap().unwrap();
    assert!(store.accounts().exists("alice").await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_mutations_are_serialized() {
    let store = paused_store(StoreConfig::default()).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .accounts()
                .create(&format!("user{i}"), "password1", false, false)
                .await
        }));
    }
    let mut identities = Vec::new();
    for handle in handles {
        identities.push(handle.await.unwrap().unwrap());
    }
    identities.sort();
    identities.dedup();

    assert_eq!(identities.len(), 8);
    assert_eq!(store.accounts().list_usernames().await.unwrap().len(), 9);
    assert!(!store.access_queue().is_locked());
}
