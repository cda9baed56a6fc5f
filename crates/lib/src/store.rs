//! The top-level store handle.
//!
//! A [`Store`] owns one backend and wires the access queue, the account
//! store and the preference cache onto it. Construct one per process and
//! pass clones to whatever needs it.

use std::fmt;
use std::sync::Arc;

use handle_trait::Handle;

use crate::account::AccountStore;
use crate::backend::BackendImpl;
use crate::clock::{Clock, SystemClock};
use crate::config::StoreConfig;
use crate::preferences::PreferenceCache;
use crate::preferences::cache::DocumentCache;
use crate::queue::AccessQueue;
use crate::Result;

pub(crate) struct StoreInternal {
    backend: Arc<dyn BackendImpl>,
    queue: AccessQueue,
    accounts: AccountStore,
    preferences: PreferenceCache,
    config: StoreConfig,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for StoreInternal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreInternal")
            .field("backend", &"<BackendImpl>")
            .field("queue", &self.queue)
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish()
    }
}

/// Account and preference store over one storage backend.
///
/// `Store` is a cheap-to-clone handle around `Arc<StoreInternal>`.
///
/// ## Example
///
/// ```
/// # use filefly::{backend::database::InMemory, Store, StoreConfig};
/// # #[tokio::main]
/// # async fn main() -> filefly::Result<()> {
/// let store = Store::open(Box::new(InMemory::new()), StoreConfig::default()).await?;
///
/// // Opening an empty backend creates the default administrator.
/// assert_eq!(store.accounts().administrator_count().await?, 1);
///
/// let id = store.accounts().create("alice", "password1", false, false).await?;
/// store.preferences().set(&id, "ui.theme", Some("dark".into())).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Handle)]
pub struct Store {
    inner: Arc<StoreInternal>,
}

impl Store {
    /// Open a store over `backend`.
    ///
    /// Validates `config`, then makes sure an administrator exists, creating
    /// the default `admin` account on an empty backend.
    ///
    /// # Errors
    /// Invalid configuration, a backend fault, or a failed bootstrap (for
    /// example a non-administrator account already named `admin`).
    pub async fn open(backend: Box<dyn BackendImpl>, config: StoreConfig) -> Result<Self> {
        Self::open_internal(backend, config, Arc::new(SystemClock)).await
    }

    /// Open a store with a custom clock.
    #[cfg(any(test, feature = "testing"))]
    pub async fn open_with_clock(
        backend: Box<dyn BackendImpl>,
        config: StoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        Self::open_internal(backend, config, clock).await
    }

    async fn open_internal(
        backend: Box<dyn BackendImpl>,
        config: StoreConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let backend: Arc<dyn BackendImpl> = Arc::from(backend);
        let queue = AccessQueue::new(config.lock_timeout(), config.stuck_holder_policy);
        let documents = DocumentCache::new();

        let accounts = AccountStore::new(
            Arc::clone(&backend),
            queue.clone(),
            Arc::clone(&clock),
            config.policy.clone(),
            config.identity_retry_limit,
            documents.clone(),
        );
        let preferences = PreferenceCache::new(
            Arc::clone(&backend),
            queue.clone(),
            accounts.clone(),
            documents,
        );

        accounts.ensure_administrator().await?;

        tracing::info!(
            read_concurrency = ?backend.read_concurrency(),
            lock_timeout_ms = config.lock_timeout_ms,
            "Opened account store"
        );

        Ok(Self {
            inner: Arc::new(StoreInternal {
                backend,
                queue,
                accounts,
                preferences,
                config,
                clock,
            }),
        })
    }

    /// Account records.
    pub fn accounts(&self) -> &AccountStore {
        &self.inner.accounts
    }

    /// Preference documents.
    pub fn preferences(&self) -> &PreferenceCache {
        &self.inner.preferences
    }

    /// The storage backend, e.g. for downcasting an `InMemory` to save it.
    pub fn backend(&self) -> &Arc<dyn BackendImpl> {
        &self.inner.backend
    }

    /// The queue serializing access to the backend.
    pub fn access_queue(&self) -> &AccessQueue {
        &self.inner.queue
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }
}
