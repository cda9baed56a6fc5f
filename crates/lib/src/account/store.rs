//! The account store
//!
//! Owns the `account` namespace. Every mutation holds the access queue for
//! its whole read-check-write sequence. Reads take the queue only when the
//! backend cannot serve them concurrently.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::crypto::{hash_password, verify_password};
use super::errors::AccountError;
use super::identity::IdentityGenerator;
use super::policy::{AccountPolicy, check_password_shape, check_username_shape};
use super::types::{AccountEntry, AccountRecord, Identity};
use crate::Result;
use crate::backend::{
    BackendError, BackendImpl, Namespace, ReadConcurrency, WriteOp, is_absent,
};
use crate::clock::Clock;
use crate::constants::{
    DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME, ISSUED_IDENTITIES_KEY, is_reserved_key,
};
use crate::preferences::cache::DocumentCache;
use crate::queue::{AccessGuard, AccessQueue};

const NS: Namespace = Namespace::Accounts;

struct AccountStoreInner {
    backend: Arc<dyn BackendImpl>,
    queue: AccessQueue,
    clock: Arc<dyn Clock>,
    generator: IdentityGenerator,
    policy: AccountPolicy,
    documents: DocumentCache,
}

/// Handle to the account records of a [`Store`](crate::Store).
///
/// Cheap to clone. Obtain it from [`Store::accounts`](crate::Store::accounts).
#[derive(Clone)]
pub struct AccountStore {
    inner: Arc<AccountStoreInner>,
}

impl fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountStore")
            .field("backend", &"<BackendImpl>")
            .field("queue", &self.inner.queue)
            .field("policy", &self.inner.policy)
            .finish()
    }
}

impl AccountStore {
    pub(crate) fn new(
        backend: Arc<dyn BackendImpl>,
        queue: AccessQueue,
        clock: Arc<dyn Clock>,
        policy: AccountPolicy,
        identity_retry_limit: u32,
        documents: DocumentCache,
    ) -> Self {
        let generator = IdentityGenerator::new(Arc::clone(&clock), identity_retry_limit);
        Self {
            inner: Arc::new(AccountStoreInner {
                backend,
                queue,
                clock,
                generator,
                policy,
                documents,
            }),
        }
    }

    /// The policy applied to new accounts and password changes.
    pub fn policy(&self) -> &AccountPolicy {
        &self.inner.policy
    }

    // === Mutations ===

    /// Create an account and return its newly issued identity.
    ///
    /// Checks, in order: username uniqueness, well-formed input, then the
    /// configured [`AccountPolicy`] unless `skip_policy_checks` is set. All
    /// checks, identity generation and the write happen under one queue
    /// grant.
    ///
    /// # Errors
    /// `NAME_TAKEN`, `BAD_ENTRY`, `NAME_TOO_SHORT`, `NAME_TOO_LONG`,
    /// `PASS_TOO_SHORT`, `PASS_NO_DIGIT`, `PASS_NO_UPPER`, `PASS_NO_LOWER`,
    /// `PASS_NO_SPECIAL`, or a backend fault.
    pub async fn create(
        &self,
        username: &str,
        password: &str,
        is_administrator: bool,
        skip_policy_checks: bool,
    ) -> Result<Identity> {
        let _guard = self.inner.queue.lock().await;

        if self.load(username).await?.is_some() {
            return Err(AccountError::NameTaken {
                username: username.to_string(),
            }
            .into());
        }
        check_username_shape(username)?;
        check_password_shape(password)?;
        if !skip_policy_checks {
            self.inner.policy.check(username, password)?;
        }

        let password_hash = hash_password(password)?;

        let mut taken = self.load_issued().await?;
        taken.extend(
            self.load_all()
                .await?
                .into_iter()
                .map(|record| record.identity),
        );
        let identity = self.inner.generator.generate(username, &taken)?;
        taken.insert(identity.clone());

        let record = AccountRecord {
            username: username.to_string(),
            identity: identity.clone(),
            password_hash,
            is_administrator,
            created_at: self.inner.clock.now(),
            last_login_at: None,
        };

        let mut issued: Vec<Identity> = taken.into_iter().collect();
        issued.sort();
        let issued = serde_json::to_string(&issued).map_err(|e| BackendError::SerializationFailed {
            namespace: NS,
            key: ISSUED_IDENTITIES_KEY.to_string(),
            source: e,
        })?;

        self.inner
            .backend
            .write_batch(vec![
                WriteOp::put(NS, username, encode(&record)?),
                WriteOp::put(NS, ISSUED_IDENTITIES_KEY, issued),
            ])
            .await?;

        tracing::info!(username, %identity, is_administrator, "Created account");
        Ok(identity)
    }

    /// Delete an account.
    ///
    /// A missing username performs no storage mutation. The last administrator
    /// cannot be deleted. The account's cached preference document is evicted;
    /// the persisted one is left in place.
    ///
    /// # Errors
    /// `USER_NOT_FOUND`, `CANT_DELETE_LAST_ADMIN`, or a backend fault.
    pub async fn delete(&self, username: &str) -> Result<()> {
        let _guard = self.inner.queue.lock().await;

        let record = self.require(username).await?;
        if record.is_administrator && self.count_administrators().await? <= 1 {
            return Err(AccountError::CantDeleteLastAdmin {
                username: username.to_string(),
            }
            .into());
        }

        self.inner.backend.delete(NS, username).await?;
        self.inner.documents.evict(&record.identity).await;

        tracing::info!(username, identity = %record.identity, "Deleted account");
        Ok(())
    }

    /// Stamp `last_login_at` with the current time and return the updated record.
    pub async fn record_login(&self, username: &str) -> Result<AccountRecord> {
        let _guard = self.inner.queue.lock().await;

        let mut record = self.require(username).await?;
        record.last_login_at = Some(self.inner.clock.now());
        self.store(&record).await?;

        tracing::debug!(username, "Recorded login");
        Ok(record)
    }

    /// Replace an account's password.
    ///
    /// The password policy applies unless `skip_policy_checks` is set.
    pub async fn set_password(
        &self,
        username: &str,
        new_password: &str,
        skip_policy_checks: bool,
    ) -> Result<()> {
        let _guard = self.inner.queue.lock().await;

        let mut record = self.require(username).await?;
        check_password_shape(new_password)?;
        if !skip_policy_checks {
            self.inner.policy.check_password(new_password)?;
        }
        record.password_hash = hash_password(new_password)?;
        self.store(&record).await?;

        tracing::info!(username, "Changed password");
        Ok(())
    }

    /// Grant or revoke the administrator role.
    ///
    /// # Errors
    /// `USER_NOT_FOUND`, `CANT_DEMOTE_LAST_ADMIN`, or a backend fault.
    pub async fn set_administrator(&self, username: &str, is_administrator: bool) -> Result<()> {
        let _guard = self.inner.queue.lock().await;

        let mut record = self.require(username).await?;
        if record.is_administrator == is_administrator {
            return Ok(());
        }
        if record.is_administrator && self.count_administrators().await? <= 1 {
            return Err(AccountError::CantDemoteLastAdmin {
                username: username.to_string(),
            }
            .into());
        }

        record.is_administrator = is_administrator;
        self.store(&record).await?;

        tracing::info!(username, is_administrator, "Changed administrator role");
        Ok(())
    }

    // === Reads ===

    /// Look up an account by username.
    pub async fn get(&self, username: &str) -> Result<Option<AccountRecord>> {
        let _guard = self.read_guard().await;
        self.load(username).await
    }

    /// Look up an account by identity.
    ///
    /// This scans every account record.
    pub async fn get_by_identity(&self, identity: &Identity) -> Result<Option<AccountRecord>> {
        let _guard = self.read_guard().await;
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .find(|record| &record.identity == identity))
    }

    /// Returns true if `username` is taken. Storage faults are errors, not `false`.
    pub async fn exists(&self, username: &str) -> Result<bool> {
        Ok(self.get(username).await?.is_some())
    }

    /// All accounts, ordered by username.
    pub async fn list_accounts(&self) -> Result<Vec<AccountRecord>> {
        let _guard = self.read_guard().await;
        self.load_all().await
    }

    /// All usernames, in ascending order.
    pub async fn list_usernames(&self) -> Result<Vec<String>> {
        let _guard = self.read_guard().await;
        Ok(self
            .inner
            .backend
            .keys(NS)
            .await?
            .into_iter()
            .filter(|key| !is_reserved_key(key))
            .collect())
    }

    /// Number of accounts with the administrator role.
    pub async fn administrator_count(&self) -> Result<usize> {
        let _guard = self.read_guard().await;
        self.count_administrators().await
    }

    /// Check a username and password pair.
    ///
    /// # Errors
    /// `WRONG_PASS_OR_NAME` for an unknown username and for a wrong password alike.
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<AccountRecord> {
        let record = {
            let _guard = self.read_guard().await;
            self.load(username).await?
        };

        match record {
            Some(record) if verify_password(password, &record.password_hash) => Ok(record),
            _ => {
                tracing::debug!(username, "Rejected credentials");
                Err(AccountError::WrongPassOrName.into())
            }
        }
    }

    // === Bootstrap ===

    /// Make sure at least one administrator exists.
    ///
    /// Creates `admin`/`admin` when there is none. Reports loudly whenever
    /// that account still accepts the default password.
    pub(crate) async fn ensure_administrator(&self) -> Result<()> {
        if self.administrator_count().await? == 0 {
            self.create(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD, true, true)
                .await?;
            tracing::error!(
                username = DEFAULT_ADMIN_USERNAME,
                "No administrator existed; created one with the default password. Change it now"
            );
            return Ok(());
        }

        if let Some(admin) = self.get(DEFAULT_ADMIN_USERNAME).await?
            && admin.is_administrator
            && verify_password(DEFAULT_ADMIN_PASSWORD, &admin.password_hash)
        {
            tracing::error!(
                username = DEFAULT_ADMIN_USERNAME,
                "Administrator account still uses the default password. Change it now"
            );
        }
        Ok(())
    }

    // === Unlocked helpers; callers hold the queue as required ===

    async fn read_guard(&self) -> Option<AccessGuard> {
        match self.inner.backend.read_concurrency() {
            ReadConcurrency::Exclusive => Some(self.inner.queue.lock().await),
            ReadConcurrency::Shared => None,
        }
    }

    async fn load(&self, username: &str) -> Result<Option<AccountRecord>> {
        if is_reserved_key(username) {
            return Ok(None);
        }
        match self.inner.backend.get(NS, username).await {
            Ok(json) => decode(username, &json).map(Some),
            Err(e) if is_absent(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn require(&self, username: &str) -> Result<AccountRecord> {
        self.load(username).await?.ok_or_else(|| {
            AccountError::UserNotFound {
                username: username.to_string(),
            }
            .into()
        })
    }

    async fn load_all(&self) -> Result<Vec<AccountRecord>> {
        self.inner
            .backend
            .scan(NS)
            .await?
            .into_iter()
            .filter(|(key, _)| !is_reserved_key(key))
            .map(|(username, json)| decode(&username, &json))
            .collect()
    }

    async fn load_issued(&self) -> Result<HashSet<Identity>> {
        match self.inner.backend.get(NS, ISSUED_IDENTITIES_KEY).await {
            Ok(json) => {
                let issued: Vec<Identity> = serde_json::from_str(&json).map_err(|e| {
                    BackendError::DeserializationFailed {
                        namespace: NS,
                        key: ISSUED_IDENTITIES_KEY.to_string(),
                        source: e,
                    }
                })?;
                Ok(issued.into_iter().collect())
            }
            Err(e) if is_absent(&e) => Ok(HashSet::new()),
            Err(e) => Err(e),
        }
    }

    async fn count_administrators(&self) -> Result<usize> {
        Ok(self
            .load_all()
            .await?
            .iter()
            .filter(|record| record.is_administrator)
            .count())
    }

    async fn store(&self, record: &AccountRecord) -> Result<()> {
        self.inner
            .backend
            .put(NS, &record.username, encode(record)?)
            .await
    }
}

fn encode(record: &AccountRecord) -> Result<String> {
    serde_json::to_string(&AccountEntry::from(record)).map_err(|e| {
        BackendError::SerializationFailed {
            namespace: NS,
            key: record.username.clone(),
            source: e,
        }
        .into()
    })
}

fn decode(username: &str, json: &str) -> Result<AccountRecord> {
    let entry: AccountEntry =
        serde_json::from_str(json).map_err(|e| BackendError::DeserializationFailed {
            namespace: NS,
            key: username.to_string(),
            source: e,
        })?;
    Ok(entry.into_record(username.to_string()))
}
