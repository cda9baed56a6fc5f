//! Per-account preference documents with a write-through cache.
//!
//! Each account identity owns one [`PreferenceDocument`] in the `pref`
//! namespace. Documents are loaded on first access and kept resident.
//! Writes persist first and update the resident copy only after the
//! backend accepted them, so a failed write never shows up in reads.
//!
//! Keys are `<scope>.<name>`. Feature code usually works through a
//! [`ScopedPreferences`] obtained from [`PreferenceCache::register_scope`].

pub(crate) mod cache;
pub mod errors;
mod scope;
mod types;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::Result;
use crate::account::{AccountStore, Identity};
use crate::backend::{BackendError, BackendImpl, Namespace, ReadConcurrency, is_absent};
use crate::queue::{AccessGuard, AccessQueue};
use cache::DocumentCache;

pub use errors::PreferenceError;
pub use scope::ScopedPreferences;
pub use types::{PreferenceDocument, PreferenceValue};

const NS: Namespace = Namespace::Preferences;

struct PreferenceCacheInner {
    backend: Arc<dyn BackendImpl>,
    queue: AccessQueue,
    accounts: AccountStore,
    documents: DocumentCache,
    /// One writer per identity at a time. Idle entries are removed.
    write_locks: Mutex<HashMap<Identity, Arc<tokio::sync::Mutex<()>>>>,
    scopes: Mutex<HashSet<String>>,
}

/// Handle to the preference documents of a [`Store`](crate::Store).
#[derive(Clone)]
pub struct PreferenceCache {
    inner: Arc<PreferenceCacheInner>,
}

impl fmt::Debug for PreferenceCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceCache")
            .field("backend", &"<BackendImpl>")
            .finish_non_exhaustive()
    }
}

impl PreferenceCache {
    pub(crate) fn new(
        backend: Arc<dyn BackendImpl>,
        queue: AccessQueue,
        accounts: AccountStore,
        documents: DocumentCache,
    ) -> Self {
        Self {
            inner: Arc::new(PreferenceCacheInner {
                backend,
                queue,
                accounts,
                documents,
                write_locks: Mutex::new(HashMap::new()),
                scopes: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Read one preference.
    ///
    /// # Errors
    /// `UnknownAccount` if the identity has no live account and its document
    /// is not resident, `InvalidKey`, or a backend fault.
    pub async fn get(&self, identity: &Identity, key: &str) -> Result<Option<PreferenceValue>> {
        validate_key(key)?;
        if let Some(value) = self
            .inner
            .documents
            .with(identity, |doc| doc.get(key).cloned())
            .await
        {
            return Ok(value);
        }
        Ok(self.document(identity).await?.get(key).cloned())
    }

    /// The whole document of an account.
    pub async fn get_document(&self, identity: &Identity) -> Result<PreferenceDocument> {
        self.document(identity).await
    }

    /// Set (`Some`) or remove (`None`) one preference.
    ///
    /// Removing a key that is not present performs no write.
    pub async fn set(
        &self,
        identity: &Identity,
        key: &str,
        value: Option<PreferenceValue>,
    ) -> Result<()> {
        validate_key(key)?;
        if let Some(value) = &value {
            validate_value(key, value)?;
        }

        self.serialized(identity, self.write_value(identity, key, value))
            .await
    }

    /// Return the stored value, or store `default` and return it.
    pub async fn define_default(
        &self,
        identity: &Identity,
        key: &str,
        default: PreferenceValue,
    ) -> Result<PreferenceValue> {
        validate_key(key)?;
        validate_value(key, &default)?;

        self.serialized(identity, self.write_default(identity, key, default))
            .await
    }

    /// Claim a scope and get a handle that prefixes keys with `"<scope>."`.
    ///
    /// # Errors
    /// `DuplicateScope` if the scope was registered before, `InvalidScope` if
    /// it is empty or contains a dot.
    pub fn register_scope(&self, scope: &str) -> Result<ScopedPreferences> {
        if scope.is_empty() || scope.contains('.') || scope.chars().any(char::is_control) {
            return Err(PreferenceError::InvalidScope {
                scope: scope.to_string(),
            }
            .into());
        }
        if !lock(&self.inner.scopes).insert(scope.to_string()) {
            return Err(PreferenceError::DuplicateScope {
                scope: scope.to_string(),
            }
            .into());
        }
        Ok(ScopedPreferences::new(scope.to_string(), self.clone()))
    }

    /// Number of documents currently resident.
    pub async fn resident_documents(&self) -> usize {
        self.inner.documents.len().await
    }

    /// Returns true if the document of `identity` is resident.
    pub async fn is_resident(&self, identity: &Identity) -> bool {
        self.inner.documents.contains(identity).await
    }

    async fn write_value(
        &self,
        identity: &Identity,
        key: &str,
        value: Option<PreferenceValue>,
    ) -> Result<()> {
        let mut document = self.document(identity).await?;
        match value {
            Some(value) => {
                if document.get(key) == Some(&value) {
                    return Ok(());
                }
                document.insert(key.to_string(), value);
            }
            None => {
                if document.remove(key).is_none() {
                    return Ok(());
                }
            }
        }

        self.persist(identity, document).await?;
        tracing::debug!(%identity, key, "Stored preference");
        Ok(())
    }

    async fn write_default(
        &self,
        identity: &Identity,
        key: &str,
        default: PreferenceValue,
    ) -> Result<PreferenceValue> {
        let mut document = self.document(identity).await?;
        if let Some(existing) = document.get(key) {
            return Ok(existing.clone());
        }

        document.insert(key.to_string(), default.clone());
        self.persist(identity, document).await?;
        tracing::debug!(%identity, key, "Defined preference default");
        Ok(default)
    }

    /// Runs `write` while holding the writer lock of `identity`.
    ///
    /// The lock entry is dropped once no other writer holds or waits on it.
    async fn serialized<T>(
        &self,
        identity: &Identity,
        write: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let writer = Arc::clone(
            lock(&self.inner.write_locks)
                .entry(identity.clone())
                .or_default(),
        );
        let result = {
            let _writer = writer.lock().await;
            write.await
        };

        let mut locks = lock(&self.inner.write_locks);
        drop(writer);
        if locks
            .get(identity)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(identity);
        }
        result
    }

    /// The resident document, loading it on a miss.
    async fn document(&self, identity: &Identity) -> Result<PreferenceDocument> {
        if let Some(document) = self.inner.documents.with(identity, PreferenceDocument::clone).await {
            return Ok(document);
        }

        if self.inner.accounts.get_by_identity(identity).await?.is_none() {
            return Err(unknown_account(identity));
        }

        let stored = {
            let _guard = self.read_guard().await;
            self.inner.backend.get(NS, identity.as_str()).await
        };
        let document: PreferenceDocument = match stored {
            Ok(json) => serde_json::from_str(&json).map_err(|e| {
                BackendError::DeserializationFailed {
                    namespace: NS,
                    key: identity.to_string(),
                    source: e,
                }
            })?,
            Err(e) if is_absent(&e) => PreferenceDocument::new(),
            Err(e) => return Err(e),
        };

        tracing::debug!(%identity, keys = document.len(), "Loaded preference document");
        self.inner
            .documents
            .insert_if_absent(identity.clone(), document)
            .await
            .ok_or_else(|| unknown_account(identity))
    }

    /// Write the document, then make it the resident copy.
    ///
    /// Account deletion evicts under the queue, so checking for a retired
    /// identity after taking the queue cannot miss a delete that ran first.
    async fn persist(&self, identity: &Identity, document: PreferenceDocument) -> Result<()> {
        let json = serde_json::to_string(&document).map_err(|e| BackendError::SerializationFailed {
            namespace: NS,
            key: identity.to_string(),
            source: e,
        })?;

        let _guard = self.inner.queue.lock().await;
        if self.inner.documents.is_retired(identity).await {
            return Err(unknown_account(identity));
        }
        self.inner.backend.put(NS, identity.as_str(), json).await?;
        self.inner.documents.insert(identity.clone(), document).await;
        Ok(())
    }

    async fn read_guard(&self) -> Option<AccessGuard> {
        match self.inner.backend.read_concurrency() {
            ReadConcurrency::Exclusive => Some(self.inner.queue.lock().await),
            ReadConcurrency::Shared => None,
        }
    }
}

fn unknown_account(identity: &Identity) -> crate::Error {
    PreferenceError::UnknownAccount {
        identity: identity.clone(),
    }
    .into()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn validate_key(key: &str) -> std::result::Result<(), PreferenceError> {
    let invalid = |reason: &str| PreferenceError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    let Some((scope, name)) = key.split_once('.') else {
        return Err(invalid("expected <scope>.<name>"));
    };
    if scope.is_empty() || name.is_empty() {
        return Err(invalid("scope and name must be non-empty"));
    }
    if key.chars().any(char::is_control) {
        return Err(invalid("contains control characters"));
    }
    Ok(())
}

fn validate_value(key: &str, value: &PreferenceValue) -> std::result::Result<(), PreferenceError> {
    if let PreferenceValue::Number(n) = value
        && !n.is_finite()
    {
        return Err(PreferenceError::InvalidValue {
            key: key.to_string(),
            reason: format!("{n} is not a finite number"),
        });
    }
    Ok(())
}
