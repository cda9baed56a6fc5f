//! Backend implementations for Filefly storage
//!
//! This module provides the [`BackendImpl`] trait, a small key-value interface
//! partitioned into [`Namespace`]s, and its implementations under
//! [`database`].
//!
//! Values are opaque strings to the backend. The account store and the
//! preference cache decide their encoding (JSON).

use std::any::Any;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, constants};

pub mod database;
pub mod errors;

pub use errors::BackendError;

/// A logically separate keyspace within one backend instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Namespace {
    /// Account records keyed by username. Owned by the account store.
    #[serde(rename = "account")]
    Accounts,
    /// Preference documents keyed by account identity. Owned by the preference cache.
    #[serde(rename = "pref")]
    Preferences,
}

impl Namespace {
    /// All namespaces, in storage order.
    pub const ALL: [Namespace; 2] = [Namespace::Accounts, Namespace::Preferences];

    /// Name used for this namespace in persisted layouts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Accounts => constants::ACCOUNTS_NAMESPACE,
            Namespace::Preferences => constants::PREFERENCES_NAMESPACE,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a backend tolerates reads that overlap other operations.
///
/// Writes are always serialized through the store's access queue. Reads only
/// go through the queue when the backend reports [`ReadConcurrency::Exclusive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadConcurrency {
    /// Reads may run concurrently with each other and with a write.
    #[default]
    Shared,
    /// The handle admits one operation at a time, reads included.
    Exclusive,
}

/// A single mutation inside a [`BackendImpl::write_batch`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert or replace the value under `key`.
    Put {
        namespace: Namespace,
        key: String,
        value: String,
    },
    /// Remove `key`. Removing an absent key inside a batch is not an error.
    Delete { namespace: Namespace, key: String },
}

impl WriteOp {
    /// Convenience constructor for a put.
    pub fn put(namespace: Namespace, key: impl Into<String>, value: impl Into<String>) -> Self {
        WriteOp::Put {
            namespace,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Convenience constructor for a delete.
    pub fn delete(namespace: Namespace, key: impl Into<String>) -> Self {
        WriteOp::Delete {
            namespace,
            key: key.into(),
        }
    }
}

/// Storage trait abstracting the key-value engine behind the account store.
///
/// All implementations must be `Send` and `Sync` so one handle can be shared
/// by the account store and the preference cache, and implement `Any` to allow
/// downcasting (e.g. to save an [`database::InMemory`] backend on shutdown).
///
/// An absent key is reported as [`BackendError::KeyNotFound`], never as an
/// empty value, so callers can keep "does not exist" apart from faults.
#[async_trait]
pub trait BackendImpl: Send + Sync + Any {
    /// Retrieves the value stored under `key`.
    ///
    /// # Returns
    /// The stored value, or `BackendError::KeyNotFound` if there is none.
    async fn get(&self, namespace: Namespace, key: &str) -> Result<String>;

    /// Inserts or replaces the value stored under `key`.
    async fn put(&self, namespace: Namespace, key: &str, value: String) -> Result<()>;

    /// Removes `key`.
    ///
    /// # Returns
    /// `BackendError::KeyNotFound` if the key was not present.
    async fn delete(&self, namespace: Namespace, key: &str) -> Result<()>;

    /// Returns every key in the namespace, sorted ascending.
    async fn keys(&self, namespace: Namespace) -> Result<Vec<String>>;

    /// Returns every key/value pair in the namespace, sorted by key.
    ///
    /// This is a full-collection read; its cost is O(n) in the namespace size.
    async fn scan(&self, namespace: Namespace) -> Result<Vec<(String, String)>>;

    /// Applies all operations atomically: either every operation is visible
    /// afterwards or none is.
    async fn write_batch(&self, ops: Vec<WriteOp>) -> Result<()>;

    /// Concurrency contract of this backend for reads.
    fn read_concurrency(&self) -> ReadConcurrency {
        ReadConcurrency::Shared
    }

    /// Returns a reference to the backend as `Any` for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Returns true when `err` is a backend "not found" error.
///
/// Only this outcome may be mapped to "absent" by callers; every other
/// error is a fault and must be propagated.
pub(crate) fn is_absent(err: &crate::Error) -> bool {
    matches!(err, crate::Error::Backend(BackendError::KeyNotFound { .. }))
}
