//!
//! Filefly: account and preference storage for the Filefly file server.
//!
//! ## Core Concepts
//!
//! * **Store (`Store`)**: The handle a host opens once. It owns the storage backend
//!   and hands out the account store and the preference cache.
//! * **Backends (`backend::BackendImpl`)**: A key-value engine with two namespaces,
//!   `account` and `pref`. `InMemory`, SQLite and PostgreSQL implementations are provided.
//! * **Access queue (`queue::AccessQueue`)**: A FIFO lock serializing operations on
//!   the backend, with a timeout that pre-empts holders that never release.
//! * **Accounts (`account::AccountStore`)**: Username-keyed records with Argon2id
//!   password hashes, never-reused identities and at least one administrator.
//! * **Preferences (`preferences::PreferenceCache`)**: A scalar document per account
//!   identity, cached in memory and written through to the backend.

pub mod account;
pub mod backend;
pub mod clock;
pub mod config;
pub mod constants;
pub mod preferences;
pub mod queue;
mod store;

pub use account::{AccountPolicy, AccountRecord, AccountStore, Identity};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};
pub use config::StoreConfig;
pub use preferences::{PreferenceCache, PreferenceDocument, PreferenceValue, ScopedPreferences};
pub use store::Store;

/// Result type used throughout the Filefly library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Filefly library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured account errors from the account module
    #[error(transparent)]
    Account(account::AccountError),

    /// Structured preference errors from the preferences module
    #[error(transparent)]
    Preference(preferences::PreferenceError),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Rejected configuration
    #[error(transparent)]
    Config(config::ConfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Account(_) => "account",
            Error::Preference(_) => "preferences",
            Error::Backend(_) => "backend",
            Error::Config(_) => "config",
        }
    }

    /// Stable code of an account or preference error, if this is one.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Error::Account(account_err) => Some(account_err.code()),
            Error::Preference(pref_err) => Some(pref_err.code()),
            _ => None,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Account(account_err) => account_err.is_not_found(),
            Error::Preference(pref_err) => pref_err.is_unknown_account(),
            Error::Backend(backend_err) => backend_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Error::Account(account::AccountError::NameTaken { .. })
                | Error::Preference(preferences::PreferenceError::DuplicateScope { .. })
        )
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Account(account_err) => account_err.is_policy_violation(),
            Error::Preference(pref_err) => pref_err.is_validation_error(),
            Error::Config(_) => true,
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Account(account_err) => account_err.is_authentication_error(),
            _ => false,
        }
    }

    /// Check if this error is database/backend-related.
    pub fn is_database_error(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Backend(backend_err) => backend_err.is_io_error(),
            _ => false,
        }
    }
}
