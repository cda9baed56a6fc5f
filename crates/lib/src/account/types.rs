//! Core data types for the account store

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque, stable account identifier.
///
/// Issued once per account and never reused, even after the account is
/// deleted. Preference documents are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap an identity string received from a collaborator.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Identity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A stored account.
#[derive(Clone, PartialEq, Eq)]
pub struct AccountRecord {
    /// Primary key. Case-sensitive and immutable.
    pub username: String,
    pub identity: Identity,
    /// Argon2id PHC string
    pub password_hash: String,
    pub is_administrator: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for AccountRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountRecord")
            .field("username", &self.username)
            .field("identity", &self.identity)
            .field("password_hash", &"<redacted>")
            .field("is_administrator", &self.is_administrator)
            .field("created_at", &self.created_at)
            .field("last_login_at", &self.last_login_at)
            .finish()
    }
}

/// Persisted form of an [`AccountRecord`]. The username is the storage key.
#[derive(Clone, Serialize, Deserialize)]
pub(crate) struct AccountEntry {
    pub identity: Identity,
    pub password_hash: String,
    pub is_administrator: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl AccountEntry {
    pub(crate) fn into_record(self, username: String) -> AccountRecord {
        AccountRecord {
            username,
            identity: self.identity,
            password_hash: self.password_hash,
            is_administrator: self.is_administrator,
            created_at: self.created_at,
            last_login_at: self.last_login_at,
        }
    }
}

impl From<&AccountRecord> for AccountEntry {
    fn from(record: &AccountRecord) -> Self {
        Self {
            identity: record.identity.clone(),
            password_hash: record.password_hash.clone(),
            is_administrator: record.is_administrator,
            created_at: record.created_at,
            last_login_at: record.last_login_at,
        }
    }
}

/// Public view of an account without its password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub username: String,
    pub identity: Identity,
    pub is_administrator: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<&AccountRecord> for AccountSummary {
    fn from(record: &AccountRecord) -> Self {
        Self {
            username: record.username.clone(),
            identity: record.identity.clone(),
            is_administrator: record.is_administrator,
            created_at: record.created_at,
            last_login_at: record.last_login_at,
        }
    }
}
