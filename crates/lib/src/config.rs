//! Store configuration
//!
//! [`StoreConfig`] is deserializable so hosts can embed it in their own
//! configuration files; every field has a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::account::AccountPolicy;
use crate::constants::{DEFAULT_IDENTITY_RETRY_LIMIT, DEFAULT_LOCK_TIMEOUT};
use crate::queue::StuckHolderPolicy;

/// Tunables of a [`Store`](crate::Store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// How long a queue holder may keep the lock once another caller is next in line.
    pub lock_timeout_ms: u64,
    pub stuck_holder_policy: StuckHolderPolicy,
    /// Identity candidates tried per account creation.
    pub identity_retry_limit: u32,
    pub policy: AccountPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT.as_millis() as u64,
            stuck_holder_policy: StuckHolderPolicy::default(),
            identity_retry_limit: DEFAULT_IDENTITY_RETRY_LIMIT,
            policy: AccountPolicy::default(),
        }
    }
}

impl StoreConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_stuck_holder_policy(mut self, policy: StuckHolderPolicy) -> Self {
        self.stuck_holder_policy = policy;
        self
    }

    pub fn with_identity_retry_limit(mut self, limit: u32) -> Self {
        self.identity_retry_limit = limit;
        self
    }

    pub fn with_policy(mut self, policy: AccountPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Reject settings the store cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::InvalidLockTimeout);
        }
        if self.identity_retry_limit == 0 {
            return Err(ConfigError::InvalidRetryLimit);
        }
        if self.policy.username_min_length == 0 {
            return Err(ConfigError::InvalidPolicy {
                reason: "username_min_length must be at least 1".to_string(),
            });
        }
        if self.policy.username_min_length > self.policy.username_max_length {
            return Err(ConfigError::InvalidPolicy {
                reason: format!(
                    "username_min_length {} exceeds username_max_length {}",
                    self.policy.username_min_length, self.policy.username_max_length
                ),
            });
        }
        Ok(())
    }
}

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Lock timeout must be greater than zero")]
    InvalidLockTimeout,

    #[error("Identity retry limit must be at least 1")]
    InvalidRetryLimit,

    #[error("Invalid account policy: {reason}")]
    InvalidPolicy { reason: String },
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}
