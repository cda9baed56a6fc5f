//! Error types for the preference cache

use thiserror::Error;

use crate::account::Identity;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PreferenceError {
    /// The identity does not denote a live account.
    #[error("Unknown account: {identity}")]
    UnknownAccount { identity: Identity },

    #[error("Invalid preference key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Invalid value for preference '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Preference scope already registered: {scope}")]
    DuplicateScope { scope: String },

    #[error("Invalid preference scope '{scope}'")]
    InvalidScope { scope: String },
}

impl PreferenceError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            PreferenceError::UnknownAccount { .. } => "UNKNOWN_ACCOUNT",
            PreferenceError::InvalidKey { .. } => "INVALID_KEY",
            PreferenceError::InvalidValue { .. } => "INVALID_VALUE",
            PreferenceError::DuplicateScope { .. } => "DUPLICATE_SCOPE",
            PreferenceError::InvalidScope { .. } => "INVALID_SCOPE",
        }
    }

    /// Check if this error indicates the account does not exist.
    pub fn is_unknown_account(&self) -> bool {
        matches!(self, PreferenceError::UnknownAccount { .. })
    }

    /// Check if this error is a rejected key, value or scope.
    pub fn is_validation_error(&self) -> bool {
        !self.is_unknown_account()
    }
}

impl From<PreferenceError> for crate::Error {
    fn from(err: PreferenceError) -> Self {
        crate::Error::Preference(err)
    }
}
