//! Error types for the account store
//!
//! Every variant carries a stable wire code, see [`AccountError::code`].

use thiserror::Error;

/// Policy, uniqueness and invariant failures of account operations.
///
/// Storage faults are not represented here; they surface as
/// [`crate::Error::Backend`].
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Username already exists: {username}")]
    NameTaken { username: String },

    #[error("Malformed input: {reason}")]
    BadEntry { reason: String },

    #[error("Username too short: {actual} characters, minimum is {min}")]
    NameTooShort { min: usize, actual: usize },

    #[error("Username too long: {actual} characters, maximum is {max}")]
    NameTooLong { max: usize, actual: usize },

    #[error("Password too short: minimum is {min} characters")]
    PassTooShort { min: usize },

    #[error("Password must contain a digit")]
    PassNoDigit,

    #[error("Password must contain an uppercase letter")]
    PassNoUpper,

    #[error("Password must contain a lowercase letter")]
    PassNoLower,

    #[error("Password must contain a special character")]
    PassNoSpecial,

    #[error("User not found: {username}")]
    UserNotFound { username: String },

    #[error("Refusing to delete the last administrator: {username}")]
    CantDeleteLastAdmin { username: String },

    #[error("Refusing to demote the last administrator: {username}")]
    CantDemoteLastAdmin { username: String },

    /// Unknown user or wrong password. The two are deliberately not distinguished.
    #[error("Wrong username or password")]
    WrongPassOrName,

    #[error("Could not generate a unique identity for {username} after {attempts} attempts")]
    IdentityExhausted { username: String, attempts: u32 },

    #[error("Password hashing failed: {reason}")]
    PasswordHashing { reason: String },
}

impl AccountError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            AccountError::NameTaken { .. } => "NAME_TAKEN",
            AccountError::BadEntry { .. } => "BAD_ENTRY",
            AccountError::NameTooShort { .. } => "NAME_TOO_SHORT",
            AccountError::NameTooLong { .. } => "NAME_TOO_LONG",
            AccountError::PassTooShort { .. } => "PASS_TOO_SHORT",
            AccountError::PassNoDigit => "PASS_NO_DIGIT",
            AccountError::PassNoUpper => "PASS_NO_UPPER",
            AccountError::PassNoLower => "PASS_NO_LOWER",
            AccountError::PassNoSpecial => "PASS_NO_SPECIAL",
            AccountError::UserNotFound { .. } => "USER_NOT_FOUND",
            AccountError::CantDeleteLastAdmin { .. } => "CANT_DELETE_LAST_ADMIN",
            AccountError::CantDemoteLastAdmin { .. } => "CANT_DEMOTE_LAST_ADMIN",
            AccountError::WrongPassOrName => "WRONG_PASS_OR_NAME",
            AccountError::IdentityExhausted { .. } => "IDENTITY_EXHAUSTED",
            AccountError::PasswordHashing { .. } => "PASSWORD_HASHING",
        }
    }

    /// Check if this error is a rejected username or password.
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            AccountError::BadEntry { .. }
                | AccountError::NameTooShort { .. }
                | AccountError::NameTooLong { .. }
                | AccountError::PassTooShort { .. }
                | AccountError::PassNoDigit
                | AccountError::PassNoUpper
                | AccountError::PassNoLower
                | AccountError::PassNoSpecial
        )
    }

    /// Check if this error indicates the account does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AccountError::UserNotFound { .. })
    }

    /// Check if this error protects the at-least-one-administrator rule.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            AccountError::CantDeleteLastAdmin { .. } | AccountError::CantDemoteLastAdmin { .. }
        )
    }

    /// Check if this error is an authentication failure.
    pub fn is_authentication_error(&self) -> bool {
        matches!(self, AccountError::WrongPassOrName)
    }
}

impl From<AccountError> for crate::Error {
    fn from(err: AccountError) -> Self {
        crate::Error::Account(err)
    }
}
