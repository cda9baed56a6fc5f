//! Username and password acceptance rules.

use serde::{Deserialize, Serialize};

use super::errors::AccountError;
use crate::constants::MAX_PASSWORD_BYTES;

/// Configurable predicates applied by [`AccountStore::create`](super::AccountStore::create)
/// and [`AccountStore::set_password`](super::AccountStore::set_password).
///
/// Checks run in a fixed order and the first failure is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountPolicy {
    pub username_min_length: usize,
    pub username_max_length: usize,
    pub password_min_length: usize,
    pub password_require_digit: bool,
    /// Require at least one uppercase and one lowercase letter.
    pub password_require_mixed_case: bool,
    /// Require at least one character that is neither a letter nor a digit.
    pub password_require_special: bool,
}

impl Default for AccountPolicy {
    fn default() -> Self {
        Self {
            username_min_length: 3,
            username_max_length: 64,
            password_min_length: 8,
            password_require_digit: true,
            password_require_mixed_case: false,
            password_require_special: false,
        }
    }
}

impl AccountPolicy {
    /// A policy that accepts any well-formed input.
    pub fn permissive() -> Self {
        Self {
            username_min_length: 1,
            username_max_length: usize::MAX,
            password_min_length: 0,
            password_require_digit: false,
            password_require_mixed_case: false,
            password_require_special: false,
        }
    }

    /// Run the username and password predicates.
    pub fn check(&self, username: &str, password: &str) -> Result<(), AccountError> {
        self.check_username(username)?;
        self.check_password(password)
    }

    pub fn check_username(&self, username: &str) -> Result<(), AccountError> {
        let actual = username.chars().count();
        if actual < self.username_min_length {
            return Err(AccountError::NameTooShort {
                min: self.username_min_length,
                actual,
            });
        }
        if actual > self.username_max_length {
            return Err(AccountError::NameTooLong {
                max: self.username_max_length,
                actual,
            });
        }
        Ok(())
    }

    pub fn check_password(&self, password: &str) -> Result<(), AccountError> {
        if password.chars().count() < self.password_min_length {
            return Err(AccountError::PassTooShort {
                min: self.password_min_length,
            });
        }
        if self.password_require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AccountError::PassNoDigit);
        }
        if self.password_require_mixed_case {
            if !password.chars().any(char::is_uppercase) {
                return Err(AccountError::PassNoUpper);
            }
            if !password.chars().any(char::is_lowercase) {
                return Err(AccountError::PassNoLower);
            }
        }
        if self.password_require_special && password.chars().all(char::is_alphanumeric) {
            return Err(AccountError::PassNoSpecial);
        }
        Ok(())
    }
}

/// Structural username check, applied even when policy checks are skipped.
pub(crate) fn check_username_shape(username: &str) -> Result<(), AccountError> {
    if username.is_empty() {
        return Err(AccountError::BadEntry {
            reason: "username is empty".to_string(),
        });
    }
    if username
        .chars()
        .any(|c| c.is_control() || c.is_whitespace())
    {
        return Err(AccountError::BadEntry {
            reason: "username contains whitespace or control characters".to_string(),
        });
    }
    Ok(())
}

/// Structural password check, applied even when policy checks are skipped.
pub(crate) fn check_password_shape(password: &str) -> Result<(), AccountError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(AccountError::BadEntry {
            reason: format!("password exceeds {MAX_PASSWORD_BYTES} bytes"),
        });
    }
    Ok(())
}
