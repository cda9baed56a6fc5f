//! Password hashing for account records
//!
//! Argon2id with a random salt per hash, stored as a PHC string.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};

use super::errors::AccountError;

/// Hash a password using Argon2id
///
/// # Returns
/// The PHC-format hash string, which embeds the salt and parameters.
pub fn hash_password(password: impl AsRef<str>) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    Argon2::default()
        .hash_password(password.as_ref().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::PasswordHashing {
            reason: e.to_string(),
        })
}

/// Verify a password against its stored hash
///
/// An unparseable hash never verifies.
pub fn verify_password(password: impl AsRef<str>, password_hash: impl AsRef<str>) -> bool {
    let parsed_hash = match PasswordHash::new(password_hash.as_ref()) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!(error = %e, "Stored password hash is malformed");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_ref().as_bytes(), &parsed_hash)
        .is_ok()
}
