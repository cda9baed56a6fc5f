//! Storage error types for the Filefly backend.
//!
//! "Not found" is its own variant so callers can tell an absent key apart from
//! a storage fault. Everything else is an opaque engine fault from the point of
//! view of the account store.

use thiserror::Error;

use super::Namespace;

/// Errors that can occur during backend operations.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// No value is stored under the key.
    #[error("Key not found in {namespace}: {key}")]
    KeyNotFound {
        /// Namespace that was searched
        namespace: Namespace,
        /// The missing key
        key: String,
    },

    /// A value could not be serialized for storage.
    #[error("Serialization failed for {namespace}/{key}")]
    SerializationFailed {
        namespace: Namespace,
        key: String,
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// A stored value could not be decoded.
    #[error("Corrupt value in {namespace}/{key}")]
    DeserializationFailed {
        namespace: Namespace,
        key: String,
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error (persistence of the in-memory backend).
    #[error("File I/O error")]
    FileIo {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Persistence file could not be parsed.
    #[error("Invalid persistence file: {reason}")]
    InvalidPersistenceFile { reason: String },

    /// Error reported by the SQL driver.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        reason: String,
        #[source]
        source: Option<sqlx::Error>,
    },

    /// The stored schema is newer or older than this build understands.
    #[error("Unsupported schema version {found}, expected {expected}")]
    SchemaVersionMismatch { found: i64, expected: i64 },
}

impl BackendError {
    /// Check if this error indicates the key was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::KeyNotFound { .. })
    }

    /// Check if this error is related to encoding or decoding values.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            BackendError::SerializationFailed { .. } | BackendError::DeserializationFailed { .. }
        )
    }

    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. } | BackendError::InvalidPersistenceFile { .. }
        )
    }

    /// Get the namespace if this error is about a specific stored value.
    pub fn namespace(&self) -> Option<Namespace> {
        match self {
            BackendError::KeyNotFound { namespace, .. }
            | BackendError::SerializationFailed { namespace, .. }
            | BackendError::DeserializationFailed { namespace, .. } => Some(*namespace),
            _ => None,
        }
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
