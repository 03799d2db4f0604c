//! Error types for sotto-store

use thiserror::Error;

/// Errors that can occur in storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error during storage operations
    #[error("I/O error: {0}")]
    Io(String),

    /// Requested record was not found
    #[error("not found: {0}")]
    NotFound(String),

    /// A lock protecting shared state was poisoned
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    /// Error during serialization or deserialization
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Backend-specific error
    #[error("backend error: {0}")]
    Backend(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl StorageError {
    /// Create a new NotFound error
    pub fn not_found(item: impl Into<String>) -> Self {
        Self::NotFound(item.into())
    }

    /// Create a new LockPoisoned error
    pub fn lock_poisoned(what: impl Into<String>) -> Self {
        Self::LockPoisoned(what.into())
    }
}
