//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Another handle holds the store's exclusive lock.
    #[error("store locked: another handle has exclusive access")]
    Locked,

    /// The stored data file is corrupted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),
}

impl StorageError {
    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted(message.into())
    }

    /// Returns true when the error is lock contention, which a caller may
    /// retry after a backoff rather than treat as fatal.
    #[must_use]
    pub fn is_lock_contention(&self) -> bool {
        matches!(self, Self::Locked)
    }
}
