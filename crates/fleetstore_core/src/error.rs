//! Error types for the persistence core.

use crate::key::Category;
use thiserror::Error;

/// Result type for core operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during load, flush, and dump.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage backend error (open, read, write, sync).
    #[error("storage error: {0}")]
    Storage(#[from] fleetstore_storage::StorageError),

    /// Another handle holds the store's exclusive lock.
    ///
    /// Retryable: the holder releases the lock when its operation
    /// completes.
    #[error("store locked: another operation has exclusive access")]
    StoreLocked,

    /// A stored key has no category delimiter.
    #[error("malformed store key: {key:?}")]
    MalformedKey {
        /// The offending key, lossily decoded.
        key: String,
    },

    /// A stored key carries a tag outside the fixed category set.
    #[error("unknown category tag: {tag:?}")]
    UnknownCategory {
        /// The unrecognized tag.
        tag: String,
    },

    /// An entity could not be serialized for writing.
    #[error("serialize {category} {id:?}: {source}")]
    Serialize {
        /// Entity category.
        category: Category,
        /// Entity id.
        id: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// A stored payload could not be deserialized into its entity type.
    #[error("deserialize {category} {id:?}: {source}")]
    Deserialize {
        /// Entity category.
        category: Category,
        /// Entity id.
        id: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },

    /// An upsert referenced an id absent from the registry.
    #[error("entity not found: {category} {id:?}")]
    EntityNotFound {
        /// Entity category.
        category: Category,
        /// The id that was not found.
        id: String,
    },

    /// Load failed partway through the store scan.
    #[error("load aborted after {loaded} entities: {source}")]
    LoadAborted {
        /// Number of entities registered before the failure.
        loaded: usize,
        /// The failure that stopped the scan.
        source: Box<StoreError>,
    },
}

impl StoreError {
    /// Creates a malformed-key error from raw key bytes.
    pub fn malformed_key(key: &[u8]) -> Self {
        Self::MalformedKey {
            key: String::from_utf8_lossy(key).into_owned(),
        }
    }

    /// Creates an unknown-category error.
    pub fn unknown_category(tag: impl Into<String>) -> Self {
        Self::UnknownCategory { tag: tag.into() }
    }

    /// Creates an entity-not-found error.
    pub fn entity_not_found(category: Category, id: impl Into<String>) -> Self {
        Self::EntityNotFound {
            category,
            id: id.into(),
        }
    }

    /// Returns true when the error is lock contention, which the caller
    /// may retry after a backoff.
    #[must_use]
    pub fn is_lock_contention(&self) -> bool {
        matches!(self, Self::StoreLocked)
    }
}
