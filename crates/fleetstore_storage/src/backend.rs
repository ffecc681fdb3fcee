//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level ordered key-value backend for fleetstore.
///
/// Backends are **opaque ordered byte stores**. They map byte-string keys
/// to byte-string values and can enumerate every pair in ascending
/// lexicographic key order. fleetstore owns all interpretation of keys
/// (category prefixes) and values (entity payloads) - backends do not
/// understand either.
///
/// # Invariants
///
/// - `get` returns exactly the value most recently `put` for that key
/// - `delete` of a missing key succeeds (idempotent)
/// - `scan` yields pairs sorted by key in ascending byte order
/// - After `sync` returns, all mutations are durable
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait KvBackend: Send + Sync {
    /// Returns the value stored at `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `value` at `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn put(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()>;

    /// Removes the value stored at `key`.
    ///
    /// Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn delete(&mut self, key: &[u8]) -> StorageResult<()>;

    /// Returns every stored pair in ascending lexicographic key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the pairs cannot be enumerated.
    fn scan(&self) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>>;

    /// Makes all mutations durable.
    ///
    /// After this returns successfully, every `put` and `delete` applied
    /// so far survives process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync operation fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the number of stored pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the count cannot be determined.
    fn len(&self) -> StorageResult<usize>;

    /// Returns true when the store holds no pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if the count cannot be determined.
    fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}
