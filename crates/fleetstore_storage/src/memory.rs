//! In-memory storage backend for testing.

use crate::backend::KvBackend;
use crate::error::StorageResult;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory ordered key-value backend.
///
/// This backend stores all pairs in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use fleetstore_storage::{KvBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// backend.put(b"MACHINE:host-1", b"{}").unwrap();
/// assert_eq!(backend.len().unwrap(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing pairs.
    ///
    /// Useful for testing load scenarios.
    #[must_use]
    pub fn with_entries(entries: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Removes every stored pair.
    pub fn clear(&mut self) {
        self.entries.write().clear();
    }
}

impl KvBackend for InMemoryBackend {
    fn get(&self, key: &[u8]) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> StorageResult<()> {
        self.entries.write().insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> StorageResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    fn scan(&self) -> StorageResult<Vec<(Vec<u8>, Vec<u8>)>> {
        // BTreeMap iterates in ascending key order
        Ok(self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn sync(&mut self) -> StorageResult<()> {
        // In-memory backend has nothing to persist
        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.entries.read().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.len().unwrap(), 0);
        assert!(backend.is_empty().unwrap());
    }

    #[test]
    fn memory_put_then_get() {
        let mut backend = InMemoryBackend::new();
        backend.put(b"k1", b"v1").unwrap();

        assert_eq!(backend.get(b"k1").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(backend.get(b"k2").unwrap(), None);
    }

    #[test]
    fn memory_put_overwrites() {
        let mut backend = InMemoryBackend::new();
        backend.put(b"k1", b"old").unwrap();
        backend.put(b"k1", b"new").unwrap();

        assert_eq!(backend.get(b"k1").unwrap(), Some(b"new".to_vec()));
        assert_eq!(backend.len().unwrap(), 1);
    }

    #[test]
    fn memory_delete_removes() {
        let mut backend = InMemoryBackend::new();
        backend.put(b"k1", b"v1").unwrap();
        backend.delete(b"k1").unwrap();

        assert_eq!(backend.get(b"k1").unwrap(), None);
    }

    #[test]
    fn memory_delete_of_missing_key_succeeds() {
        let mut backend = InMemoryBackend::new();
        assert!(backend.delete(b"never-stored").is_ok());
    }

    #[test]
    fn memory_scan_is_key_ordered() {
        let mut backend = InMemoryBackend::new();
        backend.put(b"b", b"2").unwrap();
        backend.put(b"a", b"1").unwrap();
        backend.put(b"c", b"3").unwrap();

        let pairs = backend.scan().unwrap();
        let keys: Vec<&[u8]> = pairs.iter().map(|(k, _)| k.as_slice()).collect();
        assert_eq!(keys, vec![b"a".as_slice(), b"b".as_slice(), b"c".as_slice()]);
    }

    #[test]
    fn memory_with_entries() {
        let mut seed = BTreeMap::new();
        seed.insert(b"k".to_vec(), b"v".to_vec());

        let backend = InMemoryBackend::with_entries(seed);
        assert_eq!(backend.get(b"k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn memory_clear() {
        let mut backend = InMemoryBackend::new();
        backend.put(b"k", b"v").unwrap();
        backend.clear();
        assert!(backend.is_empty().unwrap());
    }

    #[test]
    fn memory_sync_succeeds() {
        let mut backend = InMemoryBackend::new();
        backend.put(b"k", b"v").unwrap();
        assert!(backend.sync().is_ok());
    }
}
