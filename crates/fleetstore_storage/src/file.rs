//! Directory-backed storage backend for persistent storage.
//!
//! This module handles the file system layout for a fleetstore store:
//!
//! ```text
//! <store_path>/
//! ├─ LOCK        # Advisory lock for single-handle access
//! └─ data.kv     # All key/value records, sorted by key
//! ```
//!
//! The LOCK file ensures only one handle can access the store at a time,
//! across threads and across cooperating processes. The lock is released
//! when the backend is dropped, so it is held only for the duration of
//! one load/flush/dump cycle, never for the process lifetime.

use crate::backend::KvBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// File names within the store directory.
const LOCK_FILE: &str = "LOCK";
const DATA_FILE: &str = "data.kv";
/// Temporary file for atomic data writes.
const DATA_TEMP: &str = "data.kv.tmp";

/// Magic bytes prefixing the data file.
const DATA_MAGIC: [u8; 4] = *b"FKV1";

/// A directory-backed ordered key-value backend.
///
/// All records are read into an ordered in-process map when the backend is
/// opened; mutations are applied to the map and made durable by [`sync`],
/// which rewrites the data file atomically (write to a temporary file,
/// fsync it, rename over the old file, fsync the directory).
///
/// # Locking
///
/// Opening acquires an exclusive advisory lock on the `LOCK` file without
/// blocking; if another handle holds it, `open` fails with
/// [`StorageError::Locked`]. Dropping the backend releases the lock.
///
/// [`sync`]: KvBackend::sync
///
/// # Example
///
/// ```no_run
/// use fleetstore_storage::{KvBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::open(Path::new("store"), true).unwrap();
/// backend.put(b"CONFIG:nginx", b"{}").unwrap();
/// backend.sync().unwrap(); // Ensure the record is durable
/// ```
#[derive(Debug)]
pub struct FileBackend {
    /// Root directory path.
    path: PathBuf,
    entries: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl FileBackend {
    /// Opens or creates a store directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the store directory
    /// * `create_if_missing` - If true, creates the directory if it doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory doesn't exist and `create_if_missing` is false
    /// - Another handle holds the lock (returns [`StorageError::Locked`])
    /// - The data file is malformed (returns [`StorageError::Corrupted`])
    /// - I/O errors occur
    pub fn open(path: &Path, create_if_missing: bool) -> StorageResult<Self> {
        if !path.exists() {
            if create_if_missing {
                fs::create_dir_all(path)?;
            } else {
                return Err(StorageError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("store directory does not exist: {}", path.display()),
                )));
            }
        }

        if !path.is_dir() {
            return Err(StorageError::corrupted(format!(
                "store path is not a directory: {}",
                path.display()
            )));
        }

        // Acquire exclusive lock (non-blocking)
        let lock_path = path.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked);
        }

        let entries = read_data_file(&path.join(DATA_FILE))?;

        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
            _lock_file: lock_file,
        })
    }

    /// Returns the path to the store directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Syncs the store directory so metadata updates are durable.
    ///
    /// After the data file rename, the directory must be fsynced so the
    /// new file entry is on disk. Windows NTFS journaling provides this
    /// durability on its own, so the fsync is Unix-only.
    #[cfg(unix)]
    fn sync_directory(&self) -> StorageResult<()> {
        let dir = File::open(&self.path)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StorageResult<()> {
        Ok(())
    }
}

impl KvBackend for FileBackend {
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
        Ok(self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    /// Persists the full record set atomically.
    ///
    /// Write-then-rename keeps the store crash-safe: a crash mid-sync
    /// leaves the previous data file intact.
    fn sync(&mut self) -> StorageResult<()> {
        let data_path = self.path.join(DATA_FILE);
        let temp_path = self.path.join(DATA_TEMP);

        {
            let entries = self.entries.read();
            let mut file = File::create(&temp_path)?;
            file.write_all(&DATA_MAGIC)?;
            for (key, value) in entries.iter() {
                write_frame(&mut file, key)?;
                write_frame(&mut file, value)?;
            }
            file.sync_all()?;
        }

        fs::rename(&temp_path, &data_path)?;
        self.sync_directory()?;

        Ok(())
    }

    fn len(&self) -> StorageResult<usize> {
        Ok(self.entries.read().len())
    }
}

fn write_frame(file: &mut File, bytes: &[u8]) -> StorageResult<()> {
    let len = u32::try_from(bytes.len()).map_err(|_| {
        StorageError::corrupted(format!("record of {} bytes exceeds frame limit", bytes.len()))
    })?;
    file.write_all(&len.to_le_bytes())?;
    file.write_all(bytes)?;
    Ok(())
}

fn read_data_file(path: &Path) -> StorageResult<BTreeMap<Vec<u8>, Vec<u8>>> {
    let mut entries = BTreeMap::new();

    if !path.exists() {
        return Ok(entries);
    }

    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    // An empty file is a freshly created store
    if data.is_empty() {
        return Ok(entries);
    }

    if data.len() < DATA_MAGIC.len() || data[..DATA_MAGIC.len()] != DATA_MAGIC {
        return Err(StorageError::corrupted("bad magic in data file"));
    }

    let mut cursor = DATA_MAGIC.len();
    while cursor < data.len() {
        let key = read_frame(&data, &mut cursor)?;
        let value = read_frame(&data, &mut cursor)?;
        entries.insert(key, value);
    }

    Ok(entries)
}

fn read_frame(data: &[u8], cursor: &mut usize) -> StorageResult<Vec<u8>> {
    let header_end = cursor
        .checked_add(4)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| StorageError::corrupted("truncated frame header in data file"))?;

    let mut len_bytes = [0u8; 4];
    len_bytes.copy_from_slice(&data[*cursor..header_end]);
    let len = u32::from_le_bytes(len_bytes) as usize;

    let body_end = header_end
        .checked_add(len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| StorageError::corrupted("truncated frame body in data file"))?;

    let frame = data[header_end..body_end].to_vec();
    *cursor = body_end;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_directory() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("new_store");

        assert!(!store_path.exists());

        let backend = FileBackend::open(&store_path, true).unwrap();
        assert!(store_path.exists());
        assert!(store_path.is_dir());
        assert!(backend.is_empty().unwrap());
    }

    #[test]
    fn open_fails_if_not_exists_and_no_create() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("nonexistent");

        let result = FileBackend::open(&store_path, false);
        assert!(result.is_err());
    }

    #[test]
    fn lock_prevents_second_open() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("locked_store");

        let _backend = FileBackend::open(&store_path, true).unwrap();

        let result = FileBackend::open(&store_path, true);
        assert!(matches!(result, Err(StorageError::Locked)));
    }

    #[test]
    fn lock_released_on_drop() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("reopen_store");

        {
            let _backend = FileBackend::open(&store_path, true).unwrap();
        }

        // Should succeed after the first handle is dropped
        let _backend2 = FileBackend::open(&store_path, true).unwrap();
    }

    #[test]
    fn sync_then_reopen_round_trip() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("persist_store");

        {
            let mut backend = FileBackend::open(&store_path, true).unwrap();
            backend.put(b"CONFIG:nginx", b"{\"name\":\"nginx\"}").unwrap();
            backend.put(b"MACHINE:host-1", b"{\"id\":\"host-1\"}").unwrap();
            backend.sync().unwrap();
        }

        {
            let backend = FileBackend::open(&store_path, true).unwrap();
            assert_eq!(backend.len().unwrap(), 2);
            assert_eq!(
                backend.get(b"CONFIG:nginx").unwrap(),
                Some(b"{\"name\":\"nginx\"}".to_vec())
            );
        }
    }

    #[test]
    fn unsynced_mutations_are_not_persisted() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("volatile_store");

        {
            let mut backend = FileBackend::open(&store_path, true).unwrap();
            backend.put(b"k", b"v").unwrap();
            // No sync
        }

        let backend = FileBackend::open(&store_path, true).unwrap();
        assert!(backend.is_empty().unwrap());
    }

    #[test]
    fn delete_survives_sync() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("delete_store");

        {
            let mut backend = FileBackend::open(&store_path, true).unwrap();
            backend.put(b"k1", b"v1").unwrap();
            backend.put(b"k2", b"v2").unwrap();
            backend.sync().unwrap();
        }

        {
            let mut backend = FileBackend::open(&store_path, true).unwrap();
            backend.delete(b"k1").unwrap();
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&store_path, true).unwrap();
        assert_eq!(backend.get(b"k1").unwrap(), None);
        assert_eq!(backend.get(b"k2").unwrap(), Some(b"v2".to_vec()));
    }

    #[test]
    fn scan_is_key_ordered_after_reopen() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("ordered_store");

        {
            let mut backend = FileBackend::open(&store_path, true).unwrap();
            backend.put(b"MACHINE:b", b"2").unwrap();
            backend.put(b"CONFIG:a", b"1").unwrap();
            backend.put(b"MACHINEGROUP:c", b"3").unwrap();
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&store_path, true).unwrap();
        let keys: Vec<Vec<u8>> = backend.scan().unwrap().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                b"CONFIG:a".to_vec(),
                b"MACHINE:b".to_vec(),
                b"MACHINEGROUP:c".to_vec()
            ]
        );
    }

    #[test]
    fn bad_magic_is_corruption() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("bad_magic_store");
        fs::create_dir_all(&store_path).unwrap();
        fs::write(store_path.join("data.kv"), b"not a data file").unwrap();

        let result = FileBackend::open(&store_path, true);
        assert!(matches!(result, Err(StorageError::Corrupted(_))));
    }

    #[test]
    fn truncated_frame_is_corruption() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("truncated_store");
        fs::create_dir_all(&store_path).unwrap();

        // Magic plus a frame header that promises more bytes than exist
        let mut data = DATA_MAGIC.to_vec();
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(b"short");
        fs::write(store_path.join("data.kv"), data).unwrap();

        let result = FileBackend::open(&store_path, true);
        assert!(matches!(result, Err(StorageError::Corrupted(_))));
    }

    #[test]
    fn empty_data_file_is_fresh_store() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("empty_store");
        fs::create_dir_all(&store_path).unwrap();
        fs::write(store_path.join("data.kv"), b"").unwrap();

        let backend = FileBackend::open(&store_path, true).unwrap();
        assert!(backend.is_empty().unwrap());
    }

    #[test]
    fn path_accessor() {
        let temp = tempdir().unwrap();
        let store_path = temp.path().join("path_store");

        let backend = FileBackend::open(&store_path, true).unwrap();
        assert_eq!(backend.path(), store_path);
    }
}
