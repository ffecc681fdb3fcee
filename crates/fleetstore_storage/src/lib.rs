//! # fleetstore storage
//!
//! Ordered key-value backend trait and implementations for fleetstore.
//!
//! This crate provides the lowest-level storage abstraction for the
//! controller's persistence core. Backends are **opaque ordered byte
//! stores** keyed by byte strings - they do not interpret keys or values.
//! fleetstore owns the key namespacing scheme and the value encoding.
//!
//! ## Design Principles
//!
//! - Backends are simple ordered maps (get, put, delete, scan)
//! - `scan` always yields pairs in ascending lexicographic key order
//! - Exactly one writable handle may exist per store directory at a time,
//!   enforced with an advisory file lock
//! - Must be `Send + Sync` for concurrent access
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - For persistent, directory-backed storage
//!
//! ## Example
//!
//! ```rust
//! use fleetstore_storage::{KvBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.put(b"CONFIG:nginx", b"{}").unwrap();
//! assert_eq!(backend.get(b"CONFIG:nginx").unwrap(), Some(b"{}".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::KvBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
