//! The store engine: load, flush, and dump protocols.

use crate::config::StoreConfig;
use crate::entity::{Config, ConfigGroup, Machine, MachineGroup};
use crate::error::{StoreError, StoreResult};
use crate::key::{decode_key, encode_key, Category};
use crate::message::{Mutation, MutationKind};
use crate::queue::MutationQueue;
use crate::registry::Registry;
use fleetstore_storage::{FileBackend, KvBackend, StorageError};
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Entities registered by one [`StoreEngine::load`], per category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Configs registered.
    pub configs: usize,
    /// Machines registered.
    pub machines: usize,
    /// Config groups registered.
    pub config_groups: usize,
    /// Machine groups registered.
    pub machine_groups: usize,
}

impl LoadReport {
    /// Total entities registered.
    #[must_use]
    pub fn total(&self) -> usize {
        self.configs + self.machines + self.config_groups + self.machine_groups
    }
}

/// Mutations applied by one [`StoreEngine::flush`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Upserts written.
    pub upserts: usize,
    /// Deletes applied.
    pub deletes: usize,
}

impl FlushReport {
    /// Total mutations applied.
    #[must_use]
    pub fn total(&self) -> usize {
        self.upserts + self.deletes
    }
}

/// Multiplexes the four entity collections onto one ordered key-value
/// store and drains queued mutations into it.
///
/// The engine owns no entities. It is built from a shared [`Registry`]
/// (which request-handling logic mutates directly) and a shared
/// [`MutationQueue`] (which the same logic pushes a message onto for
/// every registry change). Three operations cycle the store handle:
///
/// - [`load`] - scan the store and populate the registry (startup, or
///   any rebuild of in-memory state from durable state)
/// - [`flush`] - drain the queue into the store (periodic, or on demand)
/// - [`dump`] - print every stored pair (diagnostics)
///
/// Each operation opens the store, works, and releases it before
/// returning, on success and on error alike, so the store's exclusive
/// lock is held only for the duration of a single operation.
///
/// Flush invocations are serialized on an internal mutex; without it,
/// concurrent flushes would race for the store's file lock and the loser
/// would fail spuriously.
///
/// [`load`]: StoreEngine::load
/// [`flush`]: StoreEngine::flush
/// [`dump`]: StoreEngine::dump
pub struct StoreEngine {
    path: PathBuf,
    config: StoreConfig,
    registry: Arc<RwLock<Registry>>,
    queue: Arc<MutationQueue>,
    flush_lock: Mutex<()>,
}

impl StoreEngine {
    /// Creates an engine over the store directory at `path`.
    #[must_use]
    pub fn new(
        path: impl Into<PathBuf>,
        config: StoreConfig,
        registry: Arc<RwLock<Registry>>,
        queue: Arc<MutationQueue>,
    ) -> Self {
        Self {
            path: path.into(),
            config,
            registry,
            queue,
            flush_lock: Mutex::new(()),
        }
    }

    /// Creates an engine with a fresh registry and queue.
    #[must_use]
    pub fn with_defaults(path: impl Into<PathBuf>, config: StoreConfig) -> Self {
        Self::new(
            path,
            config,
            Arc::new(RwLock::new(Registry::new())),
            Arc::new(MutationQueue::new()),
        )
    }

    /// Returns the store directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the shared registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<RwLock<Registry>> {
        &self.registry
    }

    /// Returns the shared mutation queue.
    #[must_use]
    pub fn queue(&self) -> &Arc<MutationQueue> {
        &self.queue
    }

    fn open_backend(&self) -> StoreResult<FileBackend> {
        FileBackend::open(&self.path, self.config.create_if_missing).map_err(|err| match err {
            StorageError::Locked => StoreError::StoreLocked,
            other => StoreError::Storage(other),
        })
    }

    /// Rebuilds the registry from the store.
    ///
    /// Scans every stored pair in ascending key order, decodes each key
    /// into (category, id), deserializes the JSON payload into the
    /// category's entity type, and registers it. A loaded
    /// [`ConfigGroup`]'s config-id list is sorted before registration.
    ///
    /// Registrations overwrite existing registry entries with the same
    /// id; entries for ids not present in the store are left alone. Does
    /// not touch the mutation queue.
    ///
    /// # Errors
    ///
    /// A malformed key, unknown tag, or undecodable payload is a store
    /// integrity violation; the scan stops and the error is returned as
    /// [`StoreError::LoadAborted`] carrying the count of entities
    /// registered before the failure. Lock contention is reported as
    /// [`StoreError::StoreLocked`].
    pub fn load(&self) -> StoreResult<LoadReport> {
        let backend = self.open_backend()?;
        let pairs = backend.scan()?;

        let mut report = LoadReport::default();
        let mut registry = self.registry.write();

        for (key, value) in &pairs {
            if let Err(err) = register_pair(&mut registry, key, value, &mut report) {
                return Err(StoreError::LoadAborted {
                    loaded: report.total(),
                    source: Box::new(err),
                });
            }
        }

        info!(
            path = %self.path.display(),
            configs = report.configs,
            machines = report.machines,
            config_groups = report.config_groups,
            machine_groups = report.machine_groups,
            "store loaded"
        );
        Ok(report)
    }

    /// Drains the mutation queue into the store.
    ///
    /// Messages are applied strictly in FIFO order. An `Upsert`
    /// serializes the current registry entry and writes it at the
    /// entity's key; a `Delete` removes the key and succeeds even when
    /// the key is absent. Pushes that land while the drain is running are
    /// picked up in the same pass.
    ///
    /// On success the queue holds nothing the flush observed, every
    /// applied mutation is durable, and the store handle (with its file
    /// lock) has been released.
    ///
    /// # Errors
    ///
    /// An `Upsert` whose id is no longer in the registry fails with
    /// [`StoreError::EntityNotFound`]; the failed message is consumed
    /// (it cannot succeed on retry), messages behind it stay queued, and
    /// writes already applied in this batch are synced before the error
    /// is returned. Lock contention is [`StoreError::StoreLocked`];
    /// concurrent callers of `flush` itself never contend because flush
    /// invocations are serialized internally.
    pub fn flush(&self) -> StoreResult<FlushReport> {
        let _guard = self.flush_lock.lock();
        let mut backend = self.open_backend()?;

        let mut report = FlushReport::default();
        while let Some(mutation) = self.queue.pop() {
            if let Err(err) = self.apply(&mut backend, &mutation, &mut report) {
                // Keep the batch's earlier writes durable before surfacing
                if self.config.sync_on_flush {
                    if let Err(sync_err) = backend.sync() {
                        warn!(error = %sync_err, "sync after failed flush also failed");
                    }
                }
                return Err(err);
            }
        }

        if self.config.sync_on_flush {
            backend.sync()?;
        }

        info!(
            path = %self.path.display(),
            upserts = report.upserts,
            deletes = report.deletes,
            "flush complete"
        );
        Ok(report)
    }

    fn apply(
        &self,
        backend: &mut FileBackend,
        mutation: &Mutation,
        report: &mut FlushReport,
    ) -> StoreResult<()> {
        let key = encode_key(mutation.category, &mutation.id);
        match mutation.kind {
            MutationKind::Upsert => {
                let value = {
                    let registry = self.registry.read();
                    serialize_entity(&registry, mutation.category, &mutation.id)?
                };
                backend.put(&key, &value)?;
                report.upserts += 1;
                debug!(category = %mutation.category, id = %mutation.id, "upsert applied");
            }
            MutationKind::Delete => {
                backend.delete(&key)?;
                report.deletes += 1;
                debug!(category = %mutation.category, id = %mutation.id, "delete applied");
            }
        }
        Ok(())
    }

    /// Writes every stored pair to `out`, one `key value` line per pair,
    /// in ascending key order.
    ///
    /// Purely diagnostic: no registry interaction, no mutation. Returns
    /// the number of pairs written.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or `out` fails.
    pub fn dump(&self, out: &mut dyn Write) -> StoreResult<usize> {
        let backend = self.open_backend()?;
        let pairs = backend.scan()?;

        for (key, value) in &pairs {
            writeln!(
                out,
                "{} {}",
                String::from_utf8_lossy(key),
                String::from_utf8_lossy(value)
            )
            .map_err(StorageError::from)?;
        }

        Ok(pairs.len())
    }
}

fn register_pair(
    registry: &mut Registry,
    key: &[u8],
    value: &[u8],
    report: &mut LoadReport,
) -> StoreResult<()> {
    let (category, id) = decode_key(key)?;
    match category {
        Category::Config => {
            let config: Config = deserialize_value(category, id, value)?;
            registry.add_config(config);
            report.configs += 1;
        }
        Category::Machine => {
            let machine: Machine = deserialize_value(category, id, value)?;
            registry.add_machine(machine);
            report.machines += 1;
        }
        Category::ConfigGroup => {
            let mut group: ConfigGroup = deserialize_value(category, id, value)?;
            // Deterministic iteration order regardless of insertion order
            group.configs.sort();
            registry.add_config_group(group);
            report.config_groups += 1;
        }
        Category::MachineGroup => {
            let group: MachineGroup = deserialize_value(category, id, value)?;
            registry.add_machine_group(group);
            report.machine_groups += 1;
        }
    }
    Ok(())
}

fn deserialize_value<T: DeserializeOwned>(
    category: Category,
    id: &str,
    value: &[u8],
) -> StoreResult<T> {
    serde_json::from_slice(value).map_err(|source| StoreError::Deserialize {
        category,
        id: id.to_string(),
        source,
    })
}

fn serialize_entity(registry: &Registry, category: Category, id: &str) -> StoreResult<Vec<u8>> {
    match category {
        Category::Config => to_json(category, id, registry.config(id)),
        Category::Machine => to_json(category, id, registry.machine(id)),
        Category::ConfigGroup => to_json(category, id, registry.config_group(id)),
        Category::MachineGroup => to_json(category, id, registry.machine_group(id)),
    }
}

fn to_json<T: Serialize>(category: Category, id: &str, entity: Option<&T>) -> StoreResult<Vec<u8>> {
    let entity = entity.ok_or_else(|| StoreError::entity_not_found(category, id))?;
    serde_json::to_vec(entity).map_err(|source| StoreError::Serialize {
        category,
        id: id.to_string(),
        source,
    })
}
