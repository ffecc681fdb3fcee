//! # fleetstore core
//!
//! Persistence core for a log-collection agent controller.
//!
//! Four entity collections - configs, machines, config groups, machine
//! groups - share one ordered key-value store, namespaced by key prefix.
//! Mutations are not written through: callers update the in-memory
//! [`Registry`] and enqueue a matching [`Mutation`] on the
//! [`MutationQueue`]; the [`StoreEngine`] later drains the queue into the
//! store in one batch ([`StoreEngine::flush`]) and rebuilds registries
//! from the store at startup ([`StoreEngine::load`]).
//!
//! This crate provides:
//! - The key codec (`<CATEGORY_TAG>:<id>`) and the [`Category`] enum
//! - The concurrent FIFO [`MutationQueue`]
//! - The [`Registry`] repository of the four id-keyed entity maps
//! - The [`StoreEngine`] load/flush/dump protocols

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod entity;
mod error;
mod key;
mod message;
mod queue;
mod registry;

pub use config::StoreConfig;
pub use engine::{FlushReport, LoadReport, StoreEngine};
pub use entity::{Config, ConfigGroup, Machine, MachineGroup};
pub use error::{StoreError, StoreResult};
pub use key::{decode_key, encode_key, Category};
pub use message::{Mutation, MutationKind};
pub use queue::MutationQueue;
pub use registry::Registry;

/// Crate version, for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
