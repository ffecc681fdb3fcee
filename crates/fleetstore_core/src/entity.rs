//! Entity types persisted by the store.
//!
//! Each entity is identified by a string id unique within its category
//! and serializes to JSON for storage. Groups reference their members by
//! id; they never own them.

use serde::{Deserialize, Serialize};

/// A named log-collection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration name; doubles as its id.
    pub name: String,
    /// The configuration payload handed to agents.
    pub content: String,
    /// Bumped on every modification.
    #[serde(default)]
    pub version: u64,
}

impl Config {
    /// Creates a configuration at version 0.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            version: 0,
        }
    }
}

/// A single agent host record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    /// Machine id; unique within the fleet.
    pub id: String,
    /// Address the controller reaches the agent at.
    pub ip: String,
    /// Unix timestamp of the last heartbeat, 0 if never seen.
    #[serde(default)]
    pub heartbeat: i64,
}

impl Machine {
    /// Creates a machine record with no heartbeat yet.
    #[must_use]
    pub fn new(id: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ip: ip.into(),
            heartbeat: 0,
        }
    }
}

/// A named, ordered group of configuration ids.
///
/// After a load from storage the `configs` list is sorted
/// lexicographically, so iteration order is deterministic regardless of
/// the order ids were added before the write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigGroup {
    /// Group name; doubles as its id.
    pub name: String,
    /// Referenced configuration ids.
    pub configs: Vec<String>,
}

impl ConfigGroup {
    /// Creates a config group with the given members.
    #[must_use]
    pub fn new(name: impl Into<String>, configs: Vec<String>) -> Self {
        Self {
            name: name.into(),
            configs,
        }
    }
}

/// A named group of machine ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineGroup {
    /// Group name; doubles as its id.
    pub name: String,
    /// Referenced machine ids.
    pub machines: Vec<String>,
}

impl MachineGroup {
    /// Creates a machine group with the given members.
    #[must_use]
    pub fn new(name: impl Into<String>, machines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            machines,
        }
    }
}
