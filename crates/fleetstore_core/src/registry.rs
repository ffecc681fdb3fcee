//! In-memory entity registries.

use crate::entity::{Config, ConfigGroup, Machine, MachineGroup};
use crate::key::Category;
use std::collections::HashMap;

/// The four id-keyed entity maps, as one explicit repository object.
///
/// Request-handling logic owns and mutates the registry directly; the
/// store engine reads it to serialize entities during a flush and writes
/// into it while loading. Passing the registry into the engine at
/// construction (instead of ambient globals) lets tests run independent
/// store instances side by side.
#[derive(Debug, Default)]
pub struct Registry {
    configs: HashMap<String, Config>,
    machines: HashMap<String, Machine>,
    config_groups: HashMap<String, ConfigGroup>,
    machine_groups: HashMap<String, MachineGroup>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a configuration under its name.
    pub fn add_config(&mut self, config: Config) {
        self.configs.insert(config.name.clone(), config);
    }

    /// Registers a machine under its id.
    pub fn add_machine(&mut self, machine: Machine) {
        self.machines.insert(machine.id.clone(), machine);
    }

    /// Registers a config group under its name.
    pub fn add_config_group(&mut self, group: ConfigGroup) {
        self.config_groups.insert(group.name.clone(), group);
    }

    /// Registers a machine group under its name.
    pub fn add_machine_group(&mut self, group: MachineGroup) {
        self.machine_groups.insert(group.name.clone(), group);
    }

    /// Looks up a configuration by id.
    #[must_use]
    pub fn config(&self, id: &str) -> Option<&Config> {
        self.configs.get(id)
    }

    /// Looks up a machine by id.
    #[must_use]
    pub fn machine(&self, id: &str) -> Option<&Machine> {
        self.machines.get(id)
    }

    /// Looks up a config group by id.
    #[must_use]
    pub fn config_group(&self, id: &str) -> Option<&ConfigGroup> {
        self.config_groups.get(id)
    }

    /// Looks up a machine group by id.
    #[must_use]
    pub fn machine_group(&self, id: &str) -> Option<&MachineGroup> {
        self.machine_groups.get(id)
    }

    /// Removes a configuration, returning it if present.
    pub fn remove_config(&mut self, id: &str) -> Option<Config> {
        self.configs.remove(id)
    }

    /// Removes a machine, returning it if present.
    pub fn remove_machine(&mut self, id: &str) -> Option<Machine> {
        self.machines.remove(id)
    }

    /// Removes a config group, returning it if present.
    pub fn remove_config_group(&mut self, id: &str) -> Option<ConfigGroup> {
        self.config_groups.remove(id)
    }

    /// Removes a machine group, returning it if present.
    pub fn remove_machine_group(&mut self, id: &str) -> Option<MachineGroup> {
        self.machine_groups.remove(id)
    }

    /// Returns the number of entities registered in one category.
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Config => self.configs.len(),
            Category::Machine => self.machines.len(),
            Category::ConfigGroup => self.config_groups.len(),
            Category::MachineGroup => self.machine_groups.len(),
        }
    }

    /// Returns true when no entities are registered in any category.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        Category::ALL.iter().all(|&c| self.count(c) == 0)
    }

    /// Removes every entity from every category.
    pub fn clear(&mut self) {
        self.configs.clear();
        self.machines.clear();
        self.config_groups.clear();
        self.machine_groups.clear();
    }
}
