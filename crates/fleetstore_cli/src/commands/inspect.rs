//! Inspect command implementation.

use fleetstore_core::{Category, StoreConfig, StoreEngine};
use std::path::Path;

/// Runs the inspect command: load into a fresh registry and print
/// per-category entity counts.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let engine = StoreEngine::with_defaults(
        path,
        StoreConfig::default().create_if_missing(false),
    );

    let report = engine.load()?;

    println!("Store: {}", path.display());
    println!("  {:<14} {}", Category::Config, report.configs);
    println!("  {:<14} {}", Category::Machine, report.machines);
    println!("  {:<14} {}", Category::ConfigGroup, report.config_groups);
    println!("  {:<14} {}", Category::MachineGroup, report.machine_groups);
    println!("  total          {}", report.total());

    Ok(())
}
