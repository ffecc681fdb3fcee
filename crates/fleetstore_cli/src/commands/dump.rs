//! Dump command implementation.

use fleetstore_core::{StoreConfig, StoreEngine};
use std::io::{self, Write};
use std::path::Path;
use tracing::debug;

/// Runs the dump command: every stored pair to stdout, key order.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let engine = StoreEngine::with_defaults(
        path,
        StoreConfig::default().create_if_missing(false),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let count = engine.dump(&mut out)?;
    out.flush()?;

    debug!(count, "dump complete");
    Ok(())
}
