//! fleetstore CLI
//!
//! Diagnostic tools for a fleetstore store directory.
//!
//! # Commands
//!
//! - `dump` - Print every stored key/value pair
//! - `inspect` - Load the store and print per-category entity counts

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// fleetstore command-line diagnostic tools.
#[derive(Parser)]
#[command(name = "fleetstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every stored key/value pair, one per line, in key order
    Dump,

    /// Load the store and print per-category entity counts
    Inspect,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Dump => {
            let path = cli.path.ok_or("Store path required for dump")?;
            commands::dump::run(&path)?;
        }
        Commands::Inspect => {
            let path = cli.path.ok_or("Store path required for inspect")?;
            commands::inspect::run(&path)?;
        }
        Commands::Version => {
            println!("fleetstore CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("fleetstore core v{}", fleetstore_core::VERSION);
        }
    }

    Ok(())
}
