//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ksync - counting semaphores and resource regions
#[derive(Parser)]
#[command(name = "ksync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Drive the ksync semaphore table and resource region registry")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output reports and logs in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH", env = "KSYNC_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the reference scenario: two semaphores, four regions
    Demo {
        /// How long the sleep waits on the empty semaphore
        #[arg(long, value_name = "MS", default_value_t = 5000)]
        sleep_ms: u64,
    },

    /// Hammer one semaphore with paired lock/unlock from many threads
    Stress {
        /// Worker threads (0 = one per CPU)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Lock/unlock pairs per worker
        #[arg(short, long)]
        iterations: Option<usize>,

        /// Initial count of the shared semaphore (at least 1)
        #[arg(long, default_value_t = 1)]
        initial_count: u32,
    },
}
