//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the model file
//! - runs simulations/sweeps
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::error::SimError;

pub mod pipeline;

/// Entry point for the `osim` binary.
pub fn run() -> Result<(), SimError> {
    // Diagnostics go through `log` and stay quiet unless RUST_LOG is set;
    // reports always print to stdout.
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Simulate(args) => pipeline::run_simulate(&args),
        Command::Sweep(args) => pipeline::run_sweep(&args),
        Command::Batch(args) => pipeline::run_batch(&args),
    }
}
