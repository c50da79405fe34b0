//! Command-line parsing for the outcome simulator.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/simulation code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::sim::DEFAULT_DRAW_COUNT;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "osim",
    version,
    about = "Multinomial outcome simulator (dot clouds + ribbon sweeps)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Simulate the outcome-probability ensemble for one case.
    Simulate(SimulateArgs),
    /// Sweep one axis-eligible variable across a grid, point estimate only.
    Sweep(SweepArgs),
    /// Simulate every case in a CSV file and summarize each.
    Batch(BatchArgs),
}

/// Options shared by every subcommand.
#[derive(Debug, Parser, Clone)]
pub struct ModelArgs {
    /// Model JSON file (coefficients, uncertainty, variable table).
    #[arg(short = 'm', long, value_name = "JSON")]
    pub model: PathBuf,
}

/// Options for building a case from the command line.
#[derive(Debug, Parser, Clone)]
pub struct CaseArgs {
    /// Case JSON file (flat object, variable id -> display-space value).
    #[arg(long, value_name = "JSON")]
    pub case: Option<PathBuf>,

    /// Set one case value (repeatable): --set var=value. Overrides --case.
    #[arg(long = "set", value_name = "VAR=VALUE")]
    pub sets: Vec<String>,
}

/// Options for `osim simulate`.
#[derive(Debug, Parser)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub case: CaseArgs,

    /// Number of coefficient draws.
    #[arg(short = 'n', long, default_value_t = DEFAULT_DRAW_COUNT)]
    pub draws: usize,

    /// Random seed (omit for a fresh entropy seed per run).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export the dot cloud to CSV (one row per draw).
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full result to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for `osim sweep`.
#[derive(Debug, Parser)]
pub struct SweepArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[command(flatten)]
    pub case: CaseArgs,

    /// Variable to sweep (must be axis-eligible).
    #[arg(short = 'v', long = "var", value_name = "ID")]
    pub variable: String,

    /// Explicit display-space grid: comma-separated values.
    #[arg(long, value_name = "A,B,C")]
    pub grid: Option<String>,

    /// Evenly spaced display-space grid: min:max:steps.
    #[arg(long, value_name = "MIN:MAX:STEPS", conflicts_with = "grid")]
    pub range: Option<String>,

    /// Export the ribbon to CSV (one row per grid point).
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the full result to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for `osim batch`.
#[derive(Debug, Parser)]
pub struct BatchArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Cases CSV: header names variable ids (optional `case_id` column),
    /// one case per row.
    #[arg(long, value_name = "CSV")]
    pub cases: PathBuf,

    /// Number of coefficient draws per case.
    #[arg(short = 'n', long, default_value_t = DEFAULT_DRAW_COUNT)]
    pub draws: usize,

    /// Base random seed; case i uses seed + i. Omit for entropy seeding.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Export per-case summaries to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulate_args_parse_with_defaults() {
        let cli = Cli::try_parse_from([
            "osim", "simulate", "-m", "model.json", "--set", "age=4", "--set", "visits=2",
        ])
        .unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.draws, DEFAULT_DRAW_COUNT);
        assert_eq!(args.case.sets.len(), 2);
        assert!(args.seed.is_none());
    }

    #[test]
    fn sweep_grid_and_range_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "osim", "sweep", "-m", "model.json", "-v", "age", "--grid", "1,2,3", "--range",
            "0:10:5",
        ]);
        assert!(result.is_err());
    }
}
