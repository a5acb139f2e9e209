//! # smpl-cli::args
//!
//! Defines the command-line argument structure using `clap`.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(long, global = true, default_value = "human")]
    pub log: LogFormat,

    /// Drop to a terse, color-free log format (info/warn/error only).
    #[arg(long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scenario file against the kernel to completion.
    Run(RunOpts),
    /// Validate a scenario file for correctness without running it.
    Validate {
        #[arg(value_name = "SCENARIO_PATH")]
        scenario: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct RunOpts {
    /// Path to the scenario file (YAML or TOML).
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Enable the kernel's domain-level trace sink (`At time ... -- ...`).
    #[arg(long)]
    pub trace: bool,

    /// Override the scenario's `stop_at`, in simulation time units.
    #[arg(long)]
    pub stop_at: Option<f64>,

    /// Suppress the statistics report printed after the run completes.
    #[arg(long)]
    pub no_report: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}
