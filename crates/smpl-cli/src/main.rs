//! # smpl-cli
//!
//! Command-line front end for `smpl-core`: runs a scenario file to
//! completion and prints its statistics report, or validates one without
//! running it. A user embedding the kernel directly in their own model
//! does not need this crate at all — it exists as the scenario-driven
//! smoke-test/demo harness spec.md's ambient stack calls for, in the
//! teacher's own `run`/`validate` subcommand shape.

#![forbid(unsafe_code)]

use crate::args::{Cli, Command, LogFormat};
use anyhow::Result;
use clap::Parser;

mod args;
mod commands;
mod logging;
mod wiring;

fn main() -> Result<()> {
    let args = Cli::parse();
    init_logging(args.log, args.quiet);

    match args.command {
        Command::Run(opts) => commands::run::exec(opts),
        Command::Validate { scenario } => commands::validate::exec(scenario),
    }
}

fn init_logging(format: LogFormat, quiet: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if quiet {
        tracing_subscriber::fmt()
            .event_format(logging::HeadlessFormatter)
            .with_env_filter(filter)
            .init();
        return;
    }

    match format {
        LogFormat::Human => {
            tracing_subscriber::fmt()
                .event_format(logging::SimulationFormatter::new())
                .with_env_filter(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt().json().with_env_filter(filter).init();
        }
    }
}
