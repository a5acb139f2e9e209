//! # smpl-cli::commands::run
//!
//! Implements the `run` subcommand: parse a scenario, build a kernel from
//! it, drive the kernel to completion, then print the statistics report
//! unless suppressed.

use crate::{args::RunOpts, wiring};
use anyhow::Result;
use smpl_types::scenario::Scenario;
use std::fs;

pub fn exec(opts: RunOpts) -> Result<()> {
    let content = fs::read_to_string(&opts.scenario)?;
    let scenario: Scenario = match opts.scenario.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => {
            return Err(anyhow::anyhow!(
                "unsupported scenario file extension: {:?}",
                opts.scenario
            ))
        }
    };
    scenario.validate().map_err(|e| anyhow::anyhow!(e))?;

    let (mut kernel, facilities) = wiring::build_kernel(&scenario)?;
    kernel.trace(opts.trace);

    println!(
        "running scenario {:?} ({} facilities, {} script entries)",
        scenario.name,
        scenario.facilities.len(),
        scenario.script.len()
    );

    wiring::schedule_script(&mut kernel, &scenario)?;
    let dispatched = wiring::run_to_completion(&mut kernel, &scenario, &facilities, opts.stop_at)?;

    println!(
        "completed at t={:.3} after {} dispatched events",
        kernel.time(),
        dispatched
    );

    if !opts.no_report {
        print!("{}", kernel.report());
    }

    Ok(())
}
