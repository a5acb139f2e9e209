//! # smpl-cli::commands::validate
//!
//! Implements the `validate` subcommand: parse a scenario file and run its
//! schema-level checks without creating a kernel or scheduling anything.

use anyhow::Result;
use smpl_types::scenario::Scenario;
use std::{fs, path::PathBuf};

pub fn exec(path: PathBuf) -> Result<()> {
    let content = fs::read_to_string(&path)?;
    let scenario: Scenario = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => return Err(anyhow::anyhow!("unsupported scenario file extension: {:?}", path)),
    };

    scenario.validate().map_err(|e| anyhow::anyhow!(e))?;

    println!(
        "scenario {:?} is valid: {} facilities, {} script entries",
        scenario.name,
        scenario.facilities.len(),
        scenario.script.len()
    );
    Ok(())
}
