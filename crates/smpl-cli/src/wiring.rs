//! # smpl-cli::wiring
//!
//! Builds a [`Kernel`] from a parsed [`Scenario`] and drives it to
//! completion. The scenario's `script` is a flat list of `(at, token,
//! action)` triples; each is realized as one scheduled event whose event
//! code is the directive's index into the script, so that `cause()`
//! returning `(code, token)` tells this driver exactly which directive just
//! fired — including a blocked `request`/`preempt` that the kernel
//! re-injects with the same event code once its facility frees up
//! (spec.md §4.4). This mirrors the teacher's `build_world`/`finalize_world_setup`
//! split between "construct" and "wire up", collapsed here because the
//! kernel has no peer topology to finalize.

use anyhow::{anyhow, Result};
use smpl_core::Kernel;
use smpl_types::{
    ids::{EventCode, FacilityId},
    scenario::{Action, Scenario},
};
use std::collections::HashMap;

/// Token type used by the CLI's scenario driver. A user embedding
/// `smpl-core` directly is free to use any `Token`-bound type; the demo
/// harness only ever needs plain integers.
pub type CliToken = i64;

/// Constructs a kernel from `scenario`'s name and facility declarations.
/// Returns the kernel alongside a name -> id lookup for dispatching
/// facility-targeted actions.
pub fn build_kernel(scenario: &Scenario) -> Result<(Kernel<CliToken>, HashMap<String, FacilityId>)> {
    let mut kernel = Kernel::new(scenario.name.clone())?;
    let mut facilities = HashMap::with_capacity(scenario.facilities.len());
    for spec in &scenario.facilities {
        let fid = kernel.facility(spec.name.clone(), spec.servers)?;
        facilities.insert(spec.name.clone(), fid);
    }
    Ok((kernel, facilities))
}

/// Schedules one event per script directive, at its `at` time, tagged with
/// its index as the event code.
pub fn schedule_script(kernel: &mut Kernel<CliToken>, scenario: &Scenario) -> Result<()> {
    for (i, directive) in scenario.script.iter().enumerate() {
        kernel.schedule(i as EventCode, directive.at, directive.token)?;
    }
    Ok(())
}

/// Executes the action named by the directive at `code`, if `code` is a
/// valid script index. Event codes outside the script's range belong to
/// ordinary `Action::Schedule` events a directive injected into the future
/// and carry no action of their own — the driver just lets them pass
/// through `cause()` silently.
fn dispatch_one(
    kernel: &mut Kernel<CliToken>,
    scenario: &Scenario,
    facilities: &HashMap<String, FacilityId>,
    code: EventCode,
    token: CliToken,
) -> Result<()> {
    let Some(directive) = scenario.script.get(code as usize) else {
        return Ok(());
    };
    match &directive.action {
        Action::Schedule { event, delay } => {
            kernel.schedule(*event, *delay, token)?;
        }
        Action::Request { facility, priority } => {
            let fid = lookup(facilities, facility)?;
            kernel.request(fid, token, *priority)?;
        }
        Action::Preempt { facility, priority } => {
            let fid = lookup(facilities, facility)?;
            kernel.preempt(fid, token, *priority)?;
        }
        Action::Release { facility } => {
            let fid = lookup(facilities, facility)?;
            kernel.release(fid, token)?;
        }
    }
    Ok(())
}

fn lookup(facilities: &HashMap<String, FacilityId>, name: &str) -> Result<FacilityId> {
    facilities
        .get(name)
        .copied()
        .ok_or_else(|| anyhow!("scenario references unknown facility {:?}", name))
}

/// The user model's canonical control flow (spec.md §2): loop `cause()`,
/// dispatch, repeat, until the event list empties or `stop_at` is reached.
pub fn run_to_completion(
    kernel: &mut Kernel<CliToken>,
    scenario: &Scenario,
    facilities: &HashMap<String, FacilityId>,
    stop_at: Option<f64>,
) -> Result<u64> {
    let stop_at = stop_at.or(scenario.stop_at);
    let mut dispatched = 0u64;
    while let Some((code, token)) = kernel.cause() {
        if let Some(limit) = stop_at {
            if kernel.time() > limit {
                break;
            }
        }
        dispatch_one(kernel, scenario, facilities, code, token)?;
        dispatched += 1;
    }
    Ok(dispatched)
}
