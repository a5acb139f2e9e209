//! # smpl-types::time
//!
//! Simulation time is logical, not wall-clock: a `f64` advanced only by
//! `cause()` dequeuing the earliest pending event. Using a float (rather
//! than the teacher's integer-nanosecond `SimTime`) matches the `real`
//! trigger times and RNG-derived delays spec.md's distributions produce.

use crate::error::KernelError;

/// The fundamental unit of simulation time.
pub type SimTime = f64;

/// The start of simulation time, used by `init` and `reset`.
pub const SIM_EPOCH: SimTime = 0.0;

/// Validates a delay passed to `schedule`: must be finite and non-negative.
pub fn validate_delay(delay: SimTime) -> Result<SimTime, KernelError> {
    if delay.is_finite() && delay >= 0.0 {
        Ok(delay)
    } else {
        Err(KernelError::InvalidDelay(delay))
    }
}
