//! # smpl-types::error
//!
//! Every error the kernel can raise is a precondition violation, reported
//! synchronously. `thiserror` gives each variant a descriptive `Display`
//! without hand-writing `impl fmt::Display`.

use thiserror::Error;

use crate::ids::FacilityId;

/// A precondition violation raised by a public kernel operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("model name must not be empty")]
    EmptyModelName,

    #[error("delay must be finite and non-negative, got {0}")]
    InvalidDelay(f64),

    #[error("facility server count must be >= 1, got {0}")]
    InvalidServerCount(i64),

    #[error("facility {0:?} is not registered")]
    UnknownFacility(FacilityId),

    #[error("rng stream must be in 1..=15, got {0}")]
    InvalidStream(u32),

    #[error("uniform/random distribution requires a <= b, got a={a} b={b}")]
    InvalidRange { a: f64, b: f64 },

    #[error("erlang distribution requires s <= x, got x={x} s={s}")]
    InvalidErlangShape { x: f64, s: f64 },

    #[error("hyperexponential distribution requires s > x, got x={x} s={s}")]
    InvalidHyperxShape { x: f64, s: f64 },

    #[error("release on facility {facility:?} found no server holding the given token")]
    NoReservation { facility: FacilityId },

    #[error("suspend called for a token with no scheduled event")]
    NoSuchScheduledEvent,
}
