//! # smpl-core
//!
//! A discrete-event simulation kernel in the style of MacDougall's "smpl"
//! library: a time-ordered event list, multi-server facilities with
//! priority queueing and preemption, and the time-weighted statistics
//! layered on top of them. See [`Kernel`] for the public entry point.

#![forbid(unsafe_code)]

pub mod event;
pub mod facility;
pub mod kernel;
pub mod report;
pub mod rng;
pub mod trace;

pub use event::{EventKey, EventPool, EventRecord};
pub use facility::{Facility, FacilityServer, Outcome};
pub use kernel::Kernel;
pub use rng::Rng;
pub use trace::Tracer;
