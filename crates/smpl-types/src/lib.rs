//! # smpl-types
//!
//! Foundational data types shared by `smpl-core` and `smpl-cli`. Kept in its
//! own crate so the kernel and the CLI agree on one definition of time,
//! identifiers, and errors without either depending on the other.

#![forbid(unsafe_code)]

pub mod error;
pub mod ids;
pub mod metrics;
pub mod scenario;
pub mod time;
pub mod token;

pub use error::KernelError;
pub use ids::{EventCode, FacilityId};
pub use time::SimTime;
pub use token::Token;
