//! # smpl-types::token
//!
//! spec.md requires tokens to be opaque, non-null, value-compared identities.
//! Rust has no null pointers in safe code, so "non-null" is discharged
//! statically by the trait bound rather than a runtime check: any type
//! meeting these bounds is automatically a valid token.

use std::fmt::Debug;
use std::hash::Hash;

/// An opaque identity addressing an event or a facility reservation.
///
/// The kernel never interprets a token's value; it only stores and compares
/// it. Plain integers, enums, or newtypes over either all qualify.
pub trait Token: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<T> Token for T where T: Copy + Eq + Hash + Debug + Send + Sync + 'static {}
