//! # smpl-types::ids
//!
//! Distinct identifier types, to keep a facility handle from being mixed up
//! with a raw event tag.

/// A small integer tag chosen by the user to distinguish event kinds.
pub type EventCode = i32;

/// A handle to a registered facility, returned by `Kernel::facility`.
///
/// Facilities are never destroyed once created, so a `FacilityId` stays
/// valid for the lifetime of the kernel instance that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FacilityId(pub u32);

impl FacilityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
