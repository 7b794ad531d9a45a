// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Opaque handles into the world registries.

use core::fmt;

/// Identifies a rigid body. Allocated by [`World::add_body`](crate::World::add_body)
/// and never reused within one world.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyHandle(pub(crate) u32);

/// Identifies a collider. Allocated by
/// [`World::add_collider`](crate::World::add_collider) and never reused within
/// one world.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColliderHandle(pub(crate) u32);

/// Slot of a live contact in the contact arena. Slots are recycled once the
/// contact is destroyed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactHandle(pub(crate) usize);

impl BodyHandle {
    /// Rebuilds a handle from [`index`](Self::index). Handles not issued by
    /// the world it is used with name nothing.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl ColliderHandle {
    /// Rebuilds a handle from [`index`](Self::index). Handles not issued by
    /// the world it is used with name nothing.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw index.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl ContactHandle {
    /// Arena slot.
    pub fn slot(self) -> usize {
        self.0
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "body#{}", self.0)
    }
}

impl fmt::Display for ColliderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collider#{}", self.0)
    }
}
