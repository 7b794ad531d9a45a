// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use tumble_math::{Quat, Vec3};

/// Rigid transform used to place colliders on bodies and bodies in the world.
///
/// Conventions:
/// - `translation` in meters (world space, or body space for a collider's
///   local pose).
/// - `rotation` as a unit quaternion (normalised on construction).
/// - No scale: shapes carry their own sizes.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    translation: Vec3,
    rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Identity transform (no translation, no rotation).
    pub const fn identity() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::identity() }
    }

    /// Creates a transform from components.
    pub fn new(translation: Vec3, rotation: Quat) -> Self {
        Self { translation, rotation: rotation.normalize() }
    }

    /// Pure translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self { translation, rotation: Quat::identity() }
    }

    /// Translation component.
    pub fn translation(&self) -> Vec3 {
        self.translation
    }

    /// Rotation component.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Maps a point from local to parent space.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.translation.add(&self.rotation.rotate(p))
    }

    /// Maps a direction from local to parent space (translation ignored).
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        self.rotation.rotate(v)
    }

    /// Maps a point from parent to local space.
    pub fn inverse_transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.inverse_rotate(p.sub(&self.translation))
    }

    /// Returns `self * child`: `child` expressed in `self`'s parent space.
    pub fn compose(&self, child: &Self) -> Self {
        Self::new(
            self.transform_point(child.translation),
            self.rotation.multiply(&child.rotation),
        )
    }
}
