// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Surface response coefficients and per-collider collision modes.

/// Contact response coefficients of one collider.
///
/// A pair's coefficients are the products of both colliders' values.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Bounciness in `[0, 1]`.
    pub restitution: f32,
    /// Coulomb friction coefficient.
    pub friction: f32,
    /// Baumgarte factor: fraction of the penetration removed per step.
    pub beta: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self { restitution: 0.3, friction: 0.6, beta: 0.45 }
    }
}

impl Material {
    /// Creates a material.
    pub const fn new(restitution: f32, friction: f32, beta: f32) -> Self {
        Self { restitution, friction, beta }
    }

    /// Coefficients for a pair of colliders.
    pub fn combine(&self, other: &Self) -> Self {
        Self {
            restitution: self.restitution * other.restitution,
            friction: self.friction * other.friction,
            beta: self.beta * other.beta,
        }
    }
}

/// How a collider takes part in collision detection.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionMode {
    /// Detected and resolved by the solver.
    #[default]
    Solid,
    /// Detected and reported, never resolved.
    Trigger,
    /// Never tested.
    Ignore,
}

impl CollisionMode {
    /// Pair mode: `Ignore` wins over `Trigger`, which wins over `Solid`.
    pub fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Ignore, _) | (_, Self::Ignore) => Self::Ignore,
            (Self::Trigger, _) | (_, Self::Trigger) => Self::Trigger,
            _ => Self::Solid,
        }
    }
}
