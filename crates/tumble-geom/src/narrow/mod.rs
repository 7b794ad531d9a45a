// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Shape-pair penetration detection.
//!
//! Every routine follows one convention: [`Penetration::vector`] points from
//! shape A toward shape B and its length is the penetration depth, so moving
//! A by `-vector / 2` and B by `+vector / 2` separates the pair.
//! `point_a` is A's deepest point inside B and `point_b` is B's deepest point
//! inside A; `point_a - point_b == vector` up to rounding.
//!
//! `None` means the shapes do not penetrate (touching counts as separated).

mod capsule;
mod obb_capsule;
mod obb_obb;
mod obb_sphere;
pub mod primitives;
mod sphere;

pub use capsule::{capsule_capsule, sphere_capsule};
pub use obb_capsule::obb_capsule;
pub use obb_obb::obb_obb;
pub use obb_sphere::obb_sphere;
pub use sphere::sphere_sphere;

use tumble_math::Vec3;

use crate::types::shape::{Shape, ShapeKind};

/// Result of a penetrating shape pair.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Penetration {
    /// Direction A→B scaled by the depth.
    pub vector: Vec3,
    /// Deepest point of A inside B.
    pub point_a: Vec3,
    /// Deepest point of B inside A.
    pub point_b: Vec3,
    /// Half-width of the flat patch the points stand for. Zero for point
    /// and line contacts; positive only for face-on-face boxes.
    pub patch_radius: f32,
}

impl Penetration {
    /// Penetration depth.
    pub fn depth(&self) -> f32 {
        self.vector.length()
    }

    /// Unit normal A→B (zero for a zero-depth result).
    pub fn normal(&self) -> Vec3 {
        self.vector.normalize()
    }

    /// The same contact seen from B: vector negated, points exchanged.
    pub fn flipped(self) -> Self {
        Self { vector: -self.vector, point_a: self.point_b, point_b: self.point_a, ..self }
    }
}

/// Canonical pair routine selected for two shape kinds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PairKind {
    /// Box vs box.
    ObbObb,
    /// Box vs sphere.
    ObbSphere,
    /// Box vs capsule.
    ObbCapsule,
    /// Sphere vs sphere.
    SphereSphere,
    /// Sphere vs capsule.
    SphereCapsule,
    /// Capsule vs capsule.
    CapsuleCapsule,
}

/// A resolved dispatch: which routine, and whether the arguments must be
/// exchanged to match its canonical order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Dispatch {
    /// Routine to run.
    pub kind: PairKind,
    /// `true` when the routine expects `(b, a)`.
    pub swapped: bool,
}

const fn d(kind: PairKind, swapped: bool) -> Dispatch {
    Dispatch { kind, swapped }
}

/// Rows and columns indexed by `ShapeKind as usize` (box, sphere, capsule).
const TABLE: [[Dispatch; 3]; 3] = [
    [
        d(PairKind::ObbObb, false),
        d(PairKind::ObbSphere, false),
        d(PairKind::ObbCapsule, false),
    ],
    [
        d(PairKind::ObbSphere, true),
        d(PairKind::SphereSphere, false),
        d(PairKind::SphereCapsule, false),
    ],
    [
        d(PairKind::ObbCapsule, true),
        d(PairKind::SphereCapsule, true),
        d(PairKind::CapsuleCapsule, false),
    ],
];

impl PairKind {
    /// Looks up the routine for `(a, b)`.
    pub const fn classify(a: ShapeKind, b: ShapeKind) -> Dispatch {
        TABLE[a as usize][b as usize]
    }
}

/// Detects penetration between two shapes of any kind.
pub fn detect(a: &Shape, b: &Shape) -> Option<Penetration> {
    detect_with(PairKind::classify(a.kind(), b.kind()), a, b)
}

/// Runs a pre-resolved dispatch. A dispatch that does not match the shapes'
/// kinds yields `None`.
pub fn detect_with(dispatch: Dispatch, a: &Shape, b: &Shape) -> Option<Penetration> {
    let (first, second) = if dispatch.swapped { (b, a) } else { (a, b) };
    let found = match (dispatch.kind, first, second) {
        (PairKind::ObbObb, Shape::Obb(x), Shape::Obb(y)) => obb_obb(x, y),
        (PairKind::ObbSphere, Shape::Obb(x), Shape::Sphere(y)) => obb_sphere(x, y),
        (PairKind::ObbCapsule, Shape::Obb(x), Shape::Capsule(y)) => obb_capsule(x, y),
        (PairKind::SphereSphere, Shape::Sphere(x), Shape::Sphere(y)) => sphere_sphere(x, y),
        (PairKind::SphereCapsule, Shape::Sphere(x), Shape::Capsule(y)) => sphere_capsule(x, y),
        (PairKind::CapsuleCapsule, Shape::Capsule(x), Shape::Capsule(y)) => capsule_capsule(x, y),
        _ => None,
    };
    if dispatch.swapped {
        found.map(Penetration::flipped)
    } else {
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Capsule, Obb, Sphere};
    use tumble_math::Quat;

    #[test]
    fn table_is_symmetric() {
        let kinds = [ShapeKind::Obb, ShapeKind::Sphere, ShapeKind::Capsule];
        for a in kinds {
            for b in kinds {
                let ab = PairKind::classify(a, b);
                let ba = PairKind::classify(b, a);
                assert_eq!(ab.kind, ba.kind);
                if a != b {
                    assert_ne!(ab.swapped, ba.swapped);
                }
            }
        }
    }

    #[test]
    fn swapped_dispatch_flips_result() {
        let boxed = Shape::from(Obb::new(Vec3::ZERO, Quat::identity(), Vec3::splat(2.0)));
        let ball = Shape::from(Sphere::new(Vec3::new(0.0, 1.25, 0.0), 0.5));
        let ab = detect(&boxed, &ball);
        let ba = detect(&ball, &boxed);
        let (Some(ab), Some(ba)) = (ab, ba) else {
            unreachable!("box and sphere overlap by 0.25");
        };
        assert!(ab.vector.sub(&-ba.vector).length() < 1e-6);
        assert_eq!(ab.point_a, ba.point_b);
        assert!((ab.depth() - 0.25).abs() < 1e-5);
        assert!(ab.normal().y() > 0.99);
    }

    #[test]
    fn mismatched_dispatch_is_none() {
        let ball = Shape::from(Sphere::new(Vec3::ZERO, 1.0));
        let cap = Shape::from(Capsule::new(Vec3::ZERO, Quat::identity(), 1.0, 1.0));
        let wrong = Dispatch { kind: PairKind::ObbObb, swapped: false };
        assert_eq!(detect_with(wrong, &ball, &cap), None);
    }
}
