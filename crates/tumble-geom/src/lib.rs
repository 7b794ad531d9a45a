// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Geometry for the Tumble rigid-body engine.

This crate provides:
- Axis-aligned bounding boxes (`Aabb`) and rigid transforms (`Transform`).
- Collision shapes: oriented boxes (`Obb`), spheres and capsules, unified by
  the closed `Shape` enum.
- A broad-phase trait with a sweep-and-prune implementation and a brute-force
  reference (`broad`).
- Shape-pair penetration tests (`narrow`) and sphere casts (`cast`).

Design notes:
- Deterministic: no ambient RNG; broad-phase pair output is canonical.
- Float32 throughout. Degenerate geometry resolves to `None` or a documented
  fallback direction; no routine returns NaN or panics.
- Penetration vectors point from shape A toward shape B.
"]

/// Broad-phase pairing.
pub mod broad;
/// Sphere casts against spheres and boxes.
pub mod cast;
/// Shape-pair penetration detection.
pub mod narrow;
/// Foundational geometric types.
pub mod types;

pub use types::aabb::Aabb;
pub use types::shape::{Capsule, Obb, Shape, ShapeKind, Sphere};
pub use types::transform::Transform;
