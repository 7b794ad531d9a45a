// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Core geometry types used by the engine (transform, AABB, shapes).
//!
//! Notes:
//! - Overlap semantics are inclusive on faces so touching bounds still pair
//!   in the broad phase; the narrow phase decides whether they penetrate.
//! - Sizes and radii are stored as absolute values.

#[doc = "Axis-aligned bounding boxes (world space)."]
pub mod aabb;
#[doc = "Oriented boxes, spheres, capsules and the `Shape` union."]
pub mod shape;
#[doc = "Rigid transforms (translation + rotation)."]
pub mod transform;
