// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use super::primitives::{closest_points_segments, project_point_to_segment};
use super::sphere::balls;
use super::Penetration;
use crate::types::shape::{Capsule, Sphere};

/// Capsule vs capsule: closest points between the two core segments, then
/// a ball test with the two radii.
pub fn capsule_capsule(a: &Capsule, b: &Capsule) -> Option<Penetration> {
    let (a0, a1) = a.segment();
    let (b0, b1) = b.segment();
    let (pa, pb) = closest_points_segments(a0, a1, b0, b1);
    balls(pa, a.radius(), pb, b.radius())
}

/// Sphere vs capsule: closest point on the capsule's segment, then a ball
/// test.
pub fn sphere_capsule(a: &Sphere, b: &Capsule) -> Option<Penetration> {
    let (b0, b1) = b.segment();
    let (q, _) = project_point_to_segment(a.center(), b0, b1);
    balls(a.center(), a.radius(), q, b.radius())
}
