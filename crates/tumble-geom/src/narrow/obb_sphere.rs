// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use tumble_math::{clamp, sign_nonzero, Vec3};

use super::Penetration;
use crate::types::shape::{Obb, Sphere};

/// Box vs sphere.
///
/// The sphere centre is clamped into box space. When the clamp moves it, the
/// clamped point is the contact on the box and depth is `radius - distance`.
/// When the centre lies inside the box, the sphere is pushed out through the
/// face of least penetration (depth = distance to that face + radius).
pub fn obb_sphere(a: &Obb, b: &Sphere) -> Option<Penetration> {
    let local = a.to_local(b.center());
    let he = a.half_extents();
    let clamped = Vec3::new(
        clamp(local.x(), -he.x(), he.x()),
        clamp(local.y(), -he.y(), he.y()),
        clamp(local.z(), -he.z(), he.z()),
    );

    if clamped != local {
        let on_box = a.to_world(clamped);
        let d = b.center().sub(&on_box);
        let dist = d.length();
        if dist.is_nan() || dist >= b.radius() {
            return None;
        }
        let n = d
            .try_normalize()
            .or_else(|| b.center().sub(&a.center()).try_normalize())
            .unwrap_or(Vec3::UNIT_Y);
        return Some(Penetration {
            vector: n.scale(b.radius() - dist),
            point_a: on_box,
            point_b: b.center().sub(&n.scale(b.radius())),
            patch_radius: 0.0,
});
    }

    // Centre inside: pick the face with the least distance to travel.
    let mut best = 0;
    let mut best_gap = f32::INFINITY;
    for i in 0..3 {
        let gap = he[i] - local[i].abs();
        if gap < best_gap {
            best = i;
            best_gap = gap;
        }
    }
    let side = sign_nonzero(local[best]);
    let n = a.axes()[best].scale(side);
    let mut face = local.to_array();
    face[best] = side * he[best];
    Some(Penetration {
        vector: n.scale(best_gap + b.radius()),
        point_a: a.to_world(Vec3::from(face)),
        point_b: b.center().sub(&n.scale(b.radius())),
        patch_radius: 0.0,
})
}
