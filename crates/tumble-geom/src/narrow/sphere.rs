// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use tumble_math::Vec3;

use super::Penetration;
use crate::types::shape::Sphere;

/// Sphere vs sphere. Collides iff the centre distance is below the radius
/// sum; coincident centres push along +Y.
pub fn sphere_sphere(a: &Sphere, b: &Sphere) -> Option<Penetration> {
    balls(a.center(), a.radius(), b.center(), b.radius())
}

/// Penetration between two balls given by centre and radius.
pub(crate) fn balls(ca: Vec3, ra: f32, cb: Vec3, rb: f32) -> Option<Penetration> {
    let d = cb.sub(&ca);
    let dist = d.length();
    let reach = ra + rb;
    if dist.is_nan() || dist >= reach {
        return None;
    }
    let n = d.try_normalize().unwrap_or(Vec3::UNIT_Y);
    Some(Penetration {
        vector: n.scale(reach - dist),
        point_a: ca.add(&n.scale(ra)),
        point_b: cb.sub(&n.scale(rb)),
        patch_radius: 0.0,
})
}
