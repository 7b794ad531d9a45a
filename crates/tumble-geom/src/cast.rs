// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Sphere casts: sweep a sphere of `radius` from `origin` along `dir` for at
//! most `length` metres and report the first contact with a target shape.
//!
//! Casts starting in contact report distance `0`. A zero or non-finite
//! direction never hits.

use tumble_math::{Vec3, EPSILON};

use crate::types::shape::{Obb, Sphere};

/// First contact of a sphere cast.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CastHit {
    /// Contact point on the target's surface.
    pub point: Vec3,
    /// Unit surface normal of the target at `point` (facing the caster).
    pub normal: Vec3,
    /// Distance travelled along `dir` before contact.
    pub distance: f32,
}

/// Casts a sphere against a sphere.
pub fn sphere_cast_sphere(target: &Sphere, origin: Vec3, dir: Vec3, length: f32, radius: f32) -> Option<CastHit> {
    let dir = dir.try_normalize()?;
    let reach = target.radius() + radius.abs();
    let m = origin.sub(&target.center());
    let c = m.length_squared() - reach * reach;
    if c <= 0.0 {
        let normal = m.try_normalize().unwrap_or(-dir);
        return Some(CastHit {
            point: target.center().add(&normal.scale(target.radius())),
            normal,
            distance: 0.0,
        });
    }
    let b = m.dot(&dir);
    if b > 0.0 {
        return None;
    }
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let t = -b - disc.sqrt();
    if t.is_nan() || t > length {
        return None;
    }
    let at = origin.add(&dir.scale(t));
    let normal = at.sub(&target.center()).try_normalize().unwrap_or(-dir);
    Some(CastHit {
        point: target.center().add(&normal.scale(target.radius())),
        normal,
        distance: t,
    })
}

/// Casts a sphere against an oriented box.
///
/// The sphere centre is traced against the box inflated by `radius` (slab
/// method in box space); the hit is then resolved to the closest box point
/// to the swept centre. Corners are treated as square, so a sweep grazing
/// a corner may report a hit slightly early.
pub fn sphere_cast_obb(target: &Obb, origin: Vec3, dir: Vec3, length: f32, radius: f32) -> Option<CastHit> {
    let dir = dir.try_normalize()?;
    let radius = radius.abs();
    let o = target.to_local(origin);
    let l = target.rotation().inverse_rotate(dir);
    let he = target.half_extents().add(&Vec3::splat(radius));

    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = 0;
    for i in 0..3 {
        if l[i].abs() <= EPSILON {
            if o[i].abs() > he[i] {
                return None;
            }
            continue;
        }
        let t0 = (-he[i] - o[i]) / l[i];
        let t1 = (he[i] - o[i]) / l[i];
        let near = t0.min(t1);
        if near > t_enter {
            t_enter = near;
            enter_axis = i;
        }
        t_exit = t_exit.min(t0.max(t1));
    }
    if t_enter > t_exit || t_exit < 0.0 || t_enter > length {
        return None;
    }

    let distance = t_enter.max(0.0);
    let at = origin.add(&dir.scale(distance));
    let point = target.closest_point(at);
    let normal = at.sub(&point).try_normalize().unwrap_or_else(|| {
        let mut face = [0.0; 3];
        face[enter_axis] = if l[enter_axis] > 0.0 { -1.0 } else { 1.0 };
        target.rotation().rotate(Vec3::from(face))
    });
    Some(CastHit { point, normal, distance })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tumble_math::Quat;

    #[test]
    fn sphere_sweep_hits_sphere() {
        let target = Sphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0);
        let Some(hit) = sphere_cast_sphere(&target, Vec3::ZERO, Vec3::UNIT_X, 10.0, 0.5) else {
            unreachable!("cast is aimed at the target");
        };
        assert!((hit.distance - 3.5).abs() < 1e-5);
        assert!(hit.normal.sub(&-Vec3::UNIT_X).length() < 1e-5);
        assert!(hit.point.sub(&Vec3::new(4.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn sphere_sweep_respects_length_and_direction() {
        let target = Sphere::new(Vec3::new(5.0, 0.0, 0.0), 1.0);
        assert_eq!(sphere_cast_sphere(&target, Vec3::ZERO, Vec3::UNIT_X, 3.0, 0.5), None);
        assert_eq!(sphere_cast_sphere(&target, Vec3::ZERO, -Vec3::UNIT_X, 10.0, 0.5), None);
        assert_eq!(sphere_cast_sphere(&target, Vec3::ZERO, Vec3::ZERO, 10.0, 0.5), None);
    }

    #[test]
    fn sphere_sweep_hits_box_face() {
        let target = Obb::new(Vec3::ZERO, Quat::identity(), Vec3::splat(2.0));
        let origin = Vec3::new(0.2, 5.0, 0.0);
        let Some(hit) = sphere_cast_obb(&target, origin, -Vec3::UNIT_Y, 10.0, 0.5) else {
            unreachable!("cast drops onto the top face");
        };
        assert!((hit.distance - 3.5).abs() < 1e-5);
        assert!(hit.normal.sub(&Vec3::UNIT_Y).length() < 1e-5);
        assert!(hit.point.sub(&Vec3::new(0.2, 1.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn sphere_sweep_misses_box() {
        let target = Obb::new(Vec3::ZERO, Quat::identity(), Vec3::splat(2.0));
        assert_eq!(sphere_cast_obb(&target, Vec3::new(3.0, 5.0, 0.0), -Vec3::UNIT_Y, 10.0, 0.5), None);
        assert_eq!(sphere_cast_obb(&target, Vec3::new(0.0, 5.0, 0.0), -Vec3::UNIT_Y, 2.0, 0.5), None);
    }
}
