// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use tumble_math::{sign_nonzero, Vec3, EPSILON};

use super::primitives::{closest_points_segments, project_point_to_segment};
use super::Penetration;
use crate::types::shape::{Capsule, Obb};

/// Distance slack when widening the closest run along the capsule segment.
const RUN_TOLERANCE: f32 = 1e-5;

/// Box vs capsule.
///
/// 1. Each end cap is tested as a sphere; a cap is accepted only when the
///    box lies beyond it along the capsule axis.
/// 2. SAT on the three box face axes with the capsule's projected radius;
///    any gap means no contact.
/// 3. If the core segment stays outside the box, the exact closest pair
///    between segment and box decides (depth = radius - distance). When a
///    whole run of the segment is equally close (capsule lying along a face
///    or an edge) the contact sits in the middle of that run.
/// 4. If the segment enters the box, the least-overlap face axis from step 2
///    is used instead.
pub fn obb_capsule(a: &Obb, b: &Capsule) -> Option<Penetration> {
    let axis = b.axis();
    let (bottom, top) = b.segment();
    let r = b.radius();

    for (cap, outward) in [(bottom, -axis), (top, axis)] {
        if let Some(found) = cap_contact(a, cap, outward, r) {
            return Some(found);
        }
    }

    let d = b.center().sub(&a.center());
    let he = a.half_extents();
    let mut best: Option<(Vec3, f32)> = None;
    for (i, face) in a.axes().iter().enumerate() {
        let dist = d.dot(face);
        let overlap = he[i] + b.projected_half_width(*face) - dist.abs();
        if overlap.is_nan() || overlap <= 0.0 {
            return None;
        }
        if best.is_none_or(|(_, o)| overlap < o) {
            best = Some((face.scale(sign_nonzero(dist)), overlap));
        }
    }
    let (sat_n, sat_depth) = best?;

    if !segment_hits_box(a, bottom, top) {
        let (on_box, q) = closest_to_segment(a, bottom, top);
        let gap = q.sub(&on_box);
        let dist = gap.length();
        if dist.is_nan() || dist >= r {
            return None;
        }
        if let Some(n) = gap.try_normalize() {
            return Some(Penetration {
                vector: n.scale(r - dist),
                point_a: on_box,
                point_b: q.sub(&n.scale(r)),
                patch_radius: 0.0,
});
        }
    }

    // Segment enters the box (or only grazes its surface).
    let lo = bottom.dot(&sat_n);
    let hi = top.dot(&sat_n);
    let deepest = if (lo - hi).abs() <= EPSILON {
        b.center()
    } else if lo < hi {
        bottom
    } else {
        top
    };
    let point_b = deepest.sub(&sat_n.scale(r));
    let vector = sat_n.scale(sat_depth);
    Some(Penetration { vector, point_a: point_b.add(&vector), point_b, patch_radius: 0.0 })
}

fn cap_contact(a: &Obb, cap: Vec3, outward: Vec3, r: f32) -> Option<Penetration> {
    let on_box = a.closest_point(cap);
    let d = cap.sub(&on_box);
    let dist = d.length();
    // A cap centre inside the box is left to the later stages.
    if dist <= EPSILON || dist.is_nan() || dist >= r {
        return None;
    }
    let n = d.scale(1.0 / dist);
    if n.dot(&outward) >= 0.0 {
        return None;
    }
    Some(Penetration {
        vector: n.scale(r - dist),
        point_a: on_box,
        point_b: cap.sub(&n.scale(r)),
        patch_radius: 0.0,
})
}

/// Closest pair `(on_box, on_segment)` for a segment that stays outside
/// the box.
///
/// The minimum is reached at a segment end against the box or between the
/// segment and one of the twelve box edges. Distance to a convex set is
/// convex along the segment, so the minimisers form one run; the pair is
/// moved to the middle of it.
fn closest_to_segment(a: &Obb, s0: Vec3, s1: Vec3) -> (Vec3, Vec3) {
    let mut best = (a.closest_point(s0), s0);
    let mut best_d2 = best.1.sub(&best.0).length_squared();
    let mut consider = |on_box: Vec3, on_seg: Vec3| {
        let d2 = on_seg.sub(&on_box).length_squared();
        if d2 < best_d2 {
            best = (on_box, on_seg);
            best_d2 = d2;
        }
    };
    consider(a.closest_point(s1), s1);
    let verts = a.vertices();
    for i in 0..8 {
        for bit in [1_usize, 2, 4] {
            if i & bit == 0 {
                let (on_box, on_seg) = closest_points_segments(verts[i], verts[i | bit], s0, s1);
                consider(on_box, on_seg);
            }
        }
    }

    let dist_at = |t: f32| {
        let p = s0.lerp(&s1, t);
        p.sub(&a.closest_point(p)).length()
    };
    let (_, t_best) = project_point_to_segment(best.1, s0, s1);
    let limit = best_d2.sqrt() + RUN_TOLERANCE;
    let t_lo = run_end(&dist_at, t_best, 0.0, limit);
    let t_hi = run_end(&dist_at, t_best, 1.0, limit);
    let on_seg = s0.lerp(&s1, 0.5 * (t_lo + t_hi));
    (a.closest_point(on_seg), on_seg)
}

/// Last parameter between `inside` and `outside` where `dist_at` stays
/// within `limit`, found by bisection.
fn run_end(dist_at: &impl Fn(f32) -> f32, inside: f32, outside: f32, limit: f32) -> f32 {
    if dist_at(outside) <= limit {
        return outside;
    }
    let (mut i, mut o) = (inside, outside);
    for _ in 0..24 {
        let m = 0.5 * (i + o);
        if dist_at(m) <= limit {
            i = m;
        } else {
            o = m;
        }
    }
    i
}

/// Slab test of the segment `p0..p1` against the box.
fn segment_hits_box(a: &Obb, p0: Vec3, p1: Vec3) -> bool {
    let o = a.to_local(p0);
    let l = a.rotation().inverse_rotate(p1.sub(&p0));
    let he = a.half_extents();
    let mut s_min = 0.0_f32;
    let mut s_max = 1.0_f32;
    for i in 0..3 {
        if l[i].abs() <= EPSILON {
            if o[i].abs() > he[i] {
                return false;
            }
            continue;
        }
        let s0 = (-he[i] - o[i]) / l[i];
        let s1 = (he[i] - o[i]) / l[i];
        s_min = s_min.max(s0.min(s1));
        s_max = s_max.min(s0.max(s1));
        if s_min > s_max {
            return false;
        }
    }
    true
}
