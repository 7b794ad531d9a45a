// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Point, segment, plane and quad helpers shared by the pair routines.
//!
//! Every helper tolerates degenerate input (zero-length segments, parallel
//! lines) and returns a finite fallback instead of NaN.

use tumble_math::{clamp, Vec3, EPSILON};

/// Closest point on segment `a..b` to `p`, with its parameter `t ∈ [0, 1]`.
///
/// A degenerate segment returns `(a, 0.0)`.
pub fn project_point_to_segment(p: Vec3, a: Vec3, b: Vec3) -> (Vec3, f32) {
    let ab = b.sub(&a);
    let len2 = ab.length_squared();
    if len2 <= EPSILON * EPSILON {
        return (a, 0.0);
    }
    let t = clamp(p.sub(&a).dot(&ab) / len2, 0.0, 1.0);
    (a.add(&ab.scale(t)), t)
}

/// Orthogonal projection of `p` onto the plane through `origin` with unit
/// `normal`.
pub fn project_point_to_plane(p: Vec3, normal: Vec3, origin: Vec3) -> Vec3 {
    p.sub(&normal.scale(p.sub(&origin).dot(&normal)))
}

/// Closest points between segments `p1..q1` and `p2..q2`.
///
/// Returns `(on_first, on_second)`. Parallel segments resolve to the pair
/// nearest the start of the first segment.
pub fn closest_points_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1.sub(&p1);
    let d2 = q2.sub(&p2);
    let r = p1.sub(&p2);
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(&r);
    let tiny = EPSILON * EPSILON;

    if a <= tiny && e <= tiny {
        return (p1, p2);
    }

    let (s, t) = if a <= tiny {
        (0.0, clamp(f / e, 0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= tiny {
            (clamp(-c / a, 0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let mut s = if denom > tiny { clamp((b * f - c * e) / denom, 0.0, 1.0) } else { 0.0 };
            let mut t = (b * s + f) / e;
            if t < 0.0 {
                t = 0.0;
                s = clamp(-c / a, 0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = clamp((b - c) / a, 0.0, 1.0);
            }
            (s, t)
        }
    };
    (p1.add(&d1.scale(s)), p2.add(&d2.scale(t)))
}

/// Returns `true` if `p` (assumed on the quad's plane) lies inside or on
/// the convex quad `q` (corners in cyclic order) with plane `normal`.
///
/// Accepts either winding.
pub fn point_in_quad(p: Vec3, q: &[Vec3; 4], normal: Vec3) -> bool {
    let tol = 1e-6;
    let mut positive = true;
    let mut negative = true;
    for i in 0..4 {
        let edge = q[(i + 1) % 4].sub(&q[i]);
        let side = edge.cross(&p.sub(&q[i])).dot(&normal);
        positive &= side >= -tol;
        negative &= side <= tol;
    }
    positive || negative
}

/// Intersection of segments `a0..a1` and `b0..b1` lying in the plane with
/// unit `normal`; `None` when parallel or disjoint.
pub fn segment_intersection_in_plane(a0: Vec3, a1: Vec3, b0: Vec3, b1: Vec3, normal: Vec3) -> Option<Vec3> {
    let da = a1.sub(&a0);
    let db = b1.sub(&b0);
    let denom = da.cross(&db).dot(&normal);
    if denom.abs() <= EPSILON {
        return None;
    }
    let w = b0.sub(&a0);
    let t = w.cross(&db).dot(&normal) / denom;
    let u = w.cross(&da).dot(&normal) / denom;
    let range = -1e-6..=1.0 + 1e-6;
    if range.contains(&t) && range.contains(&u) {
        Some(a0.add(&da.scale(t)))
    } else {
        None
    }
}

/// A face rectangle: centre plus two orthogonal half-edge vectors.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    /// Face centre.
    pub center: Vec3,
    /// First half-edge vector.
    pub u: Vec3,
    /// Second half-edge vector.
    pub v: Vec3,
}

impl Rect {
    /// Corners in cyclic order.
    pub fn corners(&self) -> [Vec3; 4] {
        let c = self.center;
        [
            c.add(&self.u).add(&self.v),
            c.sub(&self.u).add(&self.v),
            c.sub(&self.u).sub(&self.v),
            c.add(&self.u).sub(&self.v),
        ]
    }

    /// Clips segment `a..b` to the rectangle's extent (measured in its
    /// plane) and returns the surviving sub-segment, or `None` if nothing
    /// survives.
    pub fn clip_segment(&self, a: Vec3, b: Vec3) -> Option<(Vec3, Vec3)> {
        let mut t0 = 0.0_f32;
        let mut t1 = 1.0_f32;
        let d = b.sub(&a);
        for axis in [self.u, self.v] {
            let len2 = axis.length_squared();
            if len2 <= EPSILON * EPSILON {
                continue;
            }
            // Coordinates in units of the half edge: the slab is [-1, 1].
            let start = a.sub(&self.center).dot(&axis) / len2;
            let step = d.dot(&axis) / len2;
            if step.abs() <= EPSILON {
                if !(-1.0..=1.0).contains(&start) {
                    return None;
                }
                continue;
            }
            let ta = (-1.0 - start) / step;
            let tb = (1.0 - start) / step;
            t0 = t0.max(ta.min(tb));
            t1 = t1.min(ta.max(tb));
            if t0 > t1 {
                return None;
            }
        }
        Some((a.add(&d.scale(t0)), a.add(&d.scale(t1))))
    }
}
