// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use tumble_math::{sign_epsilon, sign_nonzero, Vec3};

use super::primitives::{
    closest_points_segments, point_in_quad, project_point_to_plane, segment_intersection_in_plane, Rect,
};
use super::Penetration;
use crate::types::shape::Obb;

/// Dead band used when classifying a box axis against the contact normal.
const FEATURE_EPSILON: f32 = 1e-5;
/// Edge-cross axes shorter than this are skipped as near-parallel.
const PARALLEL_EPSILON: f32 = 1e-6;
/// An edge-cross axis must beat the current best by this much to win.
const EDGE_BIAS: f32 = 1e-5;

/// Box vs box via the 15-axis separating-axis test.
///
/// The axis of least overlap gives the normal and depth; face axes win ties.
/// Contact points come from classifying the features each box presents
/// along that normal (vertex, edge or face) and intersecting them.
pub fn obb_obb(a: &Obb, b: &Obb) -> Option<Penetration> {
    let axes_a = a.axes();
    let axes_b = b.axes();
    let d = b.center().sub(&a.center());

    let mut best: Option<(Vec3, f32)> = None;
    let mut probe = |axis: Vec3, bias: f32| -> bool {
        let dist = d.dot(&axis);
        let overlap = a.projected_half_width(axis) + b.projected_half_width(axis) - dist.abs();
        if overlap.is_nan() || overlap <= 0.0 {
            return false;
        }
        if best.is_none_or(|(_, o)| overlap + bias < o) {
            best = Some((axis.scale(sign_nonzero(dist)), overlap));
        }
        true
    };

    for axis in axes_a.iter().chain(axes_b.iter()) {
        if !probe(*axis, 0.0) {
            return None;
        }
    }
    for ea in &axes_a {
        for eb in &axes_b {
            let c = ea.cross(eb);
            let len = c.length();
            if len <= PARALLEL_EPSILON {
                continue;
            }
            if !probe(c.scale(1.0 / len), EDGE_BIAS) {
                return None;
            }
        }
    }

    let (n, depth) = best?;
    let fa = Feature::of(a, &axes_a, n);
    let fb = Feature::of(b, &axes_b, -n);
    let mut patch_radius = 0.0;
    let (point_a, point_b) = match (fa.count, fb.count) {
        (0, _) => (fa.center, fb.closest_point(fa.center)),
        (_, 0) => (fa.closest_point(fb.center), fb.center),
        (1, 1) => {
            let (a0, a1) = fa.segment();
            let (b0, b1) = fb.segment();
            closest_points_segments(a0, a1, b0, b1)
        }
        (1, _) => edge_face(&fa, &fb),
        (_, 1) => {
            let (on_edge, on_face) = edge_face(&fb, &fa);
            (on_face, on_edge)
        }
        _ => {
            let (on_a, on_b, patch) = face_face(&fa, &fb);
            patch_radius = patch;
            (on_a, on_b)
        }
    };
    Some(Penetration { vector: n.scale(depth), point_a, point_b, patch_radius })
}

/// The part of a box facing a direction: a vertex (`count == 0`), an edge
/// (`count == 1`) or a face (`count == 2`), stored as a centre plus the
/// half-edge vectors of its free axes.
#[derive(Debug, Copy, Clone)]
struct Feature {
    center: Vec3,
    dirs: [Vec3; 2],
    count: usize,
}

impl Feature {
    fn of(obb: &Obb, axes: &[Vec3; 3], toward: Vec3) -> Self {
        let he = obb.half_extents();
        let mut center = obb.center();
        let mut dirs = [Vec3::ZERO; 2];
        let mut count = 0;
        for (i, axis) in axes.iter().enumerate() {
            let half = axis.scale(he[i]);
            let s = sign_epsilon(axis.dot(&toward), FEATURE_EPSILON);
            if s == 0.0 && count < 2 {
                dirs[count] = half;
                count += 1;
            } else {
                center = center.add(&half.scale(sign_nonzero(s)));
            }
        }
        Self { center, dirs, count }
    }

    fn segment(&self) -> (Vec3, Vec3) {
        (self.center.add(&self.dirs[0]), self.center.sub(&self.dirs[0]))
    }

    fn rect(&self) -> Rect {
        Rect { center: self.center, u: self.dirs[0], v: self.dirs[1] }
    }

    fn plane_normal(&self) -> Vec3 {
        self.dirs[0].cross(&self.dirs[1]).normalize()
    }

    /// Closest point on the feature to `p`.
    fn closest_point(&self, p: Vec3) -> Vec3 {
        let rel = p.sub(&self.center);
        let mut out = self.center;
        for dir in &self.dirs[..self.count] {
            let len2 = dir.length_squared();
            if len2 > 0.0 {
                let t = (rel.dot(dir) / len2).clamp(-1.0, 1.0);
                out = out.add(&dir.scale(t));
            }
        }
        out
    }
}

/// Clips the edge to the face rectangle and pairs the clipped midpoint with
/// its projection on the face. Returns `(on_edge, on_face)`.
fn edge_face(edge: &Feature, face: &Feature) -> (Vec3, Vec3) {
    let (e0, e1) = edge.segment();
    let mid = match face.rect().clip_segment(e0, e1) {
        Some((c0, c1)) => c0.lerp(&c1, 0.5),
        None => e0.lerp(&e1, 0.5),
    };
    (mid, face.closest_point(mid))
}

/// Averages the overlap region of two nearly parallel faces: corners of
/// each face inside the other plus edge/edge crossings, all measured in A's
/// plane. Returns `(on_a, on_b, patch_radius)`, where the radius is the
/// smaller half-extent of the region along A's face axes.
fn face_face(fa: &Feature, fb: &Feature) -> (Vec3, Vec3, f32) {
    let ra = fa.rect();
    let rb = fb.rect();
    let na = fa.plane_normal();
    let nb = fb.plane_normal();
    let qa = ra.corners();
    let qb = rb.corners().map(|c| project_point_to_plane(c, na, ra.center));

    let mut region = Vec::with_capacity(24);
    region.extend(qa.iter().copied().filter(|c| point_in_quad(*c, &qb, na)));
    region.extend(qb.iter().copied().filter(|c| point_in_quad(*c, &qa, na)));
    for i in 0..4 {
        for j in 0..4 {
            if let Some(p) = segment_intersection_in_plane(qa[i], qa[(i + 1) % 4], qb[j], qb[(j + 1) % 4], na) {
                region.push(p);
            }
        }
    }

    let (centroid, patch_radius) = if region.is_empty() {
        (project_point_to_plane(rb.center, na, ra.center).lerp(&ra.center, 0.5), 0.0)
    } else {
        let mut sum = Vec3::ZERO;
        let mut count = 0.0_f32;
        for p in &region {
            sum = sum.add(p);
            count += 1.0;
        }
        let centroid = sum.scale(1.0 / count);
        let extent = |dir: Vec3| {
            let dir = dir.normalize();
            region.iter().map(|p| p.sub(&centroid).dot(&dir).abs()).fold(0.0_f32, f32::max)
        };
        (centroid, extent(ra.u).min(extent(ra.v)))
    };
    (
        project_point_to_plane(centroid, na, ra.center),
        project_point_to_plane(centroid, nb, rb.center),
        patch_radius,
    )
}
