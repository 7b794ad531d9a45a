// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use tumble_math::Vec3;

/// Axis-aligned bounding box in world coordinates.
///
/// Invariants:
/// - For a valid box, `min` components are less than or equal to `max`
///   components.
/// - [`Aabb::empty`] is the accumulator identity: it is invalid, overlaps
///   nothing, and becomes valid on the first `encapsulate_*` call.
/// - Values are `f32` and represent meters in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
    valid: bool,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    /// Constructs an AABB from two opposite corners.
    ///
    /// Corners are reordered per axis, so `new(max, min)` equals
    /// `new(min, max)`.
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self { min: a.min(&b), max: a.max(&b), valid: true }
    }

    /// Returns the empty accumulator.
    pub const fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::MAX),
            max: Vec3::splat(f32::MIN),
            valid: false,
        }
    }

    /// Returns `true` once the box bounds at least one point.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the minimum corner.
    pub fn min(&self) -> Vec3 {
        self.min
    }

    /// Returns the maximum corner.
    pub fn max(&self) -> Vec3 {
        self.max
    }

    /// Builds an AABB centered at `center` with the given half-extents.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let he = half_extents.abs();
        Self::new(center.sub(&he), center.add(&he))
    }

    /// Builds an AABB centered at `center` with full edge lengths `size`.
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self::from_center_half_extents(center, size.scale(0.5))
    }

    /// Builds the minimal AABB that contains all `points`; empty input
    /// yields [`Aabb::empty`].
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut out = Self::empty();
        for p in points {
            out.encapsulate_point(*p);
        }
        out
    }

    /// Centre of the box (zero when empty).
    pub fn center(&self) -> Vec3 {
        if !self.valid {
            return Vec3::ZERO;
        }
        self.min.add(&self.max).scale(0.5)
    }

    /// Full edge lengths (zero when empty).
    pub fn size(&self) -> Vec3 {
        if !self.valid {
            return Vec3::ZERO;
        }
        self.max.sub(&self.min)
    }

    /// Half edge lengths (zero when empty).
    pub fn extents(&self) -> Vec3 {
        self.size().scale(0.5)
    }

    /// Grows the box to contain `p`.
    pub fn encapsulate_point(&mut self, p: Vec3) {
        if self.valid {
            self.min = self.min.min(&p);
            self.max = self.max.max(&p);
        } else {
            *self = Self { min: p, max: p, valid: true };
        }
    }

    /// Grows the box to contain `other`; an empty `other` is a no-op.
    pub fn encapsulate(&mut self, other: &Self) {
        if !other.valid {
            return;
        }
        if self.valid {
            self.min = self.min.min(&other.min);
            self.max = self.max.max(&other.max);
        } else {
            *self = *other;
        }
    }

    /// Returns the union of two AABBs.
    pub fn union(&self, other: &Self) -> Self {
        let mut out = *self;
        out.encapsulate(other);
        out
    }

    /// Returns `true` if this AABB overlaps another (inclusive on faces).
    ///
    /// Symmetric; an empty box overlaps nothing, and NaN bounds never
    /// overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        if !(self.valid && other.valid) {
            return false;
        }
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }

    /// Returns `true` if `p` lies inside or on the box.
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.valid && (0..3).all(|i| self.min[i] <= p[i] && p[i] <= self.max[i])
    }

    /// Inflates the box by a uniform margin `m` in all directions.
    pub fn inflate(&self, m: f32) -> Self {
        if !self.valid {
            return *self;
        }
        let delta = Vec3::splat(m);
        Self::new(self.min.sub(&delta), self.max.add(&delta))
    }
}
