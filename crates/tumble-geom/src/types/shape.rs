// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use tumble_math::{clamp, Quat, Vec3};

use super::aabb::Aabb;

/// Oriented bounding box.
///
/// `size` holds full edge lengths along the box's local X/Y/Z axes; it is
/// stored as absolute values so a negative input never flips the box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Obb {
    center: Vec3,
    rotation: Quat,
    size: Vec3,
}

impl Obb {
    /// Creates a box; `size` is normalised with `abs` and `rotation` to unit
    /// length.
    pub fn new(center: Vec3, rotation: Quat, size: Vec3) -> Self {
        Self { center, rotation: rotation.normalize(), size: size.abs() }
    }

    /// World-space centre.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Orientation.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Full edge lengths.
    pub fn size(&self) -> Vec3 {
        self.size
    }

    /// Half edge lengths.
    pub fn half_extents(&self) -> Vec3 {
        self.size.scale(0.5)
    }

    /// Moves the box.
    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Re-orients the box.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    /// Resizes the box (absolute values are taken).
    pub fn set_size(&mut self, size: Vec3) {
        self.size = size.abs();
    }

    /// Unit world-space axes (local X, Y, Z).
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation.rotate(Vec3::UNIT_X),
            self.rotation.rotate(Vec3::UNIT_Y),
            self.rotation.rotate(Vec3::UNIT_Z),
        ]
    }

    /// Half-width of the box projected on `dir` (`dir` need not be unit;
    /// the result scales with its length).
    pub fn projected_half_width(&self, dir: Vec3) -> f32 {
        let he = self.half_extents();
        self.axes()
            .iter()
            .enumerate()
            .map(|(i, axis)| axis.dot(&dir).abs() * he[i])
            .sum()
    }

    /// Maps a world point into box-local coordinates.
    pub fn to_local(&self, p: Vec3) -> Vec3 {
        self.rotation.inverse_rotate(p.sub(&self.center))
    }

    /// Maps a box-local point into world space.
    pub fn to_world(&self, local: Vec3) -> Vec3 {
        self.center.add(&self.rotation.rotate(local))
    }

    /// Closest point on or inside the box to `p`.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        let local = self.to_local(p);
        let he = self.half_extents();
        self.to_world(Vec3::new(
            clamp(local.x(), -he.x(), he.x()),
            clamp(local.y(), -he.y(), he.y()),
            clamp(local.z(), -he.z(), he.z()),
        ))
    }

    /// The eight corners; bit `k` of the index selects `+` on local axis `k`.
    pub fn vertices(&self) -> [Vec3; 8] {
        let he = self.half_extents();
        core::array::from_fn(|i| {
            let pick = |bit: usize, h: f32| if i & (1 << bit) == 0 { -h } else { h };
            self.to_world(Vec3::new(pick(0, he.x()), pick(1, he.y()), pick(2, he.z())))
        })
    }

    /// World-space bounds.
    pub fn aabb(&self) -> Aabb {
        let he = self.half_extents();
        let r = self.rotation.to_mat3();
        let extent = Vec3::new(
            r.row(0).abs().dot(&he),
            r.row(1).abs().dot(&he),
            r.row(2).abs().dot(&he),
        );
        Aabb::from_center_half_extents(self.center, extent)
    }
}

/// Sphere.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    /// Creates a sphere; the radius is stored as an absolute value.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius: radius.abs() }
    }

    /// World-space centre.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Moves the sphere.
    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Changes the radius (absolute value is taken).
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.abs();
    }

    /// World-space bounds.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, Vec3::splat(self.radius))
    }
}

/// Capsule: a segment along the local Y axis swept by `radius`.
///
/// `height` is the distance between the two cap centres, so the total
/// length tip to tip is `height + 2 * radius`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Capsule {
    center: Vec3,
    rotation: Quat,
    radius: f32,
    height: f32,
}

impl Capsule {
    /// Creates a capsule; radius and height are stored as absolute values.
    pub fn new(center: Vec3, rotation: Quat, radius: f32, height: f32) -> Self {
        Self {
            center,
            rotation: rotation.normalize(),
            radius: radius.abs(),
            height: height.abs(),
        }
    }

    /// World-space centre.
    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// Orientation.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Distance between the cap centres.
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Moves the capsule.
    pub fn set_center(&mut self, center: Vec3) {
        self.center = center;
    }

    /// Re-orients the capsule.
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    /// Changes the radius (absolute value is taken).
    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.abs();
    }

    /// Changes the cap-centre distance (absolute value is taken).
    pub fn set_height(&mut self, height: f32) {
        self.height = height.abs();
    }

    /// Unit axis (local +Y in world space).
    pub fn axis(&self) -> Vec3 {
        self.rotation.rotate(Vec3::UNIT_Y)
    }

    /// Cap centres `(bottom, top)`.
    pub fn segment(&self) -> (Vec3, Vec3) {
        let half = self.axis().scale(self.height * 0.5);
        (self.center.sub(&half), self.center.add(&half))
    }

    /// Half-width of the capsule projected on the unit direction `dir`.
    pub fn projected_half_width(&self, dir: Vec3) -> f32 {
        self.axis().dot(&dir).abs() * self.height * 0.5 + self.radius
    }

    /// World-space bounds.
    pub fn aabb(&self) -> Aabb {
        let (p0, p1) = self.segment();
        Aabb::new(p0, p1).inflate(self.radius)
    }
}

/// Discriminant of [`Shape`], used to index the narrow-phase pair table.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    /// Oriented box.
    Obb = 0,
    /// Sphere.
    Sphere = 1,
    /// Capsule.
    Capsule = 2,
}

/// Closed union of every collision shape.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Shape {
    /// Oriented box.
    Obb(Obb),
    /// Sphere.
    Sphere(Sphere),
    /// Capsule.
    Capsule(Capsule),
}

impl Shape {
    /// The shape's discriminant.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Obb(_) => ShapeKind::Obb,
            Self::Sphere(_) => ShapeKind::Sphere,
            Self::Capsule(_) => ShapeKind::Capsule,
        }
    }

    /// Geometric centre.
    pub fn center(&self) -> Vec3 {
        match self {
            Self::Obb(s) => s.center(),
            Self::Sphere(s) => s.center(),
            Self::Capsule(s) => s.center(),
        }
    }

    /// World-space bounds.
    pub fn aabb(&self) -> Aabb {
        match self {
            Self::Obb(s) => s.aabb(),
            Self::Sphere(s) => s.aabb(),
            Self::Capsule(s) => s.aabb(),
        }
    }
}

impl From<Obb> for Shape {
    fn from(value: Obb) -> Self {
        Self::Obb(value)
    }
}

impl From<Sphere> for Shape {
    fn from(value: Sphere) -> Self {
        Self::Sphere(value)
    }
}

impl From<Capsule> for Shape {
    fn from(value: Capsule) -> Self {
        Self::Capsule(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_4;

    #[test]
    fn negative_sizes_are_normalised() {
        let b = Obb::new(Vec3::ZERO, Quat::identity(), Vec3::new(-2.0, 1.0, -4.0));
        assert_eq!(b.size().to_array(), [2.0, 1.0, 4.0]);
        let s = Sphere::new(Vec3::ZERO, -0.5);
        assert_eq!(s.radius(), 0.5);
        let mut c = Capsule::new(Vec3::ZERO, Quat::identity(), 0.25, 1.0);
        c.set_height(-3.0);
        assert_eq!(c.height(), 3.0);
    }

    #[test]
    fn rotated_box_aabb_covers_vertices() {
        let b = Obb::new(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_axis_angle(Vec3::new(0.0, 1.0, 1.0), FRAC_PI_4),
            Vec3::new(1.0, 2.0, 0.5),
        );
        let bb = b.aabb().inflate(1e-5);
        for v in b.vertices() {
            assert!(bb.contains_point(v), "{v:?} outside {bb:?}");
        }
    }

    #[test]
    fn capsule_segment_spans_height() {
        let c = Capsule::new(Vec3::ZERO, Quat::identity(), 0.5, 2.0);
        let (p0, p1) = c.segment();
        assert_eq!(p0.to_array(), [0.0, -1.0, 0.0]);
        assert_eq!(p1.to_array(), [0.0, 1.0, 0.0]);
        let bb = c.aabb();
        assert_eq!(bb.min().to_array(), [-0.5, -1.5, -0.5]);
        assert_eq!(bb.max().to_array(), [0.5, 1.5, 0.5]);
    }

    #[test]
    fn projected_half_width_of_axis_aligned_box() {
        let b = Obb::new(Vec3::ZERO, Quat::identity(), Vec3::new(2.0, 4.0, 6.0));
        assert!((b.projected_half_width(Vec3::UNIT_Y) - 2.0).abs() < 1e-6);
        assert!((b.projected_half_width(Vec3::new(1.0, 0.0, 1.0).normalize())
            - 4.0 * core::f32::consts::FRAC_1_SQRT_2)
            .abs()
            < 1e-5);
    }
}
