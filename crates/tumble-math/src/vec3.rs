// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::ops;

use crate::EPSILON;

/// 3D vector used for positions, directions, velocities and impulses.
///
/// * Components encode world-space metres (or metres per second, or
///   kilogram-metres per second) depending on the calling context.
/// * Arithmetic uses `f32`; both named methods (`add`, `scale`, ...) and the
///   standard operators are provided and produce identical results.
/// * `Index<usize>` exposes components `0..3` for axis-generic loops.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f32; 3]", into = "[f32; 3]"))]
pub struct Vec3 {
    data: [f32; 3],
}

impl Vec3 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Vector with every component set to one.
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

    /// +X.
    pub const UNIT_X: Self = Self::new(1.0, 0.0, 0.0);

    /// +Y (up).
    pub const UNIT_Y: Self = Self::new(0.0, 1.0, 0.0);

    /// +Z.
    pub const UNIT_Z: Self = Self::new(0.0, 0.0, 1.0);

    /// Builds a vector from `x`, `y`, `z`.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { data: [x, y, z] }
    }

    /// Creates a vector with all components equal to `v`.
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v, v)
    }

    /// `[x, y, z]`.
    pub fn to_array(self) -> [f32; 3] {
        self.data
    }

    /// X component.
    pub fn x(&self) -> f32 {
        self.data[0]
    }

    /// Y component.
    pub fn y(&self) -> f32 {
        self.data[1]
    }

    /// Z component.
    pub fn z(&self) -> f32 {
        self.data[2]
    }

    /// Adds two vectors.
    pub fn add(&self, other: &Self) -> Self {
        Self::new(
            self.data[0] + other.data[0],
            self.data[1] + other.data[1],
            self.data[2] + other.data[2],
        )
    }

    /// `self - other`.
    pub fn sub(&self, other: &Self) -> Self {
        Self::new(
            self.data[0] - other.data[0],
            self.data[1] - other.data[1],
            self.data[2] - other.data[2],
        )
    }

    /// Component-wise multiply by `scalar`.
    pub fn scale(&self, scalar: f32) -> Self {
        Self::new(self.data[0] * scalar, self.data[1] * scalar, self.data[2] * scalar)
    }

    /// Component-wise product (diagonal matrix times vector).
    pub fn mul_elem(&self, other: &Self) -> Self {
        Self::new(
            self.data[0] * other.data[0],
            self.data[1] * other.data[1],
            self.data[2] * other.data[2],
        )
    }

    /// Inner product.
    pub fn dot(&self, other: &Self) -> f32 {
        self.data[0] * other.data[0] + self.data[1] * other.data[1] + self.data[2] * other.data[2]
    }

    /// Right-handed cross product `self × other`.
    pub fn cross(&self, other: &Self) -> Self {
        let [ax, ay, az] = self.data;
        let [bx, by, bz] = other.data;
        Self::new(ay * bz - az * by, az * bx - ax * bz, ax * by - ay * bx)
    }

    /// Euclidean length.
    pub fn length(&self) -> f32 {
        self.dot(self).sqrt()
    }

    /// `|v|²`, without the square root.
    pub fn length_squared(&self) -> f32 {
        self.dot(self)
    }

    /// Distance between two points.
    pub fn distance(&self, other: &Self) -> f32 {
        self.sub(other).length()
    }

    /// Unit vector in the same direction, or zero when the length is at most `EPSILON`.
    ///
    /// `EPSILON` is a degeneracy threshold (not numeric precision): vectors
    /// with length ≤ `EPSILON` normalise to zero so callers can detect them
    /// with [`Vec3::is_zero`] and take their own fallback.
    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len <= EPSILON {
            return Self::ZERO;
        }
        self.scale(1.0 / len)
    }

    /// Normalises the vector or returns `None` when it is degenerate.
    pub fn try_normalize(&self) -> Option<Self> {
        let len = self.length();
        if len <= EPSILON || !len.is_finite() {
            return None;
        }
        Some(self.scale(1.0 / len))
    }

    /// Returns `true` when every component is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.data == [0.0; 3]
    }

    /// Returns `true` when every component is finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|c| c.is_finite())
    }

    /// Component-wise absolute value.
    pub fn abs(&self) -> Self {
        Self::new(self.data[0].abs(), self.data[1].abs(), self.data[2].abs())
    }

    /// Component-wise minimum.
    pub fn min(&self, other: &Self) -> Self {
        Self::new(
            self.data[0].min(other.data[0]),
            self.data[1].min(other.data[1]),
            self.data[2].min(other.data[2]),
        )
    }

    /// Component-wise maximum.
    pub fn max(&self, other: &Self) -> Self {
        Self::new(
            self.data[0].max(other.data[0]),
            self.data[1].max(other.data[1]),
            self.data[2].max(other.data[2]),
        )
    }

    /// Smallest component.
    pub fn min_element(&self) -> f32 {
        self.data[0].min(self.data[1]).min(self.data[2])
    }

    /// Component of `self` along the unit vector `axis`.
    pub fn project_on(&self, axis: &Self) -> Self {
        axis.scale(self.dot(axis))
    }

    /// Removes the component along the unit vector `normal`.
    pub fn reject_from(&self, normal: &Self) -> Self {
        self.sub(&self.project_on(normal))
    }

    /// Linear interpolation from `self` (t = 0) to `other` (t = 1).
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        self.add(&other.sub(self).scale(t))
    }

    /// Builds two unit vectors that complete `self` (assumed unit length)
    /// into a right-handed orthonormal basis `(self, t, b)`.
    ///
    /// Branch-free construction (Duff et al. 2017); stable for every unit
    /// input including the poles.
    pub fn orthonormal_basis(&self) -> (Self, Self) {
        let [x, y, z] = self.data;
        let sign = if z >= 0.0 { 1.0 } else { -1.0 };
        let a = -1.0 / (sign + z);
        let b = x * y * a;
        let t = Self::new(1.0 + sign * x * x * a, sign * b, -sign * x);
        let bt = Self::new(b, sign + y * y * a, -y);
        (t, bt)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(value: [f32; 3]) -> Self {
        Self { data: value }
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(value: Vec3) -> Self {
        value.data
    }
}

impl ops::Index<usize> for Vec3 {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.data[index]
    }
}

impl ops::Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::add(&self, &rhs)
    }
}

impl ops::AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = Self::add(self, &rhs);
    }
}

impl ops::Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::sub(&self, &rhs)
    }
}

impl ops::SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Self::sub(self, &rhs);
    }
}

impl ops::Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl ops::Mul<Vec3> for f32 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        rhs.scale(self)
    }
}

impl ops::MulAssign<f32> for Vec3 {
    fn mul_assign(&mut self, rhs: f32) {
        *self = self.scale(rhs);
    }
}

impl ops::Div<f32> for Vec3 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self {
        self.scale(1.0 / rhs)
    }
}

impl ops::Neg for Vec3 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.data[0], -self.data[1], -self.data[2])
    }
}
