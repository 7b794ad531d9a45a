// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::{Mat3, Vec3, EPSILON};

/// Quaternion stored as `(x, y, z, w)`.
///
/// Angles are radians throughout.
/// * Orientation quaternions are expected to be unit length; [`Quat::rotate`]
///   and [`Quat::to_mat3`] normalise defensively so a drifting input never
///   scales geometry.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "[f32; 4]", into = "[f32; 4]"))]
pub struct Quat {
    data: [f32; 4],
}

impl Default for Quat {
    fn default() -> Self {
        Self::identity()
    }
}

impl Quat {
    /// Builds a quaternion from `x`, `y`, `z`, `w`.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { data: [x, y, z, w] }
    }

    /// No rotation.
    pub const fn identity() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// `[x, y, z, w]`.
    pub fn to_array(self) -> [f32; 4] {
        self.data
    }

    /// Rotation of `angle` radians about `axis` (normalised here).
    ///
    /// Returns the identity quaternion when the axis length is ≤ `EPSILON`.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let Some(n) = axis.try_normalize() else {
            return Self::identity();
        };
        let (sin_half, cos_half) = (angle * 0.5).sin_cos();
        let s = n.scale(sin_half);
        Self::new(s.x(), s.y(), s.z(), cos_half)
    }

    /// Hamilton product (`self * other`): applies `other` first, then `self`
    /// when used to rotate vectors.
    pub fn multiply(&self, other: &Self) -> Self {
        let [ax, ay, az, aw] = self.data;
        let [bx, by, bz, bw] = other.data;
        Self::new(
            aw * bx + ax * bw + ay * bz - az * by,
            aw * by - ax * bz + ay * bw + az * bx,
            aw * bz + ax * by - ay * bx + az * bw,
            aw * bw - ax * bx - ay * by - az * bz,
        )
    }

    /// Unit-length copy; identity when the norm is near zero.
    pub fn normalize(&self) -> Self {
        let [x, y, z, w] = self.data;
        let len = (x * x + y * y + z * z + w * w).sqrt();
        if len <= EPSILON || !len.is_finite() {
            return Self::identity();
        }
        let inv = 1.0 / len;
        Self::new(x * inv, y * inv, z * inv, w * inv)
    }

    /// Conjugate; the inverse rotation for unit quaternions.
    pub fn conjugate(&self) -> Self {
        let [x, y, z, w] = self.data;
        Self::new(-x, -y, -z, w)
    }

    /// Rotates a vector by this orientation.
    pub fn rotate(&self, v: Vec3) -> Vec3 {
        // v' = v + 2w(q × v) + 2 q × (q × v)
        let q = self.normalize();
        let [x, y, z, w] = q.data;
        let u = Vec3::new(x, y, z);
        let t = u.cross(&v).scale(2.0);
        v.add(&t.scale(w)).add(&u.cross(&t))
    }

    /// Rotates a vector by the inverse of this orientation (world → local).
    pub fn inverse_rotate(&self, v: Vec3) -> Vec3 {
        self.conjugate().rotate(v)
    }

    /// Converts the quaternion to a rotation matrix whose columns are the
    /// rotated basis vectors.
    pub fn to_mat3(&self) -> Mat3 {
        let q = self.normalize();
        let [x, y, z, w] = q.data;

        let xx = x * x;
        let yy = y * y;
        let zz = z * z;
        let xy = x * y;
        let xz = x * z;
        let yz = y * z;
        let wx = w * x;
        let wy = w * y;
        let wz = w * z;

        Mat3::from_cols(
            Vec3::new(1.0 - 2.0 * (yy + zz), 2.0 * (xy + wz), 2.0 * (xz - wy)),
            Vec3::new(2.0 * (xy - wz), 1.0 - 2.0 * (xx + zz), 2.0 * (yz + wx)),
            Vec3::new(2.0 * (xz + wy), 2.0 * (yz - wx), 1.0 - 2.0 * (xx + yy)),
        )
    }

    /// Advances the orientation by angular velocity `omega` (rad/s, world
    /// axes) over `dt` seconds and renormalises.
    ///
    /// First-order update `q' = q + ½ dt (ω, 0) q`.
    pub fn integrate(&self, omega: Vec3, dt: f32) -> Self {
        let spin = Self::new(omega.x(), omega.y(), omega.z(), 0.0).multiply(self);
        let h = 0.5 * dt;
        let [x, y, z, w] = self.data;
        let [sx, sy, sz, sw] = spin.data;
        Self::new(x + sx * h, y + sy * h, z + sz * h, w + sw * h).normalize()
    }
}

impl From<[f32; 4]> for Quat {
    fn from(value: [f32; 4]) -> Self {
        Self { data: value }
    }
}

impl From<Quat> for [f32; 4] {
    fn from(value: Quat) -> Self {
        value.data
    }
}
