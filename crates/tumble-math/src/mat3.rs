// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use crate::Vec3;

/// Column-major 3×3 matrix used for rotations and inertia tensors.
///
/// Columns of a rotation matrix are the rotated basis vectors, so
/// `col(0)`, `col(1)`, `col(2)` are a body's local X/Y/Z axes in world space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3 {
    cols: [Vec3; 3],
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mat3 {
    /// Identity matrix.
    pub const fn identity() -> Self {
        Self { cols: [Vec3::UNIT_X, Vec3::UNIT_Y, Vec3::UNIT_Z] }
    }

    /// Builds a matrix from its three columns.
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    /// Builds a diagonal matrix.
    pub fn from_diagonal(d: Vec3) -> Self {
        Self::from_cols(
            Vec3::new(d.x(), 0.0, 0.0),
            Vec3::new(0.0, d.y(), 0.0),
            Vec3::new(0.0, 0.0, d.z()),
        )
    }

    /// Returns column `idx` (`0..3`).
    pub fn col(&self, idx: usize) -> Vec3 {
        self.cols[idx]
    }

    /// Returns row `idx` (`0..3`).
    pub fn row(&self, idx: usize) -> Vec3 {
        Vec3::new(self.cols[0][idx], self.cols[1][idx], self.cols[2][idx])
    }

    /// Matrix–vector product.
    pub fn mul_vec(&self, v: Vec3) -> Vec3 {
        self.cols[0]
            .scale(v.x())
            .add(&self.cols[1].scale(v.y()))
            .add(&self.cols[2].scale(v.z()))
    }

    /// Matrix–matrix product (`self * other`).
    pub fn mul_mat(&self, other: &Self) -> Self {
        Self::from_cols(
            self.mul_vec(other.cols[0]),
            self.mul_vec(other.cols[1]),
            self.mul_vec(other.cols[2]),
        )
    }

    /// Transpose; the inverse for pure rotations.
    pub fn transpose(&self) -> Self {
        Self::from_cols(self.row(0), self.row(1), self.row(2))
    }

    /// Main diagonal.
    pub fn diagonal(&self) -> Vec3 {
        Vec3::new(self.cols[0].x(), self.cols[1].y(), self.cols[2].z())
    }

    /// Diagonal of `R · diag(d) · Rᵀ` for this rotation `R`.
    ///
    /// Rotating a local-axes diagonal tensor into world axes produces a full
    /// symmetric matrix; the engine keeps only its diagonal
    /// (`Σₖ R_ik² d_k`), which is exact for axis-aligned bodies and a
    /// bounded approximation otherwise.
    pub fn rotated_diagonal(&self, d: Vec3) -> Vec3 {
        let r0 = self.row(0);
        let r1 = self.row(1);
        let r2 = self.row(2);
        Vec3::new(
            r0.mul_elem(&r0).dot(&d),
            r1.mul_elem(&r1).dot(&d),
            r2.mul_elem(&r2).dot(&d),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Quat;
    use core::f32::consts::FRAC_PI_2;

    #[test]
    fn transpose_inverts_rotation() {
        let r = Quat::from_axis_angle(Vec3::new(0.3, 1.0, -0.2), 1.1).to_mat3();
        let i = r.mul_mat(&r.transpose());
        for c in 0..3 {
            let e = Mat3::identity().col(c);
            assert!(i.col(c).sub(&e).length() < 1e-5);
        }
    }

    #[test]
    fn rotated_diagonal_permutes_for_quarter_turn() {
        let r = Quat::from_axis_angle(Vec3::UNIT_Z, FRAC_PI_2).to_mat3();
        let d = r.rotated_diagonal(Vec3::new(1.0, 2.0, 3.0));
        assert!(d.sub(&Vec3::new(2.0, 1.0, 3.0)).length() < 1e-5);
    }
}
