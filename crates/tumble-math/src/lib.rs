// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Float32 math for the Tumble rigid-body engine.

This crate provides:
- `Vec3` for points, directions, velocities and impulses.
- `Quat` for orientations and `Mat3` for rotation/inertia algebra.
- Scalar helpers shared by the geometry and solver crates (`EPSILON`,
  `clamp`, `sign_epsilon`, `sign_nonzero`).
- `Prng`, a seeded xoroshiro128+ generator for reproducible scenes.

All arithmetic is `f32`. Degenerate inputs (zero-length normalisation,
zero-length rotation axes) resolve to documented fallbacks instead of NaN.
"]

use std::f32::consts::TAU;

mod mat3;
mod prng;
mod quat;
mod vec3;

pub use mat3::Mat3;
pub use prng::Prng;
pub use quat::Quat;
pub use vec3::Vec3;

/// Global epsilon used by math routines when detecting degenerate values.
pub const EPSILON: f32 = 1e-6;

/// Clamps `value` to the inclusive `[min, max]` range.
///
/// When `min > max` the bounds are applied in order (`max` wins), matching
/// `f32::max(..).min(..)` semantics instead of panicking mid-step.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    debug_assert!(min <= max, "invalid clamp range: {min} > {max}");
    value.max(min).min(max)
}

/// Converts degrees to radians with float32 precision.
pub fn deg_to_rad(value: f32) -> f32 {
    value * (TAU / 360.0)
}

/// Converts radians to degrees with float32 precision.
pub fn rad_to_deg(value: f32) -> f32 {
    value * (360.0 / TAU)
}

/// Maps `value` to `-1.0`, `0.0` or `1.0` with a dead band of `±eps`.
///
/// Used to classify a box axis against a contact direction: `0.0` means the
/// axis is perpendicular (within tolerance), otherwise the sign tells which
/// face of the box faces the direction.
pub fn sign_epsilon(value: f32, eps: f32) -> f32 {
    if value > eps {
        1.0
    } else if value < -eps {
        -1.0
    } else {
        0.0
    }
}

/// Returns `1.0` for `value >= 0.0` and `-1.0` otherwise.
///
/// Unlike [`f32::signum`], zero (including `-0.0`) maps to `1.0`, so the
/// result can always orient an axis.
pub fn sign_nonzero(value: f32) -> f32 {
    if value >= 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// Returns `true` when `a` and `b` differ by at most `tol`.
pub fn approx_eq(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
}
