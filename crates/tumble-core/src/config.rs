// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! World tuning parameters.

use tumble_math::Vec3;

use crate::contact::MAX_HISTORY;
use crate::error::ConfigError;

/// Global solver and pipeline settings for a [`World`](crate::World).
///
/// Build one with [`WorldConfig::default`] and adjust it with the `with_*`
/// setters. [`World::new`](crate::World::new) rejects a config that fails
/// [`validate`](Self::validate).
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(default))]
pub struct WorldConfig {
    /// Acceleration applied to awake dynamic bodies each step.
    pub gravity: Vec3,
    /// Fixed number of solver passes per step.
    pub solver_iterations: u32,
    /// Penetration depth (m) tolerated before positional correction kicks in.
    pub slop: f32,
    /// Closing speed (m/s) below which restitution is ignored.
    pub restitution_threshold: f32,
    /// Scale applied to the averaged impulse history when warm starting.
    pub warm_start_factor: f32,
    /// Number of past steps averaged for warm starting.
    pub history_len: usize,
    /// Linear velocity change below which a contact counts as converged.
    pub linear_epsilon: f32,
    /// Angular velocity change below which a contact counts as converged.
    pub angular_epsilon: f32,
    /// Radius (m) of the contact patch used for torsional friction.
    pub spin_radius: f32,
    /// Minimum shape-pair count before the narrow phase runs in parallel.
    pub parallel_threshold: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            solver_iterations: 6,
            slop: 0.01,
            restitution_threshold: 0.5,
            warm_start_factor: 0.85,
            history_len: 4,
            linear_epsilon: 1e-4,
            angular_epsilon: 1e-4,
            spin_radius: 0.05,
            parallel_threshold: 64,
        }
    }
}

impl WorldConfig {
    /// Sets the gravity vector.
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    /// Sets the solver iteration count.
    pub fn with_solver_iterations(mut self, iterations: u32) -> Self {
        self.solver_iterations = iterations;
        self
    }

    /// Sets the penetration slop.
    pub fn with_slop(mut self, slop: f32) -> Self {
        self.slop = slop;
        self
    }

    /// Sets the restitution threshold.
    pub fn with_restitution_threshold(mut self, threshold: f32) -> Self {
        self.restitution_threshold = threshold;
        self
    }

    /// Sets the warm-start factor.
    pub fn with_warm_start_factor(mut self, factor: f32) -> Self {
        self.warm_start_factor = factor;
        self
    }

    /// Sets the impulse history length.
    pub fn with_history_len(mut self, len: usize) -> Self {
        self.history_len = len;
        self
    }

    /// Sets both convergence thresholds.
    pub fn with_epsilons(mut self, linear: f32, angular: f32) -> Self {
        self.linear_epsilon = linear;
        self.angular_epsilon = angular;
        self
    }

    /// Sets the torsional friction radius.
    pub fn with_spin_radius(mut self, radius: f32) -> Self {
        self.spin_radius = radius;
        self
    }

    /// Sets the parallel narrow-phase threshold.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    /// Returns the [`ConfigError`] for the first field found out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFinite("gravity"));
        }
        if self.solver_iterations == 0 {
            return Err(ConfigError::NonPositiveIterations);
        }
        let scalars = [
            ("slop", self.slop),
            ("restitution_threshold", self.restitution_threshold),
            ("warm_start_factor", self.warm_start_factor),
            ("linear_epsilon", self.linear_epsilon),
            ("angular_epsilon", self.angular_epsilon),
            ("spin_radius", self.spin_radius),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite(name));
            }
        }
        if self.slop < 0.0 {
            return Err(ConfigError::NegativeSlop(self.slop));
        }
        if !(0.0..=1.0).contains(&self.warm_start_factor) {
            return Err(ConfigError::InvalidWarmStartFactor(self.warm_start_factor));
        }
        for (name, value) in [
            ("restitution_threshold", self.restitution_threshold),
            ("linear_epsilon", self.linear_epsilon),
            ("angular_epsilon", self.angular_epsilon),
            ("spin_radius", self.spin_radius),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Negative(name));
            }
        }
        if self.history_len == 0 {
            return Err(ConfigError::ZeroHistory);
        }
        if self.history_len > MAX_HISTORY {
            return Err(ConfigError::HistoryTooLong(self.history_len));
        }
        Ok(())
    }
}
