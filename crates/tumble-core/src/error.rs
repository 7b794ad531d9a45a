// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Error types returned by the world and its configuration.

use thiserror::Error;

use crate::handle::{BodyHandle, ColliderHandle};

/// Errors emitted by [`World`](crate::World) registry and step operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorldError {
    /// The handle names no live or queued body.
    #[error("unknown body: {0}")]
    UnknownBody(BodyHandle),
    /// The handle names no live or queued collider.
    #[error("unknown collider: {0}")]
    UnknownCollider(ColliderHandle),
    /// The step length was zero, negative or not finite.
    #[error("invalid timestep: {0}")]
    InvalidTimestep(f32),
    /// The supplied configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Errors produced by [`WorldConfig::validate`](crate::WorldConfig::validate).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// `solver_iterations` was zero.
    #[error("solver_iterations must be at least 1")]
    NonPositiveIterations,
    /// `slop` was below zero.
    #[error("slop must not be negative: {0}")]
    NegativeSlop(f32),
    /// `warm_start_factor` was outside `[0, 1]`.
    #[error("warm_start_factor must lie in [0, 1]: {0}")]
    InvalidWarmStartFactor(f32),
    /// A float field was NaN or infinite.
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    /// A threshold or radius that must be `>= 0` was negative.
    #[error("{0} must not be negative")]
    Negative(&'static str),
    /// `history_len` was zero.
    #[error("history_len must be at least 1")]
    ZeroHistory,
    /// `history_len` exceeded the ring-buffer capacity.
    #[error("history_len {0} exceeds the maximum of {}", crate::contact::MAX_HISTORY)]
    HistoryTooLong(usize),
}
