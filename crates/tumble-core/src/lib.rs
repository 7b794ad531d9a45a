// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![doc = r"Tumble core: the rigid-body world.

A [`World`] owns bodies, colliders and the contacts between them. Each step
runs the same pipeline:

1. queued registrations are applied and gravity is folded into each awake
   body's expected velocity;
2. every body (union of its colliders) and every static collider becomes a
   [`Trajectory`], and sweep-and-prune reports overlapping pairs;
3. shape pairs are classified and tested by the narrow phase, in parallel
   over rayon when the `parallel` feature is on and the step is large enough;
4. penetrating pairs create or refresh persistent [`Contact`]s, keyed by
   their unordered collider pair; contacts that stop penetrating are dropped;
5. a sequential-impulse solver, warm-started from each contact's impulse
   history, writes corrected velocities back to the bodies.

[`World::end_step`] then commits velocities and integrates poses.

Contact normals point from collider A toward collider B.
"]

mod body;
mod collider;
mod config;
mod contact;
mod error;
mod handle;
mod material;
mod narrow;
mod solver;
mod trajectory;
mod world;

pub use body::{Body, BodyDesc};
pub use collider::{Collider, ColliderDesc, ColliderShape};
pub use config::WorldConfig;
pub use contact::{ConstraintRow, Contact, ContactSet, ImpulseEntry, ImpulseHistory, PairKey, MAX_HISTORY};
pub use error::{ConfigError, WorldError};
pub use handle::{BodyHandle, ColliderHandle, ContactHandle};
pub use material::{CollisionMode, Material};
pub use trajectory::{Trajectory, TrajectoryOwner};
pub use world::{ContactReport, StepStats, World};

pub use tumble_geom::cast::CastHit;
pub use tumble_geom::narrow::Penetration;
