// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Per-step bounding volumes fed to the broad phase.
//!
//! One trajectory covers either a body (the union of its active colliders)
//! or a single static collider. Trajectories are rebuilt every step and
//! carry no state across steps.

use tumble_geom::broad::Proxy;
use tumble_geom::{Aabb, Shape};

use crate::handle::{BodyHandle, ColliderHandle};

/// What a trajectory stands for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrajectoryOwner {
    /// A body and all of its active colliders.
    Body(BodyHandle),
    /// A static collider.
    Collider(ColliderHandle),
}

impl TrajectoryOwner {
    /// Stable broad-phase id. Bodies and static colliders interleave so the
    /// two handle spaces never collide.
    pub fn proxy_id(self) -> usize {
        match self {
            Self::Body(h) => (h.index() as usize) << 1,
            Self::Collider(h) => ((h.index() as usize) << 1) | 1,
        }
    }
}

/// A bounding volume with the world-space shapes it encloses.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    owner: TrajectoryOwner,
    aabb: Aabb,
    resting: bool,
    members: Vec<(ColliderHandle, Shape)>,
}

impl Trajectory {
    /// Empty trajectory for `owner`.
    pub fn new(owner: TrajectoryOwner, resting: bool) -> Self {
        Self { owner, aabb: Aabb::empty(), resting, members: Vec::new() }
    }

    /// Adds a collider's world-space shape and grows the bounds.
    pub fn push(&mut self, collider: ColliderHandle, shape: Shape) {
        self.aabb.encapsulate(&shape.aabb());
        self.members.push((collider, shape));
    }

    /// Owner back-reference.
    pub fn owner(&self) -> TrajectoryOwner {
        self.owner
    }

    /// Union of the member bounds.
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Static or sleeping.
    pub fn is_resting(&self) -> bool {
        self.resting
    }

    /// `true` when no collider contributed.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Collider handles in insertion order.
    pub fn colliders(&self) -> impl Iterator<Item = ColliderHandle> + '_ {
        self.members.iter().map(|(h, _)| *h)
    }

    /// Collider handles paired with their world-space shapes.
    pub fn members(&self) -> &[(ColliderHandle, Shape)] {
        &self.members
    }

    /// Broad-phase proxy for this trajectory.
    pub fn proxy(&self) -> Proxy {
        Proxy { aabb: self.aabb, resting: self.resting }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tumble_geom::Sphere;
    use tumble_math::Vec3;

    #[test]
    fn bounds_cover_every_member() {
        let mut t = Trajectory::new(TrajectoryOwner::Body(BodyHandle(0)), false);
        assert!(!t.aabb().is_valid());
        t.push(ColliderHandle(0), Sphere::new(Vec3::ZERO, 1.0).into());
        t.push(ColliderHandle(1), Sphere::new(Vec3::new(4.0, 0.0, 0.0), 1.0).into());
        assert_eq!(t.aabb().min(), Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(t.aabb().max(), Vec3::new(5.0, 1.0, 1.0));
        assert_eq!(t.colliders().collect::<Vec<_>>(), vec![ColliderHandle(0), ColliderHandle(1)]);
    }

    #[test]
    fn proxy_ids_do_not_collide() {
        let body = TrajectoryOwner::Body(BodyHandle(3)).proxy_id();
        let collider = TrajectoryOwner::Collider(ColliderHandle(3)).proxy_id();
        assert_ne!(body, collider);
    }
}
