// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The simulation world: registries plus the per-step pipeline.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashMap;
use tracing::{debug, debug_span, trace, warn};
use tumble_geom::broad::{BroadPhase, SweepAndPrune};
use tumble_geom::cast::{sphere_cast_obb, sphere_cast_sphere, CastHit};
use tumble_geom::narrow::Penetration;
use tumble_geom::Shape;
use tumble_math::Vec3;

use crate::body::{Body, BodyDesc};
use crate::collider::{Collider, ColliderDesc};
use crate::config::WorldConfig;
use crate::contact::{Contact, ContactSet};
use crate::error::WorldError;
use crate::handle::{BodyHandle, ColliderHandle, ContactHandle};
use crate::material::CollisionMode;
use crate::narrow::{self, Candidate};
use crate::solver::{self, SolverBody};
use crate::trajectory::{Trajectory, TrajectoryOwner};

/// Counters describing one [`World::begin_step`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct StepStats {
    /// Bounding volumes fed to the broad phase.
    pub trajectories: usize,
    /// Trajectory pairs reported by the broad phase.
    pub candidate_pairs: usize,
    /// Shape pairs run through detection.
    pub shape_pairs: usize,
    /// Live contacts after the step.
    pub contacts: usize,
    /// Contacts created this step.
    pub created: usize,
    /// Contacts destroyed this step.
    pub destroyed: usize,
    /// Solver passes run.
    pub iterations: u32,
}

/// Read-only view of a live contact.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ContactReport {
    /// Arena slot.
    pub handle: ContactHandle,
    /// First collider.
    pub collider_a: ColliderHandle,
    /// Second collider.
    pub collider_b: ColliderHandle,
    /// Body owning collider A.
    pub body_a: Option<BodyHandle>,
    /// Body owning collider B.
    pub body_b: Option<BodyHandle>,
    /// Deepest point of A inside B.
    pub point_a: Vec3,
    /// Deepest point of B inside A.
    pub point_b: Vec3,
    /// Unit normal from A toward B.
    pub normal: Vec3,
    /// Penetration depth.
    pub depth: f32,
    /// Reported but not solved.
    pub trigger: bool,
    /// Normal impulse applied in the last step.
    pub normal_impulse: f32,
}

impl ContactReport {
    fn new(handle: ContactHandle, c: &Contact) -> Self {
        Self {
            handle,
            collider_a: c.collider_a(),
            collider_b: c.collider_b(),
            body_a: c.body_a(),
            body_b: c.body_b(),
            point_a: c.point_a(),
            point_b: c.point_b(),
            normal: c.normal(),
            depth: c.depth(),
            trigger: c.is_trigger(),
            normal_impulse: c.normal_impulse(),
        }
    }
}

#[derive(Debug, Clone)]
enum Pending {
    AddBody(BodyHandle, BodyDesc),
    RemoveBody(BodyHandle),
    AddCollider(ColliderHandle, ColliderDesc),
    RemoveCollider(ColliderHandle),
}

/// Owns every body, collider and contact and advances them in steps.
///
/// A step is split in two so a host can read the solved velocities before
/// committing them: [`begin_step`](Self::begin_step) runs registration,
/// gravity, broad phase, narrow phase, contact tracking and the solver;
/// [`end_step`](Self::end_step) commits velocities and integrates poses.
/// [`step`](Self::step) runs both.
#[derive(Debug)]
pub struct World {
    config: WorldConfig,
    bodies: BTreeMap<BodyHandle, Body>,
    colliders: BTreeMap<ColliderHandle, Collider>,
    pending: Vec<Pending>,
    next_body: u32,
    next_collider: u32,
    broad: SweepAndPrune,
    proxies: BTreeSet<usize>,
    contacts: ContactSet,
    steps: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::with_checked_config(WorldConfig::default())
    }
}

impl World {
    /// Creates an empty world.
    ///
    /// # Errors
    /// Returns [`WorldError::Config`] when `config` fails validation.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        Ok(Self::with_checked_config(config))
    }

    fn with_checked_config(config: WorldConfig) -> Self {
        Self {
            config,
            bodies: BTreeMap::new(),
            colliders: BTreeMap::new(),
            pending: Vec::new(),
            next_body: 0,
            next_collider: 0,
            broad: SweepAndPrune::new(),
            proxies: BTreeSet::new(),
            contacts: ContactSet::new(),
            steps: 0,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Replaces the configuration.
    ///
    /// # Errors
    /// Returns [`WorldError::Config`] and keeps the old config when
    /// `config` fails validation.
    pub fn set_config(&mut self, config: WorldConfig) -> Result<(), WorldError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Number of completed [`begin_step`](Self::begin_step) calls.
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Queues a body. The handle is valid immediately; the body joins the
    /// simulation at the next step.
    pub fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        self.pending.push(Pending::AddBody(handle, desc));
        handle
    }

    /// Queues removal of a body and all of its colliders.
    ///
    /// # Errors
    /// Returns [`WorldError::UnknownBody`] when the handle is neither live
    /// nor queued.
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<(), WorldError> {
        if !self.knows_body(handle) {
            return Err(WorldError::UnknownBody(handle));
        }
        self.pending.push(Pending::RemoveBody(handle));
        Ok(())
    }

    /// Queues a collider. The handle is valid immediately; the collider
    /// joins the simulation at the next step.
    ///
    /// # Errors
    /// Returns [`WorldError::UnknownBody`] when `desc.body` names no live or
    /// queued body.
    pub fn add_collider(&mut self, desc: ColliderDesc) -> Result<ColliderHandle, WorldError> {
        if let Some(body) = desc.body {
            if !self.knows_body(body) {
                return Err(WorldError::UnknownBody(body));
            }
        }
        let handle = ColliderHandle(self.next_collider);
        self.next_collider += 1;
        self.pending.push(Pending::AddCollider(handle, desc));
        Ok(handle)
    }

    /// Queues removal of a collider.
    ///
    /// # Errors
    /// Returns [`WorldError::UnknownCollider`] when the handle is neither
    /// live nor queued.
    pub fn remove_collider(&mut self, handle: ColliderHandle) -> Result<(), WorldError> {
        let queued = self
            .pending
            .iter()
            .any(|p| matches!(p, Pending::AddCollider(h, _) if *h == handle));
        if !queued && !self.colliders.contains_key(&handle) {
            return Err(WorldError::UnknownCollider(handle));
        }
        self.pending.push(Pending::RemoveCollider(handle));
        Ok(())
    }

    fn knows_body(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle)
            || self
                .pending
                .iter()
                .any(|p| matches!(p, Pending::AddBody(h, _) if *h == handle))
    }

    /// Borrow a live body.
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(&handle)
    }

    /// Mutably borrow a live body.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(&handle)
    }

    /// Borrow a live collider.
    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(&handle)
    }

    /// Mutably borrow a live collider.
    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.colliders.get_mut(&handle)
    }

    /// Live bodies in handle order.
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter().map(|(h, b)| (*h, b))
    }

    /// Live colliders in handle order.
    pub fn colliders(&self) -> impl Iterator<Item = (ColliderHandle, &Collider)> + '_ {
        self.colliders.iter().map(|(h, c)| (*h, c))
    }

    /// Borrow a live contact.
    pub fn contact(&self, handle: ContactHandle) -> Option<&Contact> {
        self.contacts.get(handle)
    }

    /// Contacts tracked by the last step, in arena order.
    pub fn contacts(&self) -> impl Iterator<Item = ContactReport> + '_ {
        self.contacts.iter().map(|(h, c)| ContactReport::new(h, c))
    }

    /// World pose of a collider's shape.
    pub fn collider_shape(&self, handle: ColliderHandle) -> Option<Shape> {
        let collider = self.colliders.get(&handle)?;
        let pose = match collider.body() {
            Some(b) => Some(self.bodies.get(&b)?.pose()),
            None => None,
        };
        Some(collider.world_shape(pose.as_ref()))
    }

    /// Sweeps a sphere through the world and returns the nearest box or
    /// sphere collider it touches. Capsules, disabled and ignored colliders
    /// are not considered.
    pub fn sphere_cast(
        &self,
        origin: Vec3,
        dir: Vec3,
        length: f32,
        radius: f32,
    ) -> Option<(ColliderHandle, CastHit)> {
        let mut best: Option<(ColliderHandle, CastHit)> = None;
        for (handle, collider) in &self.colliders {
            if !collider.is_active() {
                continue;
            }
            let hit = match self.collider_shape(*handle) {
                Some(Shape::Sphere(s)) => sphere_cast_sphere(&s, origin, dir, length, radius),
                Some(Shape::Obb(o)) => sphere_cast_obb(&o, origin, dir, length, radius),
                _ => None,
            };
            if let Some(hit) = hit {
                if best.is_none_or(|(_, b)| hit.distance < b.distance) {
                    best = Some((*handle, hit));
                }
            }
        }
        best
    }

    /// First half of a step: applies queued registrations, gravity, the
    /// broad and narrow phases, contact tracking and the solver. Solved
    /// velocities land in each body's expected velocities.
    ///
    /// # Errors
    /// Returns [`WorldError::InvalidTimestep`] without touching any state
    /// when `dt` is not a finite positive number.
    pub fn begin_step(&mut self, dt: f32) -> Result<StepStats, WorldError> {
        check_dt(dt)?;
        let span = debug_span!("begin_step", step = self.steps);
        let _enter = span.enter();

        self.apply_pending();
        self.apply_gravity(dt);

        let trajectories = self.build_trajectories();
        let lookup = self.sync_broad_phase(&trajectories);
        let pairs = self.broad.pairs();
        let candidates = narrow::collect(&pairs, &trajectories, &lookup);
        let results = narrow::run(&candidates, self.config.parallel_threshold);

        self.steps += 1;
        let (created, destroyed) = self.track_contacts(&candidates, &results);
        self.wake_touched();
        let iterations = self.solve(dt);

        let stats = StepStats {
            trajectories: trajectories.len(),
            candidate_pairs: pairs.len(),
            shape_pairs: candidates.len(),
            contacts: self.contacts.len(),
            created,
            destroyed,
            iterations,
        };
        debug!(
            trajectories = stats.trajectories,
            candidates = stats.shape_pairs,
            contacts = stats.contacts,
            iterations = stats.iterations,
            "step solved"
        );
        Ok(stats)
    }

    /// Second half of a step: commits expected velocities and integrates
    /// every awake body over `dt`.
    ///
    /// # Errors
    /// Returns [`WorldError::InvalidTimestep`] when `dt` is not a finite
    /// positive number.
    pub fn end_step(&mut self, dt: f32) -> Result<(), WorldError> {
        check_dt(dt)?;
        for body in self.bodies.values_mut().filter(|b| !b.is_sleeping()) {
            body.integrate(dt);
        }
        Ok(())
    }

    /// Runs [`begin_step`](Self::begin_step) then [`end_step`](Self::end_step).
    ///
    /// # Errors
    /// Returns [`WorldError::InvalidTimestep`] for a bad `dt`.
    pub fn step(&mut self, dt: f32) -> Result<StepStats, WorldError> {
        let stats = self.begin_step(dt)?;
        self.end_step(dt)?;
        Ok(stats)
    }

    fn apply_pending(&mut self) {
        for op in std::mem::take(&mut self.pending) {
            match op {
                Pending::AddBody(handle, desc) => {
                    self.bodies.insert(handle, Body::new(&desc));
                    trace!(body = %handle, "body added");
                }
                Pending::RemoveBody(handle) => {
                    let Some(body) = self.bodies.remove(&handle) else {
                        warn!(body = %handle, "queued removal of a body that is already gone");
                        continue;
                    };
                    for collider in body.colliders() {
                        self.colliders.remove(collider);
                    }
                    trace!(body = %handle, colliders = body.colliders().len(), "body removed");
                }
                Pending::AddCollider(handle, desc) => {
                    if let Some(owner) = desc.body {
                        let Some(body) = self.bodies.get_mut(&owner) else {
                            warn!(collider = %handle, body = %owner, "owning body removed before collider joined");
                            continue;
                        };
                        body.colliders.push(handle);
                    }
                    self.colliders.insert(handle, Collider::new(&desc));
                    trace!(collider = %handle, "collider added");
                }
                Pending::RemoveCollider(handle) => {
                    let Some(collider) = self.colliders.remove(&handle) else {
                        warn!(collider = %handle, "queued removal of a collider that is already gone");
                        continue;
                    };
                    if let Some(body) = collider.body().and_then(|b| self.bodies.get_mut(&b)) {
                        body.colliders.retain(|c| *c != handle);
                    }
                    trace!(collider = %handle, "collider removed");
                }
            }
        }
    }

    fn apply_gravity(&mut self, dt: f32) {
        let dv = self.config.gravity.scale(dt);
        for body in self.bodies.values_mut() {
            body.expected_velocity = body.velocity();
            body.expected_angular_velocity = body.angular_velocity();
            body.delta_velocity = Vec3::ZERO;
            body.delta_angular_velocity = Vec3::ZERO;
            if !body.is_sleeping() && body.uses_gravity() && body.inverse_mass() > 0.0 {
                body.expected_velocity = body.expected_velocity.add(&dv);
            }
        }
    }

    fn build_trajectories(&self) -> Vec<Trajectory> {
        let mut out = Vec::with_capacity(self.bodies.len());
        for (handle, body) in &self.bodies {
            let pose = body.pose();
            let mut t = Trajectory::new(TrajectoryOwner::Body(*handle), body.is_sleeping());
            for ch in body.colliders() {
                if let Some(c) = self.colliders.get(ch).filter(|c| c.is_active()) {
                    t.push(*ch, c.world_shape(Some(&pose)));
                }
            }
            if !t.is_empty() {
                out.push(t);
            }
        }
        for (handle, c) in self.colliders.iter().filter(|(_, c)| c.is_static() && c.is_active()) {
            let mut t = Trajectory::new(TrajectoryOwner::Collider(*handle), true);
            t.push(*handle, c.world_shape(None));
            out.push(t);
        }
        out
    }

    /// Upserts this step's proxies, drops stale ones and returns the map
    /// from proxy id to trajectory index.
    fn sync_broad_phase(&mut self, trajectories: &[Trajectory]) -> FxHashMap<usize, usize> {
        let mut live = BTreeSet::new();
        let mut lookup = FxHashMap::default();
        for (i, t) in trajectories.iter().enumerate() {
            let id = t.owner().proxy_id();
            self.broad.upsert(id, t.proxy());
            live.insert(id);
            lookup.insert(id, i);
        }
        for stale in self.proxies.difference(&live) {
            self.broad.remove(*stale);
        }
        self.proxies = live;
        lookup
    }

    /// Creates, updates and destroys contacts from this step's detection
    /// results. Returns `(created, destroyed)`.
    fn track_contacts(&mut self, candidates: &[Candidate], results: &[Option<Penetration>]) -> (usize, usize) {
        let mut created = 0;
        for (cand, found) in candidates.iter().zip(results) {
            let Some(found) = found else {
                continue;
            };
            let (Some(ca), Some(cb)) = (self.colliders.get(&cand.a), self.colliders.get(&cand.b)) else {
                continue;
            };
            let mode = ca.mode().combine(cb.mode());
            if mode == CollisionMode::Ignore {
                continue;
            }
            let material = ca.material().combine(&cb.material());
            let side_a = (cand.a, ca.body());
            let side_b = (cand.b, cb.body());
            let center_a = self.reference_center(ca.body(), &cand.shape_a);
            let center_b = self.reference_center(cb.body(), &cand.shape_b);

            let (handle, fresh) = self.contacts.find_or_create(side_a, side_b, self.config.history_len);
            if let Some(contact) = self.contacts.get_mut(handle) {
                contact.update(found, center_a, center_b);
                contact.material = material;
                contact.trigger = mode == CollisionMode::Trigger;
                contact.stamp = self.steps;
            }
            if fresh {
                created += 1;
                trace!(a = %cand.a, b = %cand.b, depth = found.depth(), "contact created");
            }
        }
        let stale = self.contacts.remove_stale(self.steps);
        for key in &stale {
            trace!(a = %key.lo(), b = %key.hi(), "contact destroyed");
        }
        (created, stale.len())
    }

    fn reference_center(&self, body: Option<BodyHandle>, shape: &Shape) -> Vec3 {
        body.and_then(|b| self.bodies.get(&b))
            .map_or_else(|| shape.center(), Body::center_of_mass)
    }

    /// Wakes sleeping bodies that a solid contact pairs with an awake one.
    fn wake_touched(&mut self) {
        let mut woken = Vec::new();
        for (_, c) in self.contacts.iter().filter(|(_, c)| !c.is_trigger()) {
            let asleep = |b: Option<BodyHandle>| b.and_then(|h| self.bodies.get(&h)).is_some_and(Body::is_sleeping);
            if asleep(c.body_a()) && !asleep(c.body_b()) {
                woken.extend(c.body_a());
            }
            if asleep(c.body_b()) && !asleep(c.body_a()) {
                woken.extend(c.body_b());
            }
        }
        for handle in woken {
            if let Some(body) = self.bodies.get_mut(&handle) {
                if body.is_sleeping() {
                    body.wake();
                    trace!(body = %handle, "woken by contact");
                }
            }
        }
    }

    /// Runs the solver over the solid contacts and stores each body's
    /// solved velocities and deltas. Returns the passes run.
    fn solve(&mut self, dt: f32) -> u32 {
        let mut slots: FxHashMap<BodyHandle, usize> = FxHashMap::default();
        let mut state = vec![SolverBody::FIXED];
        for (handle, body) in &self.bodies {
            slots.insert(*handle, state.len());
            let (velocity, angular_velocity) = body.expected_velocities();
            let awake = !body.is_sleeping();
            state.push(SolverBody {
                inverse_mass: if awake { body.inverse_mass() } else { 0.0 },
                inverse_inertia: if awake { body.inverse_inertia_world() } else { Vec3::ZERO },
                velocity,
                angular_velocity,
            });
        }

        let mut active: Vec<&mut Contact> = Vec::new();
        for c in self.contacts.iter_mut().filter(|c| !c.trigger) {
            c.solver_a = c.body_a().and_then(|b| slots.get(&b).copied()).unwrap_or(0);
            c.solver_b = c.body_b().and_then(|b| slots.get(&b).copied()).unwrap_or(0);
            if c.solver_a != c.solver_b {
                active.push(c);
            }
        }
        if active.is_empty() {
            return 0;
        }
        let passes = solver::solve(&mut state, &mut active, dt, &self.config);

        for (handle, body) in &mut self.bodies {
            let Some(s) = slots.get(handle).and_then(|i| state.get(*i)) else {
                continue;
            };
            let (v0, w0) = body.expected_velocities();
            body.delta_velocity = s.velocity.sub(&v0);
            body.delta_angular_velocity = s.angular_velocity.sub(&w0);
            body.expected_velocity = s.velocity;
            body.expected_angular_velocity = s.angular_velocity;
        }
        passes
    }
}

fn check_dt(dt: f32) -> Result<(), WorldError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(WorldError::InvalidTimestep(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collider::ColliderShape;

    #[test]
    fn handles_are_valid_before_the_step() {
        let mut world = World::default();
        let body = world.add_body(BodyDesc::dynamic(1.0));
        assert!(world.body(body).is_none());
        let collider = world.add_collider(ColliderDesc::new(ColliderShape::ball(0.5)).with_body(body));
        assert!(collider.is_ok());
        assert_eq!(world.remove_body(BodyHandle(42)), Err(WorldError::UnknownBody(BodyHandle(42))));
        assert!(world.begin_step(1.0 / 60.0).is_ok());
        assert_eq!(world.body(body).map(|b| b.colliders().len()), Some(1));
    }

    #[test]
    fn removing_a_body_drops_its_colliders() {
        let mut world = World::default();
        let body = world.add_body(BodyDesc::dynamic(1.0));
        let Ok(collider) = world.add_collider(ColliderDesc::new(ColliderShape::ball(0.5)).with_body(body)) else {
            unreachable!("body is queued");
        };
        assert!(world.step(0.01).is_ok());
        assert!(world.remove_body(body).is_ok());
        assert!(world.step(0.01).is_ok());
        assert!(world.body(body).is_none());
        assert!(world.collider(collider).is_none());
        assert_eq!(
            world.remove_collider(collider),
            Err(WorldError::UnknownCollider(collider))
        );
    }

    #[test]
    fn bad_timestep_leaves_state_untouched() {
        let mut world = World::default();
        let body = world.add_body(BodyDesc::dynamic(1.0));
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(world.begin_step(dt), Err(WorldError::InvalidTimestep(_))));
        }
        assert!(world.body(body).is_none());
        assert_eq!(world.step_count(), 0);
    }

    #[test]
    fn free_body_falls_under_gravity() {
        let mut world = World::default();
        let body = world.add_body(BodyDesc::dynamic(1.0));
        assert!(world.step(0.5).is_ok());
        let v = world.body(body).map(Body::velocity);
        assert_eq!(v, Some(Vec3::new(0.0, -9.81 * 0.5, 0.0)));
    }

    #[test]
    fn sphere_cast_finds_nearest_collider() {
        let mut world = World::default();
        let near = world.add_collider(
            ColliderDesc::new(ColliderShape::cuboid(Vec3::ONE)).with_translation(Vec3::new(3.0, 0.0, 0.0)),
        );
        let far = world.add_collider(
            ColliderDesc::new(ColliderShape::ball(1.0)).with_translation(Vec3::new(8.0, 0.0, 0.0)),
        );
        assert!(near.is_ok() && far.is_ok());
        assert!(world.step(0.01).is_ok());
        let hit = world.sphere_cast(Vec3::ZERO, Vec3::UNIT_X, 20.0, 0.25);
        assert_eq!(hit.map(|(h, _)| h), near.ok());
        assert!(hit.is_some_and(|(_, h)| (h.distance - 2.25).abs() < 1e-5));
    }
}
