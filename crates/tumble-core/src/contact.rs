// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Persistent contacts and the arena that tracks them across steps.
//!
//! A contact is identified by the unordered pair of its colliders. When a
//! step reports the pair in the opposite order the stored contact is
//! [`swap`](Contact::swap)ped in place so its solver state and impulse
//! history stay attached to the right bodies.

use core::mem;

use rustc_hash::FxHashMap;
use tumble_geom::narrow::Penetration;
use tumble_math::{Vec3, EPSILON};

use crate::config::WorldConfig;
use crate::handle::{BodyHandle, ColliderHandle, ContactHandle};
use crate::material::Material;
use crate::solver::SolverBody;

/// Capacity of every impulse ring buffer.
pub const MAX_HISTORY: usize = 8;

/// Unordered collider pair.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey {
    lo: ColliderHandle,
    hi: ColliderHandle,
}

impl PairKey {
    /// Key for `{a, b}`; argument order does not matter.
    pub fn new(a: ColliderHandle, b: ColliderHandle) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }

    /// Smaller handle.
    pub fn lo(&self) -> ColliderHandle {
        self.lo
    }

    /// Larger handle.
    pub fn hi(&self) -> ColliderHandle {
        self.hi
    }
}

/// Linear impulse applied to each side of a contact during one step.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ImpulseEntry {
    /// Impulse applied to body A.
    pub on_a: Vec3,
    /// Impulse applied to body B.
    pub on_b: Vec3,
}

impl ImpulseEntry {
    fn swapped(self) -> Self {
        Self { on_a: self.on_b, on_b: self.on_a }
    }
}

/// Fixed-capacity ring buffer of per-step impulses.
#[derive(Debug, Clone, PartialEq)]
pub struct ImpulseHistory {
    entries: [ImpulseEntry; MAX_HISTORY],
    capacity: usize,
    len: usize,
    head: usize,
}

impl ImpulseHistory {
    /// Empty history holding at most `capacity` entries (clamped to
    /// `1..=MAX_HISTORY`).
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: [ImpulseEntry::default(); MAX_HISTORY],
            capacity: capacity.clamp(1, MAX_HISTORY),
            len: 0,
            head: 0,
        }
    }

    /// Records one step, overwriting the oldest entry when full.
    pub fn push(&mut self, entry: ImpulseEntry) {
        self.entries[self.head] = entry;
        self.head = (self.head + 1) % self.capacity;
        self.len = (self.len + 1).min(self.capacity);
    }

    /// Mean of the recorded entries.
    pub fn average(&self) -> Option<ImpulseEntry> {
        if self.len == 0 {
            return None;
        }
        let mut sum = ImpulseEntry::default();
        let mut count = 0.0_f32;
        for e in &self.entries[..self.len] {
            sum.on_a = sum.on_a.add(&e.on_a);
            sum.on_b = sum.on_b.add(&e.on_b);
            count += 1.0;
        }
        Some(ImpulseEntry { on_a: sum.on_a.scale(1.0 / count), on_b: sum.on_b.scale(1.0 / count) })
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` before the first push.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn swap(&mut self) {
        for e in &mut self.entries {
            *e = e.swapped();
        }
    }
}

/// One velocity-constraint row `J = [va, wa, vb, wb]`.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct ConstraintRow {
    pub(crate) va: Vec3,
    pub(crate) wa: Vec3,
    pub(crate) vb: Vec3,
    pub(crate) wb: Vec3,
    pub(crate) effective_mass: f32,
    pub(crate) bias: f32,
    pub(crate) accumulated: f32,
}

impl ConstraintRow {
    fn new(dir: Vec3, r_a: Vec3, r_b: Vec3, a: &SolverBody, b: &SolverBody) -> Self {
        let va = -dir;
        let wa = -r_a.cross(&dir);
        let vb = dir;
        let wb = r_b.cross(&dir);
        let k = a.inverse_mass
            + b.inverse_mass
            + wa.dot(&a.inverse_inertia.mul_elem(&wa))
            + wb.dot(&b.inverse_inertia.mul_elem(&wb));
        let effective_mass = if k > EPSILON { 1.0 / k } else { 0.0 };
        Self { va, wa, vb, wb, effective_mass, bias: 0.0, accumulated: 0.0 }
    }

    /// Relative velocity along the row.
    pub(crate) fn velocity(&self, a: &SolverBody, b: &SolverBody) -> f32 {
        self.va.dot(&a.velocity)
            + self.wa.dot(&a.angular_velocity)
            + self.vb.dot(&b.velocity)
            + self.wb.dot(&b.angular_velocity)
    }

    /// Applies `lambda` along the row to both bodies.
    pub(crate) fn apply(&self, a: &mut SolverBody, b: &mut SolverBody, lambda: f32) {
        a.apply(self.va, self.wa, lambda);
        b.apply(self.vb, self.wb, lambda);
    }

    /// Impulse accumulated this step.
    pub fn impulse(&self) -> f32 {
        self.accumulated
    }

    fn swap(&mut self) {
        mem::swap(&mut self.va, &mut self.vb);
        mem::swap(&mut self.wa, &mut self.wb);
    }
}

/// A tracked penetrating collider pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Contact {
    collider_a: ColliderHandle,
    collider_b: ColliderHandle,
    body_a: Option<BodyHandle>,
    body_b: Option<BodyHandle>,
    normal: Vec3,
    penetration: Vec3,
    depth: f32,
    point_a: Vec3,
    point_b: Vec3,
    center_a: Vec3,
    center_b: Vec3,
    r_a: Vec3,
    r_b: Vec3,
    patch_radius: f32,
    pub(crate) rows: [ConstraintRow; 3],
    pub(crate) twist: f32,
    pub(crate) twist_mass: f32,
    pub(crate) tilt: [f32; 2],
    pub(crate) tilt_mass: [f32; 2],
    pub(crate) material: Material,
    pub(crate) trigger: bool,
    pub(crate) history: ImpulseHistory,
    pub(crate) converged: bool,
    pub(crate) solver_a: usize,
    pub(crate) solver_b: usize,
    pub(crate) stamp: u64,
}

impl Contact {
    /// Fresh contact with no geometry yet.
    pub fn new(
        collider_a: ColliderHandle,
        collider_b: ColliderHandle,
        body_a: Option<BodyHandle>,
        body_b: Option<BodyHandle>,
        history_len: usize,
    ) -> Self {
        Self {
            collider_a,
            collider_b,
            body_a,
            body_b,
            normal: Vec3::UNIT_Y,
            penetration: Vec3::ZERO,
            depth: 0.0,
            point_a: Vec3::ZERO,
            point_b: Vec3::ZERO,
            center_a: Vec3::ZERO,
            center_b: Vec3::ZERO,
            r_a: Vec3::ZERO,
            r_b: Vec3::ZERO,
            patch_radius: 0.0,
            rows: [ConstraintRow::default(); 3],
            twist: 0.0,
            twist_mass: 0.0,
            tilt: [0.0; 2],
            tilt_mass: [0.0; 2],
            material: Material::default(),
            trigger: false,
            history: ImpulseHistory::new(history_len),
            converged: false,
            solver_a: 0,
            solver_b: 0,
            stamp: 0,
        }
    }

    /// Exchanges the roles of A and B. Two swaps restore every field exactly.
    pub fn swap(&mut self) {
        mem::swap(&mut self.collider_a, &mut self.collider_b);
        mem::swap(&mut self.body_a, &mut self.body_b);
        self.normal = -self.normal;
        self.penetration = -self.penetration;
        mem::swap(&mut self.point_a, &mut self.point_b);
        mem::swap(&mut self.center_a, &mut self.center_b);
        mem::swap(&mut self.r_a, &mut self.r_b);
        for row in &mut self.rows {
            row.swap();
        }
        self.history.swap();
        mem::swap(&mut self.solver_a, &mut self.solver_b);
    }

    /// Refreshes geometry from this step's detection result. `center_a` and
    /// `center_b` are the reference points lever arms are measured from.
    pub fn update(&mut self, found: &Penetration, center_a: Vec3, center_b: Vec3) {
        self.penetration = found.vector;
        self.depth = found.depth();
        self.normal = found.vector.try_normalize().unwrap_or(Vec3::UNIT_Y);
        self.point_a = found.point_a;
        self.point_b = found.point_b;
        self.center_a = center_a;
        self.center_b = center_b;
        self.r_a = found.point_a.sub(&center_a);
        self.r_b = found.point_b.sub(&center_b);
        self.patch_radius = found.patch_radius;
    }

    /// Builds the three constraint rows and the normal bias for a step of
    /// `dt` seconds. Accumulated impulses restart from zero.
    pub(crate) fn init_velocity_constraint(
        &mut self,
        dt: f32,
        a: &SolverBody,
        b: &SolverBody,
        config: &WorldConfig,
    ) {
        let n = self.normal;
        let (t1, t2) = n.orthonormal_basis();
        self.rows = [n, t1, t2].map(|dir| ConstraintRow::new(dir, self.r_a, self.r_b, a, b));

        let closing = self.rows[0].velocity(a, b);
        let baumgarte = -(self.material.beta / dt) * (self.depth - config.slop).max(0.0);
        let bounce = if -closing > config.restitution_threshold {
            self.material.restitution * closing.min(0.0)
        } else {
            0.0
        };
        self.rows[0].bias = baumgarte + bounce;

        let angular_mass = |axis: Vec3| {
            let k = axis.dot(&a.inverse_inertia.mul_elem(&axis)) + axis.dot(&b.inverse_inertia.mul_elem(&axis));
            if k > EPSILON {
                1.0 / k
            } else {
                0.0
            }
        };
        self.twist_mass = angular_mass(n);
        self.twist = 0.0;
        self.tilt_mass = [angular_mass(t1), angular_mass(t2)];
        self.tilt = [0.0; 2];
        self.converged = false;
    }

    /// Half-width of the flat patch behind this contact; zero for point and
    /// line contacts.
    pub fn patch_radius(&self) -> f32 {
        self.patch_radius
    }

    /// First collider.
    pub fn collider_a(&self) -> ColliderHandle {
        self.collider_a
    }

    /// Second collider.
    pub fn collider_b(&self) -> ColliderHandle {
        self.collider_b
    }

    /// Body owning collider A.
    pub fn body_a(&self) -> Option<BodyHandle> {
        self.body_a
    }

    /// Body owning collider B.
    pub fn body_b(&self) -> Option<BodyHandle> {
        self.body_b
    }

    /// Unit normal from A toward B.
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Normal scaled by depth.
    pub fn penetration(&self) -> Vec3 {
        self.penetration
    }

    /// Penetration depth.
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Deepest point of A inside B.
    pub fn point_a(&self) -> Vec3 {
        self.point_a
    }

    /// Deepest point of B inside A.
    pub fn point_b(&self) -> Vec3 {
        self.point_b
    }

    /// Lever arms from each reference centre to its contact point.
    pub fn lever_arms(&self) -> (Vec3, Vec3) {
        (self.r_a, self.r_b)
    }

    /// Normal, tangent and bitangent rows.
    pub fn rows(&self) -> &[ConstraintRow; 3] {
        &self.rows
    }

    /// Combined pair material.
    pub fn material(&self) -> Material {
        self.material
    }

    /// `true` when the pair is reported but never solved.
    pub fn is_trigger(&self) -> bool {
        self.trigger
    }

    /// Past impulses used for warm starting.
    pub fn history(&self) -> &ImpulseHistory {
        &self.history
    }

    /// Total normal impulse applied this step.
    pub fn normal_impulse(&self) -> f32 {
        self.rows[0].accumulated
    }
}

/// Slot arena of contacts keyed by unordered collider pair.
#[derive(Debug, Default)]
pub struct ContactSet {
    slots: Vec<Option<Contact>>,
    free: Vec<usize>,
    index: FxHashMap<PairKey, ContactHandle>,
}

impl ContactSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Live contact count.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// `true` when no contact is live.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Handle of the contact for `{a, b}`, if any.
    pub fn find(&self, a: ColliderHandle, b: ColliderHandle) -> Option<ContactHandle> {
        self.index.get(&PairKey::new(a, b)).copied()
    }

    /// Returns the contact for `{a, b}` oriented so that `collider_a == a`,
    /// creating it when missing. The flag is `true` for a new contact.
    pub fn find_or_create(
        &mut self,
        a: (ColliderHandle, Option<BodyHandle>),
        b: (ColliderHandle, Option<BodyHandle>),
        history_len: usize,
    ) -> (ContactHandle, bool) {
        let key = PairKey::new(a.0, b.0);
        if let Some(handle) = self.index.get(&key).copied() {
            if let Some(contact) = self.slots.get_mut(handle.0).and_then(Option::as_mut) {
                if contact.collider_a != a.0 {
                    contact.swap();
                }
                return (handle, false);
            }
        }
        let contact = Contact::new(a.0, b.0, a.1, b.1, history_len);
        let handle = if let Some(slot) = self.free.pop() {
            self.slots[slot] = Some(contact);
            ContactHandle(slot)
        } else {
            self.slots.push(Some(contact));
            ContactHandle(self.slots.len() - 1)
        };
        self.index.insert(key, handle);
        (handle, true)
    }

    /// Borrow a contact.
    pub fn get(&self, handle: ContactHandle) -> Option<&Contact> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    /// Mutably borrow a contact.
    pub fn get_mut(&mut self, handle: ContactHandle) -> Option<&mut Contact> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Destroys a contact and frees its slot.
    pub fn remove(&mut self, handle: ContactHandle) -> Option<Contact> {
        let contact = self.slots.get_mut(handle.0)?.take()?;
        self.index.remove(&PairKey::new(contact.collider_a, contact.collider_b));
        self.free.push(handle.0);
        Some(contact)
    }

    /// Live contacts in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ContactHandle, &Contact)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.as_ref().map(|c| (ContactHandle(i), c)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Contact> + '_ {
        self.slots.iter_mut().flatten()
    }

    /// Removes every contact whose stamp differs from `stamp` and returns
    /// the removed pairs.
    pub(crate) fn remove_stale(&mut self, stamp: u64) -> Vec<PairKey> {
        let stale: Vec<ContactHandle> = self
            .iter()
            .filter(|(_, c)| c.stamp != stamp)
            .map(|(h, _)| h)
            .collect();
        stale
            .into_iter()
            .filter_map(|h| self.remove(h))
            .map(|c| PairKey::new(c.collider_a, c.collider_b))
            .collect()
    }
}
