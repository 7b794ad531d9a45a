// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rigid-body state.

use tumble_geom::Transform;
use tumble_math::{Quat, Vec3};

use crate::handle::ColliderHandle;

/// Construction parameters for a body.
///
/// A non-positive or non-finite `mass` yields an immovable body (zero
/// inverse mass and inertia) that still moves with its own velocity.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyDesc {
    /// Body origin in world space.
    pub position: Vec3,
    /// Body orientation.
    pub rotation: Quat,
    /// Initial linear velocity.
    pub velocity: Vec3,
    /// Initial angular velocity (world axes).
    pub angular_velocity: Vec3,
    /// Mass in kilograms.
    pub mass: f32,
    /// Principal moments of inertia about the body's local axes.
    pub inertia: Vec3,
    /// Centre of mass in body space.
    pub center_of_mass: Vec3,
    /// Whether world gravity applies.
    pub use_gravity: bool,
    /// Start asleep.
    pub sleeping: bool,
}

impl Default for BodyDesc {
    fn default() -> Self {
        Self::dynamic(1.0)
    }
}

impl BodyDesc {
    /// A dynamic body of `mass` with the inertia of a unit cube.
    pub fn dynamic(mass: f32) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::identity(),
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass,
            inertia: Vec3::splat(mass / 6.0),
            center_of_mass: Vec3::ZERO,
            use_gravity: true,
            sleeping: false,
        }
    }

    /// An immovable body; it still follows any velocity the host assigns.
    pub fn fixed() -> Self {
        Self { mass: 0.0, inertia: Vec3::ZERO, use_gravity: false, ..Self::dynamic(0.0) }
    }

    /// Sets the position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets the orientation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the initial linear velocity.
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the initial angular velocity.
    pub fn with_angular_velocity(mut self, angular_velocity: Vec3) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Sets the principal moments of inertia.
    pub fn with_inertia(mut self, inertia: Vec3) -> Self {
        self.inertia = inertia;
        self
    }

    /// Inertia of a solid box of full `size`.
    pub fn with_box_inertia(self, size: Vec3) -> Self {
        let s = size.mul_elem(&size);
        let k = self.mass / 12.0;
        self.with_inertia(Vec3::new(k * (s.y() + s.z()), k * (s.x() + s.z()), k * (s.x() + s.y())))
    }

    /// Inertia of a solid sphere of `radius`.
    pub fn with_sphere_inertia(self, radius: f32) -> Self {
        let i = 0.4 * self.mass * radius * radius;
        self.with_inertia(Vec3::splat(i))
    }

    /// Sets the local centre of mass.
    pub fn with_center_of_mass(mut self, com: Vec3) -> Self {
        self.center_of_mass = com;
        self
    }

    /// Enables or disables gravity.
    pub fn with_gravity(mut self, enabled: bool) -> Self {
        self.use_gravity = enabled;
        self
    }

    /// Starts the body asleep.
    pub fn asleep(mut self) -> Self {
        self.sleeping = true;
        self
    }
}

fn reciprocal(v: f32) -> f32 {
    if v.is_finite() && v > 0.0 {
        1.0 / v
    } else {
        0.0
    }
}

/// A rigid body stored in the world registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    position: Vec3,
    rotation: Quat,
    com_local: Vec3,
    inverse_mass: f32,
    inverse_inertia_local: Vec3,
    velocity: Vec3,
    angular_velocity: Vec3,
    pub(crate) expected_velocity: Vec3,
    pub(crate) expected_angular_velocity: Vec3,
    pub(crate) delta_velocity: Vec3,
    pub(crate) delta_angular_velocity: Vec3,
    use_gravity: bool,
    sleeping: bool,
    pub(crate) colliders: Vec<ColliderHandle>,
}

impl Body {
    pub(crate) fn new(desc: &BodyDesc) -> Self {
        let inertia = desc.inertia.abs();
        Self {
            position: desc.position,
            rotation: desc.rotation.normalize(),
            com_local: desc.center_of_mass,
            inverse_mass: reciprocal(desc.mass),
            inverse_inertia_local: Vec3::new(
                reciprocal(inertia.x()),
                reciprocal(inertia.y()),
                reciprocal(inertia.z()),
            ),
            velocity: desc.velocity,
            angular_velocity: desc.angular_velocity,
            expected_velocity: desc.velocity,
            expected_angular_velocity: desc.angular_velocity,
            delta_velocity: Vec3::ZERO,
            delta_angular_velocity: Vec3::ZERO,
            use_gravity: desc.use_gravity,
            sleeping: desc.sleeping,
            colliders: Vec::new(),
        }
    }

    /// Body origin.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Moves the body origin.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Orientation.
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Sets the orientation (normalised).
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    /// World pose of the body origin.
    pub fn pose(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    /// Linear velocity.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Sets the linear velocity.
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
        self.expected_velocity = velocity;
    }

    /// Angular velocity (world axes).
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Sets the angular velocity.
    pub fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        self.angular_velocity = angular_velocity;
        self.expected_angular_velocity = angular_velocity;
    }

    /// Velocities the next [`World::end_step`](crate::World::end_step) will
    /// commit: current velocity plus gravity plus solver corrections.
    pub fn expected_velocities(&self) -> (Vec3, Vec3) {
        (self.expected_velocity, self.expected_angular_velocity)
    }

    /// Linear and angular corrections the solver applied during the last step.
    pub fn solver_delta(&self) -> (Vec3, Vec3) {
        (self.delta_velocity, self.delta_angular_velocity)
    }

    /// Inverse mass (zero for immovable bodies).
    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    /// Mass (infinite for immovable bodies).
    pub fn mass(&self) -> f32 {
        if self.inverse_mass > 0.0 {
            1.0 / self.inverse_mass
        } else {
            f32::INFINITY
        }
    }

    /// Inverse principal moments in body axes.
    pub fn inverse_inertia_local(&self) -> Vec3 {
        self.inverse_inertia_local
    }

    /// Diagonal of the inverse inertia tensor in world axes.
    pub fn inverse_inertia_world(&self) -> Vec3 {
        self.rotation.to_mat3().rotated_diagonal(self.inverse_inertia_local)
    }

    /// Centre of mass in world space.
    pub fn center_of_mass(&self) -> Vec3 {
        self.position.add(&self.rotation.rotate(self.com_local))
    }

    /// `true` when neither impulses nor gravity can move the body.
    pub fn is_fixed(&self) -> bool {
        self.inverse_mass == 0.0 && self.inverse_inertia_local.is_zero()
    }

    /// Whether world gravity applies.
    pub fn uses_gravity(&self) -> bool {
        self.use_gravity
    }

    /// Enables or disables gravity.
    pub fn set_use_gravity(&mut self, enabled: bool) {
        self.use_gravity = enabled;
    }

    /// Whether the body is asleep.
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Puts the body to sleep and zeroes its velocities.
    pub fn sleep(&mut self) {
        self.sleeping = true;
        self.set_velocity(Vec3::ZERO);
        self.set_angular_velocity(Vec3::ZERO);
    }

    /// Wakes the body.
    pub fn wake(&mut self) {
        self.sleeping = false;
    }

    /// Colliders attached to this body, in attachment order.
    pub fn colliders(&self) -> &[ColliderHandle] {
        &self.colliders
    }

    /// Applies an instantaneous impulse at a world-space point.
    pub fn apply_impulse_at(&mut self, impulse: Vec3, point: Vec3) {
        let r = point.sub(&self.center_of_mass());
        let dv = impulse.scale(self.inverse_mass);
        let dw = self.inverse_inertia_world().mul_elem(&r.cross(&impulse));
        self.set_velocity(self.velocity.add(&dv));
        self.set_angular_velocity(self.angular_velocity.add(&dw));
        self.sleeping = false;
    }

    /// Commits the expected velocities and advances the pose by `dt`,
    /// rotating about the centre of mass.
    pub(crate) fn integrate(&mut self, dt: f32) {
        self.velocity = self.expected_velocity;
        self.angular_velocity = self.expected_angular_velocity;
        let com = self.center_of_mass().add(&self.velocity.scale(dt));
        self.rotation = self.rotation.integrate(self.angular_velocity, dt);
        self.position = com.sub(&self.rotation.rotate(self.com_local));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_mass_is_fixed() {
        let body = Body::new(&BodyDesc::fixed());
        assert!(body.is_fixed());
        assert_eq!(body.inverse_mass(), 0.0);
        assert!(body.mass().is_infinite());
    }

    #[test]
    fn box_inertia_matches_closed_form() {
        let desc = BodyDesc::dynamic(12.0).with_box_inertia(Vec3::new(1.0, 2.0, 3.0));
        assert!(desc.inertia.sub(&Vec3::new(13.0, 10.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn integrate_moves_by_velocity() {
        let mut body = Body::new(&BodyDesc::dynamic(1.0).with_velocity(Vec3::new(2.0, 0.0, 0.0)));
        body.integrate(0.5);
        assert!(body.position().sub(&Vec3::new(1.0, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn off_centre_impulse_spins() {
        let mut body = Body::new(&BodyDesc::dynamic(1.0));
        body.apply_impulse_at(Vec3::UNIT_Z, Vec3::UNIT_X);
        assert!(body.velocity().sub(&Vec3::UNIT_Z).length() < 1e-6);
        // r × J = x × z = -y; unit-cube inertia 1/6 gives ω = -6y.
        assert!(body.angular_velocity().sub(&Vec3::new(0.0, -6.0, 0.0)).length() < 1e-4);
    }
}
