// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Colliders: a local shape, a pose relative to its body and a material.

use tracing::warn;
use tumble_geom::{Capsule, Obb, Shape, Sphere, Transform};
use tumble_math::Vec3;

use crate::handle::BodyHandle;
use crate::material::{CollisionMode, Material};

/// Local shape description.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColliderShape {
    /// Box of full `size`.
    Box {
        /// Full edge lengths.
        size: Vec3,
    },
    /// Sphere.
    Sphere {
        /// Radius.
        radius: f32,
    },
    /// Capsule along the local Y axis.
    Capsule {
        /// Radius of the caps and the cylinder.
        radius: f32,
        /// Distance between the two cap centres.
        height: f32,
    },
}

fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() {
        v.abs()
    } else {
        0.0
    }
}

impl ColliderShape {
    /// Box of full `size`.
    pub fn cuboid(size: Vec3) -> Self {
        Self::Box { size }.normalized()
    }

    /// Sphere of `radius`.
    pub fn ball(radius: f32) -> Self {
        Self::Sphere { radius }.normalized()
    }

    /// Capsule with cap centres `height` apart.
    pub fn capsule(radius: f32, height: f32) -> Self {
        Self::Capsule { radius, height }.normalized()
    }

    /// Whether every dimension is finite.
    pub fn is_finite(&self) -> bool {
        match *self {
            Self::Box { size } => size.is_finite(),
            Self::Sphere { radius } => radius.is_finite(),
            Self::Capsule { radius, height } => radius.is_finite() && height.is_finite(),
        }
    }

    /// Absolute dimensions; non-finite dimensions collapse to zero.
    pub fn normalized(self) -> Self {
        if !self.is_finite() {
            warn!(shape = ?self, "non-finite collider dimensions replaced with zero");
        }
        match self {
            Self::Box { size } => Self::Box {
                size: Vec3::new(finite_or_zero(size.x()), finite_or_zero(size.y()), finite_or_zero(size.z())),
            },
            Self::Sphere { radius } => Self::Sphere { radius: finite_or_zero(radius) },
            Self::Capsule { radius, height } => Self::Capsule {
                radius: finite_or_zero(radius),
                height: finite_or_zero(height),
            },
        }
    }

    /// World-space shape at `pose`.
    pub fn at(&self, pose: &Transform) -> Shape {
        match *self {
            Self::Box { size } => Obb::new(pose.translation(), pose.rotation(), size).into(),
            Self::Sphere { radius } => Sphere::new(pose.translation(), radius).into(),
            Self::Capsule { radius, height } => Capsule::new(pose.translation(), pose.rotation(), radius, height).into(),
        }
    }
}

/// Construction parameters for a collider.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColliderDesc {
    /// Local shape.
    pub shape: ColliderShape,
    /// Owning body; `None` makes the collider static geometry.
    pub body: Option<BodyHandle>,
    /// Pose relative to the body, or world pose when static.
    pub pose: Transform,
    /// Surface coefficients.
    pub material: Material,
    /// Participation in detection.
    pub mode: CollisionMode,
    /// Disabled colliders are skipped entirely.
    pub enabled: bool,
}

impl ColliderDesc {
    /// A solid, enabled, static collider at the origin.
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            body: None,
            pose: Transform::identity(),
            material: Material::default(),
            mode: CollisionMode::Solid,
            enabled: true,
        }
    }

    /// Attaches the collider to `body`.
    pub fn with_body(mut self, body: BodyHandle) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets the local (or world, when static) pose.
    pub fn with_pose(mut self, pose: Transform) -> Self {
        self.pose = pose;
        self
    }

    /// Sets the translation part of the pose.
    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.pose = Transform::new(translation, self.pose.rotation());
        self
    }

    /// Sets the material.
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Sets the collision mode.
    pub fn with_mode(mut self, mode: CollisionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Creates the collider disabled.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A collider stored in the world registry.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    body: Option<BodyHandle>,
    shape: ColliderShape,
    pose: Transform,
    material: Material,
    mode: CollisionMode,
    enabled: bool,
}

impl Collider {
    pub(crate) fn new(desc: &ColliderDesc) -> Self {
        Self {
            body: desc.body,
            shape: desc.shape.normalized(),
            pose: desc.pose,
            material: desc.material,
            mode: desc.mode,
            enabled: desc.enabled,
        }
    }

    /// Owning body, if any.
    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    /// `true` for colliders without a body.
    pub fn is_static(&self) -> bool {
        self.body.is_none()
    }

    /// Local shape.
    pub fn shape(&self) -> ColliderShape {
        self.shape
    }

    /// Replaces the shape (normalised).
    pub fn set_shape(&mut self, shape: ColliderShape) {
        self.shape = shape.normalized();
    }

    /// Pose relative to the body, or world pose when static.
    pub fn pose(&self) -> Transform {
        self.pose
    }

    /// Replaces the pose.
    pub fn set_pose(&mut self, pose: Transform) {
        self.pose = pose;
    }

    /// Surface coefficients.
    pub fn material(&self) -> Material {
        self.material
    }

    /// Replaces the material.
    pub fn set_material(&mut self, material: Material) {
        self.material = material;
    }

    /// Participation in detection.
    pub fn mode(&self) -> CollisionMode {
        self.mode
    }

    /// Replaces the collision mode.
    pub fn set_mode(&mut self, mode: CollisionMode) {
        self.mode = mode;
    }

    /// Whether the collider takes part in the next step.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables or disables the collider.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// `true` when the collider should be fed to the pipeline.
    pub(crate) fn is_active(&self) -> bool {
        self.enabled && self.mode != CollisionMode::Ignore
    }

    /// World pose given the owning body's pose.
    pub fn world_pose(&self, body_pose: Option<&Transform>) -> Transform {
        body_pose.map_or(self.pose, |p| p.compose(&self.pose))
    }

    /// World-space shape given the owning body's pose.
    pub fn world_shape(&self, body_pose: Option<&Transform>) -> Shape {
        self.shape.at(&self.world_pose(body_pose))
    }
}
