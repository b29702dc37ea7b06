//! Rigid body unit
//!
//! Holds the dynamic state the physics world integrates each fixed step.
//! Angular quantities are in degrees, matching the transform's Euler angles.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentBase};
use crate::foundation::math::Vec3;

/// Smallest mass a body may have
pub const MIN_MASS: f32 = 1.0e-4;

bitflags! {
    /// Per-axis freeze flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RigidbodyConstraints: u8 {
        /// Lock X translation
        const FREEZE_POSITION_X = 1 << 0;
        /// Lock Y translation
        const FREEZE_POSITION_Y = 1 << 1;
        /// Lock Z translation
        const FREEZE_POSITION_Z = 1 << 2;
        /// Lock rotation about X
        const FREEZE_ROTATION_X = 1 << 3;
        /// Lock rotation about Y
        const FREEZE_ROTATION_Y = 1 << 4;
        /// Lock rotation about Z
        const FREEZE_ROTATION_Z = 1 << 5;
        /// All translation axes
        const FREEZE_POSITION = Self::FREEZE_POSITION_X.bits()
            | Self::FREEZE_POSITION_Y.bits()
            | Self::FREEZE_POSITION_Z.bits();
        /// All rotation axes
        const FREEZE_ROTATION = Self::FREEZE_ROTATION_X.bits()
            | Self::FREEZE_ROTATION_Y.bits()
            | Self::FREEZE_ROTATION_Z.bits();
    }
}

impl RigidbodyConstraints {
    const POSITION_AXES: [Self; 3] = [
        Self::FREEZE_POSITION_X,
        Self::FREEZE_POSITION_Y,
        Self::FREEZE_POSITION_Z,
    ];
    const ROTATION_AXES: [Self; 3] = [
        Self::FREEZE_ROTATION_X,
        Self::FREEZE_ROTATION_Y,
        Self::FREEZE_ROTATION_Z,
    ];

    /// Zero the frozen translation axes of `v`
    pub fn apply_linear(self, v: &mut Vec3) {
        for (axis, flag) in Self::POSITION_AXES.iter().enumerate() {
            if self.contains(*flag) {
                v[axis] = 0.0;
            }
        }
    }

    /// Zero the frozen rotation axes of `v`
    pub fn apply_angular(self, v: &mut Vec3) {
        for (axis, flag) in Self::ROTATION_AXES.iter().enumerate() {
            if self.contains(*flag) {
                v[axis] = 0.0;
            }
        }
    }
}

/// Dynamic body driven by the physics world
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RigidBodyComponent {
    #[serde(skip)]
    base: ComponentBase,

    mass: f32,
    /// Linear drag per second
    pub drag: f32,
    /// Angular drag per second
    pub angular_drag: f32,
    /// Whether global gravity applies
    pub use_gravity: bool,
    /// Gravity multiplier
    pub gravity_scale: f32,
    /// Kinematic bodies are moved only by user code
    pub is_kinematic: bool,
    /// Linear velocity (units/s)
    pub velocity: Vec3,
    /// Angular velocity (degrees/s)
    pub angular_velocity: Vec3,
    /// Frozen axes
    pub constraints: RigidbodyConstraints,

    #[serde(skip)]
    force: Vec3,
    #[serde(skip)]
    impulse: Vec3,
    #[serde(skip)]
    sleeping: bool,
    #[serde(skip)]
    idle_time: f32,
}

impl Default for RigidBodyComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            mass: 1.0,
            drag: 0.0,
            angular_drag: 0.05,
            use_gravity: true,
            gravity_scale: 1.0,
            is_kinematic: false,
            velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            constraints: RigidbodyConstraints::empty(),
            force: Vec3::zeros(),
            impulse: Vec3::zeros(),
            sleeping: false,
            idle_time: 0.0,
        }
    }
}

impl RigidBodyComponent {
    /// Dynamic body with the given mass
    pub fn new(mass: f32) -> Self {
        let mut body = Self::default();
        body.set_mass(mass);
        body
    }

    /// Kinematic body (infinite mass as far as contacts are concerned)
    pub fn kinematic() -> Self {
        Self {
            is_kinematic: true,
            use_gravity: false,
            ..Self::default()
        }
    }

    /// Builder: initial velocity
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    /// Builder: gravity on/off
    #[must_use]
    pub fn with_gravity(mut self, use_gravity: bool) -> Self {
        self.use_gravity = use_gravity;
        self
    }

    /// Mass, never below [`MIN_MASS`]
    pub fn mass(&self) -> f32 {
        if self.mass.is_finite() {
            self.mass.max(MIN_MASS)
        } else {
            MIN_MASS
        }
    }

    /// Set mass; values below [`MIN_MASS`] are clamped
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = if mass.is_finite() { mass.max(MIN_MASS) } else { MIN_MASS };
    }

    /// Inverse mass as seen by contact resolution: 0 for kinematic or disabled bodies
    pub fn inverse_mass(&self) -> f32 {
        if self.is_kinematic || !self.base.enabled {
            0.0
        } else {
            1.0 / self.mass()
        }
    }

    /// Whether the integrator moves this body
    pub fn is_simulated(&self) -> bool {
        self.base.enabled && !self.is_kinematic
    }

    /// Accumulate a force (N) for the next fixed step
    pub fn add_force(&mut self, force: Vec3) {
        self.force += force;
        self.wake_up();
    }

    /// Accumulate an impulse (N·s) for the next fixed step
    pub fn add_impulse(&mut self, impulse: Vec3) {
        self.impulse += impulse;
        self.wake_up();
    }

    /// Force waiting for the next step
    pub fn pending_force(&self) -> Vec3 {
        self.force
    }

    /// Impulse waiting for the next step
    pub fn pending_impulse(&self) -> Vec3 {
        self.impulse
    }

    /// Clear the sleeping state
    pub fn wake_up(&mut self) {
        self.sleeping = false;
        self.idle_time = 0.0;
    }

    /// Whether the body has been idle long enough to count as asleep
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Apply buffered forces, gravity and drag to the velocities, then clear the buffers.
    ///
    /// Returns the linear and angular (degrees) displacement for this step.
    pub fn integrate(&mut self, gravity: &Vec3, dt: f32) -> (Vec3, Vec3) {
        let mass = self.mass();

        let mut total_force = self.force;
        if self.use_gravity {
            total_force += gravity * self.gravity_scale * mass;
        }
        self.velocity += total_force * (dt / mass);
        self.velocity += self.impulse / mass;

        self.velocity *= 1.0 - (self.drag * dt).clamp(0.0, 1.0);
        self.angular_velocity *= 1.0 - (self.angular_drag * dt).clamp(0.0, 1.0);

        self.constraints.apply_linear(&mut self.velocity);
        self.constraints.apply_angular(&mut self.angular_velocity);

        self.force = Vec3::zeros();
        self.impulse = Vec3::zeros();

        (self.velocity * dt, self.angular_velocity * dt)
    }

    /// Advance the idle timer; returns the new state when sleeping flips
    pub fn update_sleep(
        &mut self,
        dt: f32,
        linear_threshold: f32,
        angular_threshold: f32,
        sleep_time: f32,
    ) -> Option<bool> {
        let idle = self.velocity.norm() < linear_threshold
            && self.angular_velocity.norm() < angular_threshold;

        let was_sleeping = self.sleeping;
        if idle {
            self.idle_time += dt;
            if self.idle_time > sleep_time {
                self.sleeping = true;
            }
        } else {
            self.idle_time = 0.0;
            self.sleeping = false;
        }

        (was_sleeping != self.sleeping).then_some(self.sleeping)
    }
}

impl Component for RigidBodyComponent {
    fn type_name(&self) -> &'static str {
        "Rigidbody"
    }

    fn base(&self) -> &ComponentBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ComponentBase {
        &mut self.base
    }

    fn to_data(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn as_rigid_body(&self) -> Option<&RigidBodyComponent> {
        Some(self)
    }

    fn as_rigid_body_mut(&mut self) -> Option<&mut RigidBodyComponent> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gravity_integration() {
        let mut body = RigidBodyComponent::new(2.0);
        let gravity = Vec3::new(0.0, -10.0, 0.0);

        let (displacement, _) = body.integrate(&gravity, 0.1);
        assert_relative_eq!(body.velocity, Vec3::new(0.0, -1.0, 0.0));
        assert_relative_eq!(displacement, Vec3::new(0.0, -0.1, 0.0));
    }

    #[test]
    fn test_impulse_is_consumed_once() {
        let mut body = RigidBodyComponent::new(2.0).with_gravity(false);
        body.add_impulse(Vec3::new(4.0, 0.0, 0.0));

        body.integrate(&Vec3::zeros(), 0.02);
        assert_relative_eq!(body.velocity, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(body.pending_impulse(), Vec3::zeros());

        body.integrate(&Vec3::zeros(), 0.02);
        assert_relative_eq!(body.velocity, Vec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_drag_never_reverses_velocity() {
        let mut body = RigidBodyComponent::new(1.0).with_gravity(false);
        body.drag = 1000.0;
        body.velocity = Vec3::new(5.0, 0.0, 0.0);

        body.integrate(&Vec3::zeros(), 0.02);
        assert_eq!(body.velocity, Vec3::zeros());
    }

    #[test]
    fn test_frozen_axes() {
        let mut body = RigidBodyComponent::new(1.0);
        body.constraints = RigidbodyConstraints::FREEZE_POSITION_Y | RigidbodyConstraints::FREEZE_ROTATION;
        body.angular_velocity = Vec3::new(10.0, 10.0, 10.0);

        body.integrate(&Vec3::new(0.0, -9.81, 0.0), 0.02);
        assert_eq!(body.velocity.y, 0.0);
        assert_eq!(body.angular_velocity, Vec3::zeros());
    }

    #[test]
    fn test_inverse_mass_guards() {
        let mut body = RigidBodyComponent::new(4.0);
        assert_relative_eq!(body.inverse_mass(), 0.25);

        body.is_kinematic = true;
        assert_eq!(body.inverse_mass(), 0.0);

        body.is_kinematic = false;
        body.base_mut().enabled = false;
        assert_eq!(body.inverse_mass(), 0.0);

        body.set_mass(-3.0);
        assert_eq!(body.mass(), MIN_MASS);
    }

    #[test]
    fn test_sleep_after_idle_time() {
        let mut body = RigidBodyComponent::new(1.0);
        let mut transitions = Vec::new();
        for _ in 0..30 {
            if let Some(state) = body.update_sleep(0.02, 0.01, 0.5, 0.5) {
                transitions.push(state);
            }
        }
        assert!(body.is_sleeping());
        assert_eq!(transitions, vec![true]);

        body.add_force(Vec3::new(1.0, 0.0, 0.0));
        assert!(!body.is_sleeping());
    }

    #[test]
    fn test_runtime_state_not_serialized() {
        let mut body = RigidBodyComponent::new(3.0);
        body.add_force(Vec3::new(1.0, 0.0, 0.0));
        let value = body.to_data().unwrap();

        assert!(value.get("force").is_none());
        assert!(value.get("sleeping").is_none());
        assert_eq!(value["mass"], serde_json::json!(3.0));
    }
}
