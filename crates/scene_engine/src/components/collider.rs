//! Collider units
//!
//! Four shapes share the [`Collider`] capability. Whatever the shape, the
//! physics world only ever sees the world-space AABB it produces from the
//! owner's world position and scale.

use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentBase};
use crate::foundation::math::Vec3;
use crate::physics::aabb::AABB;

/// Shape-independent collider capability
pub trait Collider {
    /// Triggers report overlaps but are never resolved
    fn is_trigger(&self) -> bool;

    /// Offset from the owner's origin, in local units
    fn center(&self) -> Vec3;

    /// Half-size of the shape's bounds at unit scale
    fn local_half_extents(&self) -> Vec3;

    /// World-space bounds for an owner at `world_position` with `world_scale`
    fn world_aabb(&self, world_position: &Vec3, world_scale: &Vec3) -> AABB {
        let center = world_position + self.center().component_mul(world_scale);
        AABB::from_center_extents(center, self.local_half_extents().component_mul(&world_scale.abs()))
    }
}

fn unit_size() -> Vec3 {
    Vec3::new(1.0, 1.0, 1.0)
}

/// Axis-aligned box
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxColliderComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Trigger flag
    pub is_trigger: bool,
    /// Local offset
    pub center: Vec3,
    /// Full edge lengths
    pub size: Vec3,
}

impl Default for BoxColliderComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            is_trigger: false,
            center: Vec3::zeros(),
            size: unit_size(),
        }
    }
}

impl BoxColliderComponent {
    /// Solid box with the given edge lengths
    pub fn new(size: Vec3) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Builder: trigger flag
    #[must_use]
    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

impl Collider for BoxColliderComponent {
    fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    fn center(&self) -> Vec3 {
        self.center
    }

    fn local_half_extents(&self) -> Vec3 {
        self.size.abs() * 0.5
    }
}

/// Sphere, bounded by its enclosing box
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SphereColliderComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Trigger flag
    pub is_trigger: bool,
    /// Local offset
    pub center: Vec3,
    /// Radius at unit scale
    pub radius: f32,
}

impl Default for SphereColliderComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            is_trigger: false,
            center: Vec3::zeros(),
            radius: 0.5,
        }
    }
}

impl SphereColliderComponent {
    /// Solid sphere
    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    /// Builder: trigger flag
    #[must_use]
    pub fn trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

impl Collider for SphereColliderComponent {
    fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    fn center(&self) -> Vec3 {
        self.center
    }

    fn local_half_extents(&self) -> Vec3 {
        let r = self.radius.abs();
        Vec3::new(r, r, r)
    }

    // Spheres stay spheres: the largest scale axis wins.
    fn world_aabb(&self, world_position: &Vec3, world_scale: &Vec3) -> AABB {
        let center = world_position + self.center.component_mul(world_scale);
        let scale = world_scale.abs().max();
        AABB::from_center_extents(center, self.local_half_extents() * scale)
    }
}

/// Capsule along one local axis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CapsuleColliderComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Trigger flag
    pub is_trigger: bool,
    /// Local offset
    pub center: Vec3,
    /// Cap radius
    pub radius: f32,
    /// Total height including both caps
    pub height: f32,
    /// Long axis: 0 = X, 1 = Y, 2 = Z
    pub direction: usize,
}

impl Default for CapsuleColliderComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            is_trigger: false,
            center: Vec3::zeros(),
            radius: 0.5,
            height: 2.0,
            direction: 1,
        }
    }
}

impl Collider for CapsuleColliderComponent {
    fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    fn center(&self) -> Vec3 {
        self.center
    }

    fn local_half_extents(&self) -> Vec3 {
        let radius = self.radius.abs();
        let mut extents = Vec3::new(radius, radius, radius);
        extents[self.direction.min(2)] = (self.height.abs() * 0.5).max(radius);
        extents
    }
}

/// Mesh collider approximated by the mesh's local bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshColliderComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Trigger flag
    pub is_trigger: bool,
    /// Local offset
    pub center: Vec3,
    /// Mesh asset name
    pub mesh: String,
    /// Whether the mesh is treated as convex
    pub convex: bool,
    /// Half-size of the mesh bounds at unit scale
    pub bounds: Vec3,
}

impl Default for MeshColliderComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            is_trigger: false,
            center: Vec3::zeros(),
            mesh: String::new(),
            convex: false,
            bounds: unit_size() * 0.5,
        }
    }
}

impl Collider for MeshColliderComponent {
    fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    fn center(&self) -> Vec3 {
        self.center
    }

    fn local_half_extents(&self) -> Vec3 {
        self.bounds.abs()
    }
}

macro_rules! collider_component {
    ($ty:ty, $name:literal) => {
        impl Component for $ty {
            fn type_name(&self) -> &'static str {
                $name
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

            fn as_collider(&self) -> Option<&dyn Collider> {
                Some(self)
            }
        }
    };
}

collider_component!(BoxColliderComponent, "BoxCollider");
collider_component!(SphereColliderComponent, "SphereCollider");
collider_component!(CapsuleColliderComponent, "CapsuleCollider");
collider_component!(MeshColliderComponent, "MeshCollider");
