//! Behavior units attached to entities
//!
//! Every unit implements [`Component`]: a fixed set of lifecycle hooks, a small
//! shared [`ComponentBase`] and a JSON payload used for persistence. Units are
//! built by name through the [`ComponentRegistry`](registry::ComponentRegistry),
//! and the physics world finds the ones it cares about through the capability
//! accessors ([`Component::as_rigid_body`], [`Component::as_collider`]) rather
//! than by comparing type names.
//!
//! Hooks receive a [`ComponentContext`] that gives access to the owning
//! entity, the rest of the scene and the current frame time. While a hook runs
//! the unit is checked out of its slot, so it can freely reach the other units
//! of its own entity.

use std::any::Any;

use crate::scene::context::ComponentContext;
use crate::scene::entity::EntityKey;

pub mod registry;
pub mod rigid_body;
pub mod collider;
pub mod light;
pub mod camera;
pub mod mesh_renderer;
pub mod particle_emitter;
pub mod animator;
pub mod audio_source;
pub mod script;

pub use registry::{ComponentFactory, ComponentRegistry};
pub use rigid_body::{RigidBodyComponent, RigidbodyConstraints};
pub use collider::{
    BoxColliderComponent, CapsuleColliderComponent, Collider, MeshColliderComponent,
    SphereColliderComponent,
};
pub use light::{LightComponent, LightType};
pub use camera::{CameraComponent, ProjectionMode};
pub use mesh_renderer::MeshRendererComponent;
pub use particle_emitter::ParticleEmitterComponent;
pub use animator::AnimatorComponent;
pub use audio_source::AudioSourceComponent;
pub use script::ScriptComponent;

/// State every unit carries; never persisted except for `enabled`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentBase {
    /// Disabled units receive no hooks
    pub enabled: bool,
    /// Set once `start` has run during the current play session
    pub started: bool,
    /// Owning entity (non-owning back-reference)
    pub owner: Option<EntityKey>,
}

impl Default for ComponentBase {
    fn default() -> Self {
        Self {
            enabled: true,
            started: false,
            owner: None,
        }
    }
}

/// Upcast helper so trait objects can be downcast to their concrete type
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Polymorphic behavior unit
///
/// All hooks default to no-ops. They only fire while the owning scene is
/// playing and the unit is enabled on an active, attached entity.
#[allow(unused_variables)]
pub trait Component: AsAny {
    /// Stable registry name, also written into scene files
    fn type_name(&self) -> &'static str;

    /// Shared unit state
    fn base(&self) -> &ComponentBase;

    /// Shared unit state, mutably
    fn base_mut(&mut self) -> &mut ComponentBase;

    /// Persisted payload (unit-specific fields only)
    fn to_data(&self) -> Result<serde_json::Value, serde_json::Error>;

    /// Runs once before the first update after the unit becomes live
    fn start(&mut self, ctx: &mut ComponentContext<'_>) {}

    /// Variable-rate frame update
    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {}

    /// Fixed-rate update, before the physics step of the same tick
    fn fixed_update(&mut self, ctx: &mut ComponentContext<'_>, fixed_delta_time: f32) {}

    /// The unit or its entity is being removed
    fn on_destroy(&mut self, ctx: &mut ComponentContext<'_>) {}

    /// The unit or its entity became enabled while playing
    fn on_enable(&mut self, ctx: &mut ComponentContext<'_>) {}

    /// The unit or its entity became disabled while playing
    fn on_disable(&mut self, ctx: &mut ComponentContext<'_>) {}

    /// First step two solid colliders touch
    fn on_collision_enter(&mut self, ctx: &mut ComponentContext<'_>, other: EntityKey) {}

    /// First step two solid colliders stop touching
    fn on_collision_exit(&mut self, ctx: &mut ComponentContext<'_>, other: EntityKey) {}

    /// First step a trigger overlaps another collider
    fn on_trigger_enter(&mut self, ctx: &mut ComponentContext<'_>, other: EntityKey) {}

    /// First step a trigger stops overlapping another collider
    fn on_trigger_exit(&mut self, ctx: &mut ComponentContext<'_>, other: EntityKey) {}

    /// Rigid body capability
    fn as_rigid_body(&self) -> Option<&RigidBodyComponent> {
        None
    }

    /// Rigid body capability, mutably
    fn as_rigid_body_mut(&mut self) -> Option<&mut RigidBodyComponent> {
        None
    }

    /// Collider capability
    fn as_collider(&self) -> Option<&dyn Collider> {
        None
    }
}

impl dyn Component {
    /// Downcast to a concrete unit type
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcast to a concrete unit type, mutably
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Whether the unit is of concrete type `T`
    pub fn is<T: Component>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Enabled flag shortcut
    pub fn is_enabled(&self) -> bool {
        self.base().enabled
    }
}

impl std::fmt::Debug for dyn Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.type_name())
            .field("enabled", &self.base().enabled)
            .field("started", &self.base().started)
            .finish()
    }
}
