//! # Scene Engine
//!
//! Scene graph, component lifecycle and fixed-timestep physics core for an
//! editable 3D simulation environment.
//!
//! ## Features
//!
//! - **Scene Graph**: Entity hierarchy with lazily cached world transforms
//! - **Components**: Named behavior units with start/update/fixed-update hooks
//! - **Physics**: Rigid body integration, AABB contacts and impulse resolution
//! - **Play Mode**: Snapshot on play, restore on stop
//! - **Persistence**: JSON scene files and runtime exports
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_engine::prelude::*;
//!
//! fn main() -> Result<(), SceneError> {
//!     let mut scene = Scene::new("Demo");
//!
//!     let ground = scene.spawn("Ground");
//!     scene.add_component(ground, Box::new(BoxColliderComponent::new(Vec3::new(10.0, 1.0, 10.0))))?;
//!
//!     let crate_box = scene.spawn("Crate");
//!     if let Some(entity) = scene.graph_mut().get_mut(crate_box) {
//!         entity.transform_mut().set_position(Vec3::new(0.0, 5.0, 0.0));
//!     }
//!     scene.add_component(crate_box, Box::new(RigidBodyComponent::new(1.0)))?;
//!     scene.add_component(crate_box, Box::new(BoxColliderComponent::new(Vec3::new(1.0, 1.0, 1.0))))?;
//!
//!     scene.play()?;
//!     for _ in 0..120 {
//!         scene.update(1.0 / 60.0);
//!     }
//!     scene.stop()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod scene;
pub mod components;
pub mod physics;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        foundation::{
            math::{Vec3, Quat, Mat4},
            time::{FixedTimestep, FrameTime},
        },
        config::{Config, SimulationConfig},
        scene::{
            ComponentContext, Entity, EntityId, EntityKey, Scene, SceneData, SceneError,
            SceneGraph, SceneResult, Transform,
        },
        components::{
            BoxColliderComponent, CameraComponent, CapsuleColliderComponent, Collider, Component,
            ComponentBase, ComponentRegistry, LightComponent, MeshColliderComponent,
            RigidBodyComponent, ScriptComponent, SphereColliderComponent,
        },
        physics::{LayerMask, PhysicsWorld, Ray, RayHit},
    };
}
