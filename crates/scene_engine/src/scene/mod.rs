//! Scene management system
//!
//! ## Architecture
//!
//! ```text
//! Scene (play mode, clock, persistence)
//!   ├── SceneGraph (entity arena, hierarchy, lifecycle dispatch)
//!   │     └── Entity (transform, tags, behavior units)
//!   └── PhysicsWorld (integration, contacts, raycasts)
//! ```
//!
//! Entities are addressed by [`EntityKey`] at runtime and by the persistent
//! [`EntityId`] in saved scenes.

pub mod transform;
pub mod entity;
pub mod graph;
pub mod context;
#[allow(clippy::module_inception)]
pub mod scene;
pub mod serialization;
pub mod error;

pub use transform::{Transform, TransformData};
pub use entity::{Entity, EntityId, EntityKey};
pub use graph::{ContactEvent, SceneGraph};
pub use context::ComponentContext;
pub use scene::{Environment, FrameStats, Scene};
pub use serialization::{ComponentData, EntityData, RuntimeExport, SceneData, RUNTIME_FORMAT_VERSION};
pub use error::{SceneError, SceneResult};
