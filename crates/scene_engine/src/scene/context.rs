//! Context handed to component hooks

use crate::components::rigid_body::RigidBodyComponent;
use crate::components::Component;
use crate::foundation::math::{Mat4, Vec3};
use crate::foundation::time::FrameTime;
use crate::scene::entity::{Entity, EntityId, EntityKey};
use crate::scene::error::SceneResult;
use crate::scene::graph::SceneGraph;
use crate::scene::transform::Transform;

/// Access to the owning entity and the rest of the scene during a hook.
///
/// Entities are only removed at the end-of-frame cleanup, after their
/// `on_destroy` hooks have returned, so the owning entity is normally present
/// for the whole call. Accessors still return `Option` rather than panic.
/// Hooks get a read-only view of the graph; structural changes go through
/// [`ComponentContext::add_component`] and the deferred destroy calls. The
/// unit receiving the hook is checked out of its slot and therefore does not
/// show up in its own entity's component list.
pub struct ComponentContext<'a> {
    graph: &'a mut SceneGraph,
    entity: EntityKey,
    time: FrameTime,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(graph: &'a mut SceneGraph, entity: EntityKey, time: FrameTime) -> Self {
        Self { graph, entity, time }
    }

    /// Handle of the owning entity
    pub fn entity_key(&self) -> EntityKey {
        self.entity
    }

    /// Stable id of the owning entity
    pub fn entity_id(&self) -> Option<EntityId> {
        self.entity().map(Entity::id)
    }

    /// Owning entity
    pub fn entity(&self) -> Option<&Entity> {
        self.graph.get(self.entity)
    }

    /// Owning entity, mutably
    pub fn entity_mut(&mut self) -> Option<&mut Entity> {
        self.graph.get_mut(self.entity)
    }

    /// Delta and elapsed time of the current dispatch
    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Owning entity's local pose
    pub fn transform(&self) -> Option<&Transform> {
        self.entity().map(Entity::transform)
    }

    /// Owning entity's local pose, mutably
    pub fn transform_mut(&mut self) -> Option<&mut Transform> {
        self.entity_mut().map(Entity::transform_mut)
    }

    /// Owning entity's world matrix
    pub fn world_matrix(&self) -> Mat4 {
        self.graph.world_matrix(self.entity).unwrap_or_else(Mat4::identity)
    }

    /// Owning entity's world position
    pub fn world_position(&self) -> Vec3 {
        self.graph.world_position(self.entity).unwrap_or_else(Vec3::zeros)
    }

    /// Owning entity's world forward (+Z)
    pub fn forward(&self) -> Vec3 {
        self.graph.forward(self.entity).unwrap_or_else(Vec3::zeros)
    }

    /// First other unit of type `T` on the owning entity
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.entity()?.get_component::<T>()
    }

    /// First other unit of type `T` on the owning entity, mutably
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.entity_mut()?.get_component_mut::<T>()
    }

    /// Rigid body on the owning entity
    pub fn rigid_body_mut(&mut self) -> Option<&mut RigidBodyComponent> {
        self.entity_mut()?.rigid_body_mut()
    }

    /// Append a unit to the owning entity; it starts immediately while playing
    pub fn add_component(&mut self, component: Box<dyn Component>) -> SceneResult<usize> {
        self.graph.add_component(self.entity, component)
    }

    /// Flag the owning entity for end-of-frame removal
    pub fn destroy_self(&mut self) {
        self.graph.destroy(self.entity);
    }

    /// Flag any entity for end-of-frame removal
    pub fn destroy(&mut self, key: EntityKey) {
        self.graph.destroy(key);
    }

    /// Look up an attached entity by name
    pub fn find_by_name(&self, name: &str) -> Option<EntityKey> {
        self.graph.find_by_name(name)
    }

    /// Resolve a stable id
    pub fn find_by_id(&self, id: EntityId) -> Option<EntityKey> {
        self.graph.find_by_id(id)
    }

    /// Whether `key` is still in the scene
    pub fn contains(&self, key: EntityKey) -> bool {
        self.graph.contains(key)
    }

    /// The whole scene graph
    pub fn graph(&self) -> &SceneGraph {
        self.graph
    }
}
