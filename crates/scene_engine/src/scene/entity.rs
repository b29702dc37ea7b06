//! Entity storage record
//!
//! An [`Entity`] owns its transform and its behavior units. Hierarchy links are
//! arena keys; the [`SceneGraph`](crate::scene::SceneGraph) is the only place
//! that rewires them.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::{collider::Collider, rigid_body::RigidBodyComponent, Component};
use crate::scene::transform::Transform;

slotmap::new_key_type! {
    /// Arena handle for an entity; stays valid until the entity is removed
    pub struct EntityKey;
}

/// Stable, monotonically increasing entity identifier
///
/// Unlike [`EntityKey`] this survives serialization and is what contact pair
/// keys and scene files refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Wrap a raw id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id value
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A slot in the ordered unit list. `None` while the unit is running a hook.
pub(crate) type ComponentSlot = Option<Box<dyn Component>>;

/// Scene node: transform, ordered units, hierarchy links and metadata
pub struct Entity {
    id: EntityId,
    /// Display name
    pub name: String,
    active: bool,
    transform: Transform,
    components: Vec<ComponentSlot>,
    pub(crate) parent: Option<EntityKey>,
    pub(crate) children: Vec<EntityKey>,
    tags: BTreeSet<String>,
    /// Integer layer used for query filtering
    pub layer: i32,
    pending_destroy: bool,
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("components", &self.component_type_names())
            .field("children", &self.children.len())
            .finish()
    }
}

impl Entity {
    pub(crate) fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            transform: Transform::default(),
            components: Vec::new(),
            parent: None,
            children: Vec::new(),
            tags: BTreeSet::new(),
            layer: 0,
            pending_destroy: false,
        }
    }

    /// Stable id
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Own active flag (ancestors are not consulted)
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active_flag(&mut self, active: bool) {
        self.active = active;
    }

    /// Local pose
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Mutable local pose; setters flag the matrix caches dirty
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    pub(crate) fn replace_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    /// Parent handle, if attached below another entity
    pub fn parent(&self) -> Option<EntityKey> {
        self.parent
    }

    /// Child handles in order
    pub fn children(&self) -> &[EntityKey] {
        &self.children
    }

    /// Whether `destroy` was requested and cleanup has not run yet
    pub fn is_pending_destroy(&self) -> bool {
        self.pending_destroy
    }

    pub(crate) fn set_pending_destroy(&mut self) -> bool {
        let newly_flagged = !self.pending_destroy;
        self.pending_destroy = true;
        newly_flagged
    }

    // ---- Tags ----

    /// Add a tag; returns false if it was already present
    pub fn add_tag(&mut self, tag: impl Into<String>) -> bool {
        self.tags.insert(tag.into())
    }

    /// Remove a tag; returns false if it was absent
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    /// Tag membership
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// All tags, sorted
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    // ---- Components ----

    /// Number of unit slots (including any currently running a hook)
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Unit at `index`, or `None` if out of range or currently dispatching
    pub fn component(&self, index: usize) -> Option<&(dyn Component + 'static)> {
        self.components.get(index).and_then(|slot| slot.as_deref())
    }

    /// Mutable unit at `index`
    pub fn component_mut(&mut self, index: usize) -> Option<&mut (dyn Component + 'static)> {
        self.components.get_mut(index).and_then(|slot| slot.as_deref_mut())
    }

    /// Every available unit in execution order
    pub fn components(&self) -> impl Iterator<Item = &(dyn Component + 'static)> {
        self.components.iter().filter_map(|slot| slot.as_deref())
    }

    /// Type names in execution order (busy slots are skipped)
    pub fn component_type_names(&self) -> Vec<&'static str> {
        self.components().map(|c| c.type_name()).collect()
    }

    /// First unit of concrete type `T`
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.components().find_map(|c| c.downcast_ref::<T>())
    }

    /// First unit of concrete type `T`, mutably
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .filter_map(|slot| slot.as_deref_mut())
            .find_map(|c| c.downcast_mut::<T>())
    }

    /// Every unit of concrete type `T`
    pub fn get_components<T: Component>(&self) -> Vec<&T> {
        self.components().filter_map(|c| c.downcast_ref::<T>()).collect()
    }

    /// Index of the first unit of concrete type `T`
    pub fn index_of<T: Component>(&self) -> Option<usize> {
        self.components
            .iter()
            .position(|slot| slot.as_deref().map_or(false, |c| c.downcast_ref::<T>().is_some()))
    }

    /// First rigid body on this entity
    pub fn rigid_body(&self) -> Option<&RigidBodyComponent> {
        self.components().find_map(|c| c.as_rigid_body())
    }

    /// First rigid body on this entity, mutably
    pub fn rigid_body_mut(&mut self) -> Option<&mut RigidBodyComponent> {
        self.components
            .iter_mut()
            .filter_map(|slot| slot.as_deref_mut())
            .find_map(|c| c.as_rigid_body_mut())
    }

    /// Enabled colliders with their slot index
    pub fn colliders(&self) -> impl Iterator<Item = (usize, &dyn Collider)> {
        self.components.iter().enumerate().filter_map(|(index, slot)| {
            let unit = slot.as_deref()?;
            if !unit.base().enabled {
                return None;
            }
            unit.as_collider().map(|collider| (index, collider))
        })
    }

    pub(crate) fn push_component(&mut self, component: Box<dyn Component>) -> usize {
        self.components.push(Some(component));
        self.components.len() - 1
    }

    pub(crate) fn slot_is_busy(&self, index: usize) -> bool {
        matches!(self.components.get(index), Some(None))
    }

    pub(crate) fn has_busy_slot(&self) -> bool {
        self.components.iter().any(Option::is_none)
    }

    /// Take the unit out of its slot for dispatch; the slot stays reserved
    pub(crate) fn take_component(&mut self, index: usize) -> Option<Box<dyn Component>> {
        self.components.get_mut(index).and_then(Option::take)
    }

    /// Put a dispatched unit back into its reserved slot
    pub(crate) fn restore_component(&mut self, index: usize, component: Box<dyn Component>) {
        if let Some(slot) = self.components.get_mut(index) {
            *slot = Some(component);
        }
    }

    /// Remove a slot entirely; later units shift down by one
    pub(crate) fn remove_slot(&mut self, index: usize) -> Option<Box<dyn Component>> {
        if index < self.components.len() && !self.slot_is_busy(index) {
            self.components.remove(index)
        } else {
            None
        }
    }
}
