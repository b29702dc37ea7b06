//! Entity arena and hierarchy
//!
//! The [`SceneGraph`] owns every entity in a `slotmap` arena. Parent/child
//! links are keys stored on the entities themselves and the root list holds
//! the top of each attached tree. An entity that is neither a root nor below
//! one is *unattached*: it stays in the arena but is never traversed.
//!
//! All lifecycle dispatch goes through [`SceneGraph::with_unit`], which checks
//! the unit out of its slot for the duration of the hook. That lets a hook
//! borrow the whole graph mutably (through its [`ComponentContext`]) while the
//! unit itself is borrowed separately.

use std::collections::HashMap;

use slotmap::SlotMap;

use crate::components::Component;
use crate::foundation::math::{utils, Mat4, Vec3};
use crate::foundation::time::FrameTime;
use crate::scene::context::ComponentContext;
use crate::scene::entity::{Entity, EntityId, EntityKey};
use crate::scene::error::{SceneError, SceneResult};

/// Contact callbacks routed to both entities of a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactEvent {
    /// Two solid colliders started touching
    CollisionEnter,
    /// Two solid colliders stopped touching
    CollisionExit,
    /// A trigger started overlapping
    TriggerEnter,
    /// A trigger stopped overlapping
    TriggerExit,
}

/// Entity arena plus the forest of attached roots
#[derive(Debug)]
pub struct SceneGraph {
    entities: SlotMap<EntityKey, Entity>,
    roots: Vec<EntityKey>,
    id_index: HashMap<EntityId, EntityKey>,
    next_id: u64,
    pending_destroy: Vec<EntityKey>,
    live: bool,
    time: FrameTime,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Empty graph
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            roots: Vec::new(),
            id_index: HashMap::new(),
            next_id: 1,
            pending_destroy: Vec::new(),
            live: false,
            time: FrameTime::default(),
        }
    }

    // ---- Creation ----

    /// Create an unattached entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityKey {
        self.create_with_id(None, name)
    }

    /// Create an entity and attach it as a root
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityKey {
        let key = self.create_entity(name);
        self.roots.push(key);
        key
    }

    /// Create an entity attached below `parent`
    pub fn spawn_child(&mut self, parent: EntityKey, name: impl Into<String>) -> SceneResult<EntityKey> {
        self.require(parent)?;
        let key = self.create_entity(name);
        self.link(parent, key);
        Ok(key)
    }

    /// Create with a requested id; falls back to a fresh id if it is taken
    pub(crate) fn create_with_id(&mut self, id: Option<EntityId>, name: impl Into<String>) -> EntityKey {
        let id = match id {
            Some(id) if !self.id_index.contains_key(&id) => {
                self.next_id = self.next_id.max(id.raw() + 1);
                id
            }
            _ => {
                let id = EntityId::new(self.next_id);
                self.next_id += 1;
                id
            }
        };

        let key = self.entities.insert(Entity::new(id, name));
        self.id_index.insert(id, key);
        key
    }

    // ---- Lookup ----

    /// Whether `key` refers to an entity still in the arena
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    /// Borrow an entity
    pub fn get(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Mutably borrow an entity
    pub fn get_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Number of entities in the arena, attached or not
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the arena is empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Root handles in order
    pub fn roots(&self) -> &[EntityKey] {
        &self.roots
    }

    /// Child handles of `key`
    pub fn children(&self, key: EntityKey) -> &[EntityKey] {
        match self.entities.get(key) {
            Some(entity) => entity.children(),
            None => &[],
        }
    }

    /// Parent handle of `key`
    pub fn parent(&self, key: EntityKey) -> Option<EntityKey> {
        self.entities.get(key).and_then(Entity::parent)
    }

    /// Stable id of `key`
    pub fn entity_id(&self, key: EntityKey) -> Option<EntityId> {
        self.entities.get(key).map(Entity::id)
    }

    /// Resolve a stable id
    pub fn find_by_id(&self, id: EntityId) -> Option<EntityKey> {
        self.id_index.get(&id).copied()
    }

    /// First attached entity with this name, in traversal order
    pub fn find_by_name(&self, name: &str) -> Option<EntityKey> {
        self.reachable_entities()
            .into_iter()
            .find(|&key| self.entities.get(key).map_or(false, |e| e.name == name))
    }

    /// Every attached entity carrying `tag`, in traversal order
    pub fn find_by_tag(&self, tag: &str) -> Vec<EntityKey> {
        self.reachable_entities()
            .into_iter()
            .filter(|&key| self.entities.get(key).map_or(false, |e| e.has_tag(tag)))
            .collect()
    }

    /// Every attached entity in depth-first pre-order, inactive ones included
    pub fn reachable_entities(&self) -> Vec<EntityKey> {
        let mut out = Vec::with_capacity(self.entities.len());
        for &root in &self.roots {
            self.collect_subtree(root, false, &mut out);
        }
        out
    }

    /// Attached entities whose whole ancestor chain is active, in pre-order
    pub fn active_entities(&self) -> Vec<EntityKey> {
        let mut out = Vec::with_capacity(self.entities.len());
        for &root in &self.roots {
            self.collect_subtree(root, true, &mut out);
        }
        out
    }

    /// `key` followed by all of its descendants, in pre-order
    pub fn subtree(&self, key: EntityKey) -> Vec<EntityKey> {
        let mut out = Vec::new();
        self.collect_subtree(key, false, &mut out);
        out
    }

    fn collect_subtree(&self, key: EntityKey, active_only: bool, out: &mut Vec<EntityKey>) {
        let Some(entity) = self.entities.get(key) else {
            return;
        };
        if active_only && !entity.is_active() {
            return;
        }
        out.push(key);
        for &child in entity.children() {
            self.collect_subtree(child, active_only, out);
        }
    }

    /// Whether `key` is a root or hangs below one
    pub fn is_attached(&self, key: EntityKey) -> bool {
        let mut current = key;
        loop {
            match self.entities.get(current) {
                None => return false,
                Some(entity) => match entity.parent() {
                    Some(parent) => current = parent,
                    None => return self.roots.contains(&current),
                },
            }
        }
    }

    /// Whether the entity and all of its ancestors are active
    pub fn is_active_in_hierarchy(&self, key: EntityKey) -> bool {
        let mut current = Some(key);
        while let Some(node) = current {
            match self.entities.get(node) {
                Some(entity) if entity.is_active() => current = entity.parent(),
                _ => return false,
            }
        }
        true
    }

    /// Whether `ancestor` appears on the parent chain of `node`
    pub fn is_ancestor_of(&self, ancestor: EntityKey, node: EntityKey) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    fn require(&self, key: EntityKey) -> SceneResult<&Entity> {
        self.entities.get(key).ok_or(SceneError::EntityNotFound(key))
    }

    // ---- Hierarchy ----

    /// Make `key` a root, detaching it from any parent
    pub fn add_root(&mut self, key: EntityKey) -> SceneResult<()> {
        self.set_parent(key, None)
    }

    /// Attach `child` below `parent`
    pub fn add_child(&mut self, parent: EntityKey, child: EntityKey) -> SceneResult<()> {
        self.set_parent(child, Some(parent))
    }

    /// Detach `child` from `parent`, leaving it unattached.
    ///
    /// Returns `false` if `child` was not a child of `parent`.
    pub fn remove_child(&mut self, parent: EntityKey, child: EntityKey) -> SceneResult<bool> {
        self.require(parent)?;
        if self.require(child)?.parent() != Some(parent) {
            return Ok(false);
        }
        self.unlink(child);
        Ok(true)
    }

    /// Detach `key` from its parent or the root list, leaving it unattached
    pub fn detach(&mut self, key: EntityKey) -> SceneResult<()> {
        self.require(key)?;
        self.unlink(key);
        Ok(())
    }

    /// Re-parent `child` under `parent`, or make it a root when `parent` is `None`.
    ///
    /// The local pose is kept; the world matrix is recomputed on next read.
    pub fn set_parent(&mut self, child: EntityKey, parent: Option<EntityKey>) -> SceneResult<()> {
        let child_id = self.require(child)?.id();

        if let Some(parent) = parent {
            let parent_id = self.require(parent)?.id();
            if parent == child || self.is_ancestor_of(child, parent) {
                let err = SceneError::HierarchyCycle {
                    child: child_id,
                    parent: parent_id,
                };
                log::warn!("{}", err);
                return Err(err);
            }
        }

        self.unlink(child);
        match parent {
            Some(parent) => self.link(parent, child),
            None => {
                self.roots.push(child);
                if let Some(entity) = self.entities.get(child) {
                    entity.transform().invalidate_world();
                }
            }
        }
        Ok(())
    }

    fn link(&mut self, parent: EntityKey, child: EntityKey) {
        if let Some(parent_entity) = self.entities.get_mut(parent) {
            parent_entity.children.push(child);
        }
        if let Some(child_entity) = self.entities.get_mut(child) {
            child_entity.parent = Some(parent);
            child_entity.transform().invalidate_world();
        }
    }

    fn unlink(&mut self, key: EntityKey) {
        let parent = self.entities.get_mut(key).and_then(|entity| entity.parent.take());
        match parent {
            Some(parent) => {
                if let Some(parent_entity) = self.entities.get_mut(parent) {
                    parent_entity.children.retain(|&c| c != key);
                }
            }
            None => self.roots.retain(|&r| r != key),
        }
        if let Some(entity) = self.entities.get(key) {
            entity.transform().invalidate_world();
        }
    }

    // ---- Transforms ----

    /// World matrix of `key`, recomputing stale caches along the ancestor chain
    pub fn world_matrix(&self, key: EntityKey) -> Option<Mat4> {
        self.resolve_world(key).map(|(matrix, _)| matrix)
    }

    fn resolve_world(&self, key: EntityKey) -> Option<(Mat4, u64)> {
        let entity = self.entities.get(key)?;
        let (parent_world, parent_stamp) = match entity.parent() {
            Some(parent) => self.resolve_world(parent)?,
            None => (Mat4::identity(), 0),
        };
        Some(entity.transform().resolve_world(&parent_world, parent_stamp))
    }

    /// World-space position
    pub fn world_position(&self, key: EntityKey) -> Option<Vec3> {
        self.world_matrix(key).map(|m| utils::translation_of(&m))
    }

    /// Lengths of the world basis columns
    pub fn world_scale(&self, key: EntityKey) -> Option<Vec3> {
        self.world_matrix(key).map(|m| {
            Vec3::new(
                utils::basis_column(&m, 0).norm(),
                utils::basis_column(&m, 1).norm(),
                utils::basis_column(&m, 2).norm(),
            )
        })
    }

    /// Normalized world +Z axis
    pub fn forward(&self, key: EntityKey) -> Option<Vec3> {
        self.world_matrix(key).map(|m| utils::safe_normalize(utils::basis_column(&m, 2)))
    }

    /// Normalized world +X axis
    pub fn right(&self, key: EntityKey) -> Option<Vec3> {
        self.world_matrix(key).map(|m| utils::safe_normalize(utils::basis_column(&m, 0)))
    }

    /// Normalized world +Y axis
    pub fn up(&self, key: EntityKey) -> Option<Vec3> {
        self.world_matrix(key).map(|m| utils::safe_normalize(utils::basis_column(&m, 1)))
    }

    /// Flag `key` and every descendant dirty
    pub fn mark_subtree_dirty(&self, key: EntityKey) {
        for node in self.subtree(key) {
            if let Some(entity) = self.entities.get(node) {
                entity.transform().mark_dirty();
            }
        }
    }

    // ---- Components ----

    /// Append a unit to `key`.
    ///
    /// If the scene is playing and the entity is live, `start` runs before
    /// this returns; otherwise it is deferred to the next pass.
    pub fn add_component(&mut self, key: EntityKey, mut component: Box<dyn Component>) -> SceneResult<usize> {
        {
            let base = component.base_mut();
            base.owner = Some(key);
            base.started = false;
        }

        let index = self
            .entities
            .get_mut(key)
            .ok_or(SceneError::EntityNotFound(key))?
            .push_component(component);

        if self.live && self.is_attached(key) && self.is_active_in_hierarchy(key) {
            let time = self.time;
            self.start_unit(key, index, time);
        }
        Ok(index)
    }

    /// Remove the unit at `index`; later units shift down.
    ///
    /// Fails with [`SceneError::ComponentBusy`] while any unit of the entity
    /// is mid-hook, so indices never move under a running dispatch.
    pub fn remove_component(&mut self, key: EntityKey, index: usize) -> SceneResult<Box<dyn Component>> {
        let entity = self.require(key)?;
        let entity_id = entity.id();
        if index >= entity.component_count() {
            return Err(SceneError::ComponentNotFound { entity: entity_id, index });
        }
        if entity.has_busy_slot() {
            return Err(SceneError::ComponentBusy { entity: entity_id, index });
        }

        if self.live {
            let time = self.time;
            self.with_unit(key, index, time, |unit, ctx| {
                if unit.base().started {
                    unit.on_destroy(ctx);
                }
            });
        }

        let mut unit = self
            .entities
            .get_mut(key)
            .and_then(|entity| entity.remove_slot(index))
            .ok_or(SceneError::ComponentBusy { entity: entity_id, index })?;
        unit.base_mut().owner = None;
        Ok(unit)
    }

    /// Enable or disable one unit, firing `on_enable` / `on_disable` while live
    pub fn set_component_enabled(&mut self, key: EntityKey, index: usize, enabled: bool) -> SceneResult<()> {
        let entity = self.require(key)?;
        let entity_id = entity.id();
        if index >= entity.component_count() {
            return Err(SceneError::ComponentNotFound { entity: entity_id, index });
        }

        let unit = self
            .entities
            .get_mut(key)
            .and_then(|entity| entity.component_mut(index))
            .ok_or(SceneError::ComponentBusy { entity: entity_id, index })?;
        if unit.base().enabled == enabled {
            return Ok(());
        }
        unit.base_mut().enabled = enabled;

        if self.live && self.is_attached(key) && self.is_active_in_hierarchy(key) {
            let time = self.time;
            self.with_unit(key, index, time, |unit, ctx| {
                if enabled {
                    unit.on_enable(ctx);
                } else {
                    unit.on_disable(ctx);
                }
            });
        }
        Ok(())
    }

    /// Set an entity's own active flag.
    ///
    /// While live, the enabled units of every entity whose effective state
    /// changed receive `on_enable` / `on_disable`.
    pub fn set_active(&mut self, key: EntityKey, active: bool) -> SceneResult<()> {
        if self.require(key)?.is_active() == active {
            return Ok(());
        }

        let ancestors_active = self.parent(key).map_or(true, |p| self.is_active_in_hierarchy(p));
        let notify = self.live && ancestors_active && self.is_attached(key);

        // Affected nodes: the entity plus descendants that are themselves active.
        let affected = if notify {
            let mut nodes = vec![key];
            for &child in self.children(key) {
                self.collect_subtree(child, true, &mut nodes);
            }
            nodes
        } else {
            Vec::new()
        };

        if let Some(entity) = self.entities.get_mut(key) {
            entity.set_active_flag(active);
        }

        let time = self.time;
        for node in affected {
            self.dispatch_enabled(node, time, |unit, ctx| {
                if active {
                    unit.on_enable(ctx);
                } else {
                    unit.on_disable(ctx);
                }
            });
        }
        Ok(())
    }

    // ---- Destruction ----

    /// Flag `key` for removal at the end of the current frame
    pub fn destroy(&mut self, key: EntityKey) {
        if let Some(entity) = self.entities.get_mut(key) {
            if entity.set_pending_destroy() {
                self.pending_destroy.push(key);
            }
        }
    }

    /// Entities flagged and not yet removed
    pub fn pending_destroy_count(&self) -> usize {
        self.pending_destroy.len()
    }

    /// Remove every flagged entity together with its descendants.
    ///
    /// While live, each removed unit first receives `on_destroy`. Entities
    /// flagged by those hooks are removed in the same call. Returns the number
    /// of entities removed.
    pub(crate) fn flush_destroyed(&mut self) -> usize {
        let mut removed = 0;
        while !self.pending_destroy.is_empty() {
            let pending = std::mem::take(&mut self.pending_destroy);
            for key in pending {
                if !self.entities.contains_key(key) {
                    continue;
                }
                let subtree = self.subtree(key);

                if self.live {
                    let time = self.time;
                    for &node in &subtree {
                        self.dispatch_all(node, time, |unit, ctx| unit.on_destroy(ctx));
                    }
                }

                self.unlink(key);
                for node in subtree {
                    if let Some(entity) = self.entities.remove(node) {
                        self.id_index.remove(&entity.id());
                        removed += 1;
                    }
                }
            }
        }
        if removed > 0 {
            log::debug!("Removed {} destroyed entities", removed);
        }
        removed
    }

    /// Drop every entity without firing hooks
    pub(crate) fn clear(&mut self) {
        self.entities.clear();
        self.roots.clear();
        self.id_index.clear();
        self.pending_destroy.clear();
        self.next_id = 1;
    }

    // ---- Dispatch ----

    pub(crate) fn is_live(&self) -> bool {
        self.live
    }

    pub(crate) fn set_live(&mut self, live: bool) {
        self.live = live;
    }

    pub(crate) fn set_time(&mut self, time: FrameTime) {
        self.time = time;
    }

    /// Time handed to hooks fired outside a pass
    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Run `f` on one unit with a context over this graph.
    ///
    /// Returns `false` if the entity is gone or the slot is already checked out.
    pub(crate) fn with_unit<F>(&mut self, key: EntityKey, index: usize, time: FrameTime, f: F) -> bool
    where
        F: FnOnce(&mut (dyn Component + 'static), &mut ComponentContext<'_>),
    {
        let Some(mut unit) = self.entities.get_mut(key).and_then(|e| e.take_component(index)) else {
            return false;
        };

        {
            let mut ctx = ComponentContext::new(self, key, time);
            f(&mut *unit, &mut ctx);
        }

        if let Some(entity) = self.entities.get_mut(key) {
            entity.restore_component(index, unit);
        }
        true
    }

    fn component_count(&self, key: EntityKey) -> usize {
        self.entities.get(key).map_or(0, Entity::component_count)
    }

    /// Run `f` on every unit of `key`, enabled or not
    fn dispatch_all<F>(&mut self, key: EntityKey, time: FrameTime, f: F)
    where
        F: Fn(&mut (dyn Component + 'static), &mut ComponentContext<'_>),
    {
        for index in 0..self.component_count(key) {
            self.with_unit(key, index, time, &f);
        }
    }

    /// Run `f` on every enabled unit of `key`
    fn dispatch_enabled<F>(&mut self, key: EntityKey, time: FrameTime, f: F)
    where
        F: Fn(&mut (dyn Component + 'static), &mut ComponentContext<'_>),
    {
        for index in 0..self.component_count(key) {
            self.with_unit(key, index, time, |unit, ctx| {
                if unit.base().enabled {
                    f(unit, ctx);
                }
            });
        }
    }

    fn start_unit(&mut self, key: EntityKey, index: usize, time: FrameTime) {
        self.with_unit(key, index, time, |unit, ctx| {
            if unit.base().enabled && !unit.base().started {
                unit.base_mut().started = true;
                unit.start(ctx);
            }
        });
    }

    fn start_pending_units(&mut self, key: EntityKey, time: FrameTime) {
        for index in 0..self.component_count(key) {
            self.start_unit(key, index, time);
        }
    }

    fn is_dispatchable(&self, key: EntityKey) -> bool {
        self.entities
            .get(key)
            .map_or(false, |e| e.is_active() && !e.is_pending_destroy())
    }

    /// Start every enabled, unstarted unit on active attached entities
    pub(crate) fn run_start_pass(&mut self, time: FrameTime) {
        self.time = time;
        for root in self.roots.clone() {
            self.start_subtree(root, time);
        }
    }

    fn start_subtree(&mut self, key: EntityKey, time: FrameTime) {
        if !self.is_dispatchable(key) {
            return;
        }
        self.start_pending_units(key, time);
        for child in self.children(key).to_vec() {
            self.start_subtree(child, time);
        }
    }

    /// Variable-rate pass: start pending units, `update`, then recurse
    pub(crate) fn run_update_pass(&mut self, time: FrameTime) {
        self.time = time;
        for root in self.roots.clone() {
            self.update_subtree(root, time);
        }
    }

    fn update_subtree(&mut self, key: EntityKey, time: FrameTime) {
        if !self.is_dispatchable(key) {
            return;
        }
        self.start_pending_units(key, time);
        self.dispatch_enabled(key, time, |unit, ctx| unit.update(ctx, time.delta_time));
        for child in self.children(key).to_vec() {
            self.update_subtree(child, time);
        }
    }

    /// Fixed-rate pass: `fixed_update` on enabled units of active entities
    pub(crate) fn run_fixed_update_pass(&mut self, time: FrameTime) {
        self.time = time;
        for root in self.roots.clone() {
            self.fixed_update_subtree(root, time);
        }
    }

    fn fixed_update_subtree(&mut self, key: EntityKey, time: FrameTime) {
        if !self.is_dispatchable(key) {
            return;
        }
        self.start_pending_units(key, time);
        self.dispatch_enabled(key, time, |unit, ctx| unit.fixed_update(ctx, time.delta_time));
        for child in self.children(key).to_vec() {
            self.fixed_update_subtree(child, time);
        }
    }

    /// Deliver a contact callback to every enabled unit of `key`
    pub(crate) fn dispatch_contact(&mut self, key: EntityKey, other: EntityKey, event: ContactEvent, time: FrameTime) {
        self.dispatch_enabled(key, time, |unit, ctx| match event {
            ContactEvent::CollisionEnter => unit.on_collision_enter(ctx, other),
            ContactEvent::CollisionExit => unit.on_collision_exit(ctx, other),
            ContactEvent::TriggerEnter => unit.on_trigger_enter(ctx, other),
            ContactEvent::TriggerExit => unit.on_trigger_exit(ctx, other),
        });
    }

    /// Clear every unit's started flag
    pub(crate) fn reset_started_flags(&mut self) {
        for (_, entity) in &mut self.entities {
            for index in 0..entity.component_count() {
                if let Some(unit) = entity.component_mut(index) {
                    unit.base_mut().started = false;
                }
            }
        }
    }
}
