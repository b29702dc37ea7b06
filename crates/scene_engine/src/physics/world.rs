//! Fixed-step physics over the scene graph
//!
//! The world owns no entities. Each step it walks the active part of the
//! graph, integrates rigid bodies, pairs every collider against every other
//! one, resolves solid contacts and reports enter/exit transitions by
//! comparing this step's touching pairs with the previous step's.

use std::collections::{HashMap, HashSet};

use crate::config::SimulationConfig;
use crate::foundation::math::Vec3;
use crate::foundation::time::FrameTime;
use crate::physics::aabb::{Ray, RayHit, AABB};
use crate::physics::collision_layers::LayerMask;
use crate::physics::contact::{self, Contact, ContactBody, ContactKind, PairKey};
use crate::scene::entity::{EntityId, EntityKey};
use crate::scene::graph::{ContactEvent, SceneGraph};

/// Counters for one fixed step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    /// Bodies moved by the integrator
    pub bodies_integrated: usize,
    /// Collider pairs whose AABBs overlapped
    pub contacts: usize,
    /// Pairs that started touching
    pub enters: usize,
    /// Pairs that stopped touching
    pub exits: usize,
}

/// A collider located by owner and slot
#[derive(Debug, Clone, Copy)]
struct ColliderRef {
    entity: EntityKey,
    id: EntityId,
    index: usize,
}

/// Gravity, contact constants and the set of currently touching pairs
#[derive(Debug, Clone)]
pub struct PhysicsWorld {
    /// Global gravity (m/s²)
    pub gravity: Vec3,
    /// When false, `step` does nothing
    pub enabled: bool,
    /// Restitution for every solid contact
    pub restitution: f32,
    /// Friction coefficient for every solid contact
    pub friction: f32,
    /// Linear idle threshold for sleeping
    pub sleep_linear_threshold: f32,
    /// Angular idle threshold (degrees/s) for sleeping
    pub sleep_angular_threshold: f32,
    /// Idle seconds before a body sleeps
    pub sleep_time: f32,
    touching: HashMap<PairKey, Contact>,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

impl PhysicsWorld {
    /// World configured from simulation settings
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self {
            gravity: config.gravity_vector(),
            enabled: config.physics_enabled,
            restitution: config.restitution,
            friction: config.friction,
            sleep_linear_threshold: config.sleep_linear_threshold,
            sleep_angular_threshold: config.sleep_angular_threshold,
            sleep_time: config.sleep_time,
            touching: HashMap::new(),
        }
    }

    /// Pairs touching after the last step
    pub fn touching_pairs(&self) -> impl Iterator<Item = (&PairKey, &Contact)> {
        self.touching.iter()
    }

    /// Whether two entities were touching after the last step
    pub fn is_touching(&self, a: EntityId, b: EntityId) -> bool {
        self.touching.contains_key(&PairKey::new(a, b))
    }

    /// Forget all touching pairs without firing exits
    pub fn clear_contacts(&mut self) {
        self.touching.clear();
    }

    /// Advance the simulation by one fixed step of `time.delta_time` seconds
    pub fn step(&mut self, graph: &mut SceneGraph, time: FrameTime) -> StepStats {
        let mut stats = StepStats::default();
        if !self.enabled {
            return stats;
        }

        let active = graph.active_entities();
        stats.bodies_integrated = self.integrate(graph, &active, time.delta_time);

        let colliders = Self::gather_colliders(graph, &active);
        let candidates = Self::broad_phase(graph, &colliders);
        stats.contacts = candidates.len();

        let notify = graph.is_live();
        let mut current = HashSet::new();

        // Earlier resolutions may have moved either side, so bounds are
        // recomputed per candidate.
        for (a, b) in candidates {
            let (Some((aabb_a, trigger_a)), Some((aabb_b, trigger_b))) =
                (Self::collider_bounds(graph, a), Self::collider_bounds(graph, b))
            else {
                continue;
            };

            let key = PairKey::new(a.id, b.id);
            let kind = if trigger_a || trigger_b {
                ContactKind::Trigger
            } else {
                ContactKind::Collision
            };
            current.insert(key);

            if !self.touching.contains_key(&key) {
                let (first, second) = if a.id <= b.id { (a.entity, b.entity) } else { (b.entity, a.entity) };
                let contact = Contact { first, second, kind };
                self.touching.insert(key, contact);
                stats.enters += 1;
                log::debug!("Contact enter {} / {} ({:?})", key.first, key.second, kind);
                if notify {
                    let event = match kind {
                        ContactKind::Collision => ContactEvent::CollisionEnter,
                        ContactKind::Trigger => ContactEvent::TriggerEnter,
                    };
                    Self::notify_pair(graph, &contact, event, time);
                }
            }

            if kind == ContactKind::Collision {
                self.resolve_pair(graph, a.entity, aabb_a, b.entity, aabb_b);
            }
        }

        let mut ended: Vec<PairKey> = self
            .touching
            .keys()
            .filter(|key| !current.contains(*key))
            .copied()
            .collect();
        ended.sort_unstable();

        for key in ended {
            let Some(contact) = self.touching.remove(&key) else {
                continue;
            };
            stats.exits += 1;
            log::debug!("Contact exit {} / {} ({:?})", key.first, key.second, contact.kind);
            if notify {
                let event = match contact.kind {
                    ContactKind::Collision => ContactEvent::CollisionExit,
                    ContactKind::Trigger => ContactEvent::TriggerExit,
                };
                Self::notify_pair(graph, &contact, event, time);
            }
        }

        stats
    }

    fn integrate(&self, graph: &mut SceneGraph, active: &[EntityKey], dt: f32) -> usize {
        let mut integrated = 0;
        for &key in active {
            let Some(entity) = graph.get_mut(key) else {
                continue;
            };
            let entity_id = entity.id();
            let Some(body) = entity.rigid_body_mut() else {
                continue;
            };
            if !body.is_simulated() {
                continue;
            }

            let (displacement, rotation) = body.integrate(&self.gravity, dt);
            if let Some(sleeping) = body.update_sleep(
                dt,
                self.sleep_linear_threshold,
                self.sleep_angular_threshold,
                self.sleep_time,
            ) {
                log::trace!("Body {} sleeping: {}", entity_id, sleeping);
            }

            if rotation != Vec3::zeros() {
                entity.transform_mut().rotate(rotation);
            }
            if displacement != Vec3::zeros() {
                let local = Self::world_to_parent_space(graph, key, displacement);
                if let Some(entity) = graph.get_mut(key) {
                    entity.transform_mut().translate(local);
                }
            }
            integrated += 1;
        }
        integrated
    }

    /// Express a world-space offset in the frame `key`'s local position
    /// lives in. Roots and singular parents use the offset unchanged.
    fn world_to_parent_space(graph: &SceneGraph, key: EntityKey, offset: Vec3) -> Vec3 {
        graph
            .parent(key)
            .and_then(|parent| graph.world_matrix(parent))
            .and_then(|matrix| matrix.try_inverse())
            .map_or(offset, |inverse| inverse.transform_vector(&offset))
    }

    /// Every pair of colliders on distinct entities whose bounds overlap at
    /// the current poses
    fn broad_phase(graph: &SceneGraph, colliders: &[ColliderRef]) -> Vec<(ColliderRef, ColliderRef)> {
        let bounds: Vec<Option<AABB>> = colliders
            .iter()
            .map(|&collider| Self::collider_bounds(graph, collider).map(|(aabb, _)| aabb))
            .collect();

        let mut candidates = Vec::new();
        for i in 0..colliders.len() {
            let Some(aabb_a) = &bounds[i] else {
                continue;
            };
            for j in (i + 1)..colliders.len() {
                if colliders[i].entity == colliders[j].entity {
                    continue;
                }
                if bounds[j].as_ref().is_some_and(|aabb_b| aabb_a.intersects(aabb_b)) {
                    candidates.push((colliders[i], colliders[j]));
                }
            }
        }
        candidates
    }

    fn gather_colliders(graph: &SceneGraph, active: &[EntityKey]) -> Vec<ColliderRef> {
        let mut colliders = Vec::new();
        for &key in active {
            if let Some(entity) = graph.get(key) {
                colliders.extend(entity.colliders().map(|(index, _)| ColliderRef {
                    entity: key,
                    id: entity.id(),
                    index,
                }));
            }
        }
        colliders
    }

    /// Fresh world bounds and trigger flag of one collider
    fn collider_bounds(graph: &SceneGraph, collider: ColliderRef) -> Option<(AABB, bool)> {
        let unit = graph.get(collider.entity)?.component(collider.index)?;
        if !unit.base().enabled {
            return None;
        }
        let shape = unit.as_collider()?;
        let position = graph.world_position(collider.entity)?;
        let scale = graph.world_scale(collider.entity)?;
        Some((shape.world_aabb(&position, &scale), shape.is_trigger()))
    }

    fn contact_body(graph: &SceneGraph, key: EntityKey, aabb: AABB) -> ContactBody {
        let body = graph.get(key).and_then(|entity| entity.rigid_body());
        ContactBody {
            aabb,
            inverse_mass: body.map_or(0.0, |b| b.inverse_mass()),
            velocity: body.map_or_else(Vec3::zeros, |b| b.velocity),
        }
    }

    fn resolve_pair(&self, graph: &mut SceneGraph, a: EntityKey, aabb_a: AABB, b: EntityKey, aabb_b: AABB) {
        let body_a = Self::contact_body(graph, a, aabb_a);
        let body_b = Self::contact_body(graph, b, aabb_b);
        let Some(resolution) = contact::resolve(&body_a, &body_b, self.restitution, self.friction) else {
            return;
        };

        Self::apply(graph, a, body_a.inverse_mass, resolution.correction_a, resolution.delta_velocity_a);
        Self::apply(graph, b, body_b.inverse_mass, resolution.correction_b, resolution.delta_velocity_b);
    }

    /// Apply a world-space correction and velocity change to one side of a
    /// contact; the correction is mapped into the parent's frame first.
    fn apply(graph: &mut SceneGraph, key: EntityKey, inverse_mass: f32, correction: Vec3, delta_velocity: Vec3) {
        if inverse_mass <= 0.0 {
            return;
        }
        let local = Self::world_to_parent_space(graph, key, correction);
        let Some(entity) = graph.get_mut(key) else {
            return;
        };
        if let Some(body) = entity.rigid_body_mut() {
            body.velocity += delta_velocity;
        }
        entity.transform_mut().translate(local);
    }

    fn notify_pair(graph: &mut SceneGraph, contact: &Contact, event: ContactEvent, time: FrameTime) {
        if graph.contains(contact.first) {
            graph.dispatch_contact(contact.first, contact.second, event, time);
        }
        if graph.contains(contact.second) {
            graph.dispatch_contact(contact.second, contact.first, event, time);
        }
    }

    /// Nearest collider hit within `max_distance`
    pub fn raycast(&self, graph: &SceneGraph, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        self.raycast_filtered(graph, ray, max_distance, LayerMask::ALL)
    }

    /// Nearest collider hit within `max_distance` on an entity whose layer is in `mask`
    pub fn raycast_filtered(&self, graph: &SceneGraph, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        if ray.direction == Vec3::zeros() {
            return None;
        }

        let mut nearest: Option<RayHit> = None;
        for key in graph.active_entities() {
            let Some(entity) = graph.get(key) else {
                continue;
            };
            if !mask.contains_layer(entity.layer) {
                continue;
            }

            for (index, _) in entity.colliders() {
                let collider = ColliderRef {
                    entity: key,
                    id: entity.id(),
                    index,
                };
                let Some((aabb, _)) = Self::collider_bounds(graph, collider) else {
                    continue;
                };
                let Some((distance, normal)) = aabb.intersect_ray(ray) else {
                    continue;
                };
                if distance > max_distance || nearest.map_or(false, |hit| hit.distance <= distance) {
                    continue;
                }
                nearest = Some(RayHit {
                    entity: key,
                    entity_id: collider.id,
                    component_index: index,
                    distance,
                    point: ray.point_at(distance),
                    normal,
                });
            }
        }
        nearest
    }
}
