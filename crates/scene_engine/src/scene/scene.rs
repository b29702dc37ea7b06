//! Scene: entity forest, simulation clock and play mode
//!
//! A [`Scene`] ties the [`SceneGraph`] to a [`PhysicsWorld`] and a
//! [`FixedTimestep`]. While playing, each [`Scene::update`] runs as many fixed
//! steps as the accumulated time allows (fixed dispatch, then physics), then
//! one variable-rate update pass, then the end-of-frame destroy cleanup.
//!
//! Entering play serializes the whole scene; stopping discards the live state
//! and rebuilds the scene from that snapshot.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentRegistry};
use crate::config::SimulationConfig;
use crate::foundation::math::Vec3;
use crate::foundation::time::{FixedTimestep, FrameTime};
use crate::physics::aabb::{Ray, RayHit};
use crate::physics::collision_layers::LayerMask;
use crate::physics::world::PhysicsWorld;
use crate::scene::entity::EntityKey;
use crate::scene::error::SceneResult;
use crate::scene::graph::SceneGraph;
use crate::scene::serialization::{RuntimeExport, SceneData};

/// Rendering environment; the simulation never reads it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    /// Ambient light color
    pub ambient_color: [f32; 3],
    /// Ambient light intensity
    pub ambient_intensity: f32,
    /// Fog on/off
    pub fog_enabled: bool,
    /// Fog color
    pub fog_color: [f32; 3],
    /// Exponential fog density
    pub fog_density: f32,
    /// Skybox asset name
    pub skybox: Option<String>,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            ambient_color: [0.2, 0.2, 0.25],
            ambient_intensity: 1.0,
            fog_enabled: false,
            fog_color: [0.5, 0.5, 0.5],
            fog_density: 0.01,
            skybox: None,
        }
    }
}

/// What one call to [`Scene::update`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Fixed steps consumed
    pub fixed_steps: u32,
    /// Contact pairs that started touching
    pub contacts_entered: usize,
    /// Contact pairs that stopped touching
    pub contacts_exited: usize,
    /// Entities removed by the destroy cleanup
    pub destroyed: usize,
}

/// Entity forest plus simulation state
#[derive(Debug)]
pub struct Scene {
    name: String,
    graph: SceneGraph,
    physics: PhysicsWorld,
    timestep: FixedTimestep,
    environment: Environment,
    registry: ComponentRegistry,
    playing: bool,
    snapshot: Option<SceneData>,
}

impl Scene {
    /// Empty scene with default simulation settings
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, &SimulationConfig::default())
    }

    /// Empty scene with the given simulation settings
    pub fn with_config(name: impl Into<String>, config: &SimulationConfig) -> Self {
        Self {
            name: name.into(),
            graph: SceneGraph::new(),
            physics: PhysicsWorld::from_config(config),
            timestep: FixedTimestep::new(config.fixed_delta_time),
            environment: Environment::default(),
            registry: ComponentRegistry::with_builtins(),
            playing: false,
            snapshot: None,
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the scene
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Entity graph
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Entity graph, mutably
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Physics world
    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    /// Physics world, mutably
    pub fn physics_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.physics
    }

    /// Rendering environment
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Rendering environment, mutably
    pub fn environment_mut(&mut self) -> &mut Environment {
        &mut self.environment
    }

    /// Unit registry used when loading and restoring
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Unit registry, mutably (register script types here)
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Global gravity
    pub fn gravity(&self) -> Vec3 {
        self.physics.gravity
    }

    /// Set global gravity
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.physics.gravity = gravity;
    }

    /// Seconds per fixed step
    pub fn fixed_delta_time(&self) -> f32 {
        self.timestep.fixed_delta_time()
    }

    /// Change the fixed step size
    pub fn set_fixed_delta_time(&mut self, fixed_delta_time: f32) {
        self.timestep.set_fixed_delta_time(fixed_delta_time);
    }

    /// Simulated seconds since play started
    pub fn elapsed_time(&self) -> f64 {
        self.timestep.elapsed()
    }

    /// Fixed steps run since play started
    pub fn fixed_step_count(&self) -> u64 {
        self.timestep.step_count()
    }

    /// Whether hooks and physics are running
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether a play session exists (playing or paused)
    pub fn is_in_play_mode(&self) -> bool {
        self.snapshot.is_some()
    }

    // ---- Convenience over the graph ----

    /// Create a root entity
    pub fn spawn(&mut self, name: impl Into<String>) -> EntityKey {
        self.graph.spawn(name)
    }

    /// Append a unit to an entity
    pub fn add_component(&mut self, key: EntityKey, component: Box<dyn Component>) -> SceneResult<usize> {
        self.graph.add_component(key, component)
    }

    /// Flag an entity for end-of-frame removal
    pub fn destroy(&mut self, key: EntityKey) {
        self.graph.destroy(key);
    }

    /// Nearest collider along a ray
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        self.physics.raycast(&self.graph, ray, max_distance)
    }

    /// Nearest collider along a ray on the given layers
    pub fn raycast_filtered(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<RayHit> {
        self.physics.raycast_filtered(&self.graph, ray, max_distance, mask)
    }

    // ---- Play mode ----

    /// Enter play mode.
    ///
    /// Snapshots the scene, resets the clock and every started flag, then
    /// runs `start` on all live units. Calling `play` while paused resumes
    /// without taking a new snapshot.
    pub fn play(&mut self) -> SceneResult<()> {
        if self.playing {
            return Ok(());
        }
        if self.snapshot.is_some() {
            self.set_playing(true);
            log::info!("Scene '{}' resumed", self.name);
            return Ok(());
        }

        let snapshot = self.to_data()?;
        log::info!(
            "Scene '{}' entering play ({} entities in snapshot)",
            self.name,
            snapshot.entity_count()
        );
        self.snapshot = Some(snapshot);

        self.timestep.reset();
        self.physics.clear_contacts();
        self.graph.reset_started_flags();
        self.set_playing(true);
        self.graph.run_start_pass(FrameTime::default());
        Ok(())
    }

    /// Toggle the playing flag without touching any state.
    ///
    /// Only meaningful in play mode; outside it the call is ignored.
    pub fn pause(&mut self) {
        if self.snapshot.is_none() {
            log::debug!("Scene '{}' is not in play mode; pause ignored", self.name);
            return;
        }
        let playing = !self.playing;
        self.set_playing(playing);
        log::info!("Scene '{}' {}", self.name, if playing { "playing" } else { "paused" });
    }

    /// Leave play mode and restore the snapshot taken by [`Scene::play`]
    pub fn stop(&mut self) -> SceneResult<()> {
        self.set_playing(false);
        let Some(snapshot) = self.snapshot.take() else {
            return Ok(());
        };
        self.load_data(&snapshot)?;
        log::info!("Scene '{}' stopped; restored {} entities", self.name, snapshot.entity_count());
        Ok(())
    }

    fn set_playing(&mut self, playing: bool) {
        self.playing = playing;
        self.graph.set_live(playing);
    }

    /// Advance the simulation by a frame of `delta_time` seconds
    pub fn update(&mut self, delta_time: f32) -> FrameStats {
        let mut stats = FrameStats::default();
        if !self.playing {
            return stats;
        }

        let delta_time = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };
        self.timestep.accumulate(delta_time);

        let fixed_delta_time = self.timestep.fixed_delta_time();
        while self.timestep.consume_step() {
            let time = FrameTime {
                delta_time: fixed_delta_time,
                elapsed: self.timestep.elapsed(),
            };
            self.graph.run_fixed_update_pass(time);
            let step = self.physics.step(&mut self.graph, time);
            stats.fixed_steps += 1;
            stats.contacts_entered += step.enters;
            stats.contacts_exited += step.exits;
        }
        if stats.fixed_steps > 0 {
            log::trace!("Ran {} fixed steps", stats.fixed_steps);
        }

        self.graph.run_update_pass(FrameTime {
            delta_time,
            elapsed: self.timestep.elapsed(),
        });
        stats.destroyed = self.graph.flush_destroyed();
        stats
    }

    // ---- Persistence ----

    /// Serialize the scene
    pub fn to_data(&self) -> SceneResult<SceneData> {
        Ok(SceneData {
            name: self.name.clone(),
            fixed_delta_time: self.timestep.fixed_delta_time(),
            gravity: self.physics.gravity.into(),
            environment: self.environment.clone(),
            entities: self.graph.to_data()?,
        })
    }

    /// Replace the whole scene content with `data`; no hooks fire
    pub fn load_data(&mut self, data: &SceneData) -> SceneResult<()> {
        self.graph.clear();
        self.physics.clear_contacts();
        self.timestep.reset();

        self.name = data.name.clone();
        self.timestep.set_fixed_delta_time(data.fixed_delta_time);
        self.physics.gravity = data.gravity.into();
        self.environment = data.environment.clone();

        for entity in &data.entities {
            self.graph.instantiate(entity, None, &self.registry)?;
        }
        Ok(())
    }

    /// Build a scene from data with the given registry and simulation settings
    pub fn from_data(data: &SceneData, registry: ComponentRegistry, config: &SimulationConfig) -> SceneResult<Self> {
        let mut scene = Self::with_config(data.name.clone(), config);
        scene.registry = registry;
        scene.load_data(data)?;
        Ok(scene)
    }

    /// Save as a JSON scene file
    pub fn save(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        self.to_data()?.save(path)
    }

    /// Load a JSON scene file with the built-in registry and default settings
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        let data = SceneData::load(path)?;
        Self::from_data(&data, ComponentRegistry::with_builtins(), &SimulationConfig::default())
    }

    /// Bundle the scene with script sources for the standalone runtime
    pub fn export_runtime(&self, scripts: BTreeMap<String, String>) -> SceneResult<RuntimeExport> {
        Ok(RuntimeExport::new(self.to_data()?, scripts))
    }
}
