//! Headless scene runner
//!
//! Loads a JSON scene (or builds a small demo scene), enters play mode, steps
//! a fixed number of frames and logs contacts and final poses.
//!
//! ```text
//! scene_runner [SCENE.json] [--config RUNNER.toml] [--frames N] [--save OUT.json]
//! ```

use std::path::PathBuf;

use clap::Parser;
use scene_engine::components::{
    BoxColliderComponent, Component, ComponentBase, ComponentRegistry, LightComponent,
    RigidBodyComponent, SphereColliderComponent,
};
use scene_engine::config::{Config, ConfigError, Deserialize, Serialize, SimulationConfig};
use scene_engine::foundation::logging;
use scene_engine::foundation::math::Vec3;
use scene_engine::scene::{ComponentContext, EntityKey, Scene, SceneData, SceneError};

/// Runner settings, loadable from TOML or RON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Frames to simulate
    pub frames: u32,
    /// Variable frame delta fed to `Scene::update`
    pub frame_delta_time: f32,
    /// Log a progress line every N frames (0 disables)
    pub report_every: u32,
    /// Physics and stepping parameters
    pub simulation: SimulationConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            frames: 300,
            frame_delta_time: 1.0 / 60.0,
            report_every: 60,
            simulation: SimulationConfig::default(),
        }
    }
}

impl Config for RunnerConfig {}

#[derive(thiserror::Error, Debug)]
enum RunnerError {
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Spins its entity around local Y
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Spinner {
    #[serde(skip)]
    base: ComponentBase,
    degrees_per_second: f32,
}

impl Component for Spinner {
    fn type_name(&self) -> &'static str {
        "Spinner"
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

    fn update(&mut self, ctx: &mut ComponentContext<'_>, delta_time: f32) {
        if let Some(transform) = ctx.transform_mut() {
            transform.rotate(Vec3::new(0.0, self.degrees_per_second * delta_time, 0.0));
        }
    }

    fn on_collision_enter(&mut self, ctx: &mut ComponentContext<'_>, other: EntityKey) {
        let name_of = |key| ctx.graph().get(key).map_or("?", |entity| entity.name.as_str());
        log::info!("'{}' hit '{}'", name_of(ctx.entity_key()), name_of(other));
    }
}

/// Step a scene headlessly and log what happened
#[derive(Parser, Debug)]
#[command(name = "scene_runner", version, about)]
struct Args {
    /// JSON scene file; a demo scene is built when omitted
    #[arg(value_name = "SCENE.json")]
    scene: Option<PathBuf>,

    /// Runner settings (TOML or RON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured frame count
    #[arg(long, value_name = "N")]
    frames: Option<u32>,

    /// Write the end-of-run state as a JSON scene
    #[arg(long, value_name = "FILE")]
    save: Option<PathBuf>,
}

fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::with_builtins();
    registry.register::<Spinner>("Spinner");
    registry
}

/// Ground, a falling crate, a spinning sphere and a light
fn demo_scene(config: &SimulationConfig) -> Result<Scene, SceneError> {
    let mut scene = Scene::with_config("Demo", config);
    *scene.registry_mut() = registry();

    let ground = scene.spawn("Ground");
    scene.add_component(ground, Box::new(BoxColliderComponent::new(Vec3::new(20.0, 1.0, 20.0))))?;

    let crate_box = scene.spawn("Crate");
    if let Some(entity) = scene.graph_mut().get_mut(crate_box) {
        entity.transform_mut().set_position(Vec3::new(0.0, 4.0, 0.0));
        entity.add_tag("dynamic");
    }
    scene.add_component(crate_box, Box::new(RigidBodyComponent::new(2.0)))?;
    scene.add_component(crate_box, Box::new(BoxColliderComponent::default()))?;
    scene.add_component(
        crate_box,
        Box::new(Spinner {
            degrees_per_second: 90.0,
            ..Spinner::default()
        }),
    )?;

    let ball = scene.graph_mut().spawn_child(crate_box, "Ball")?;
    if let Some(entity) = scene.graph_mut().get_mut(ball) {
        entity.transform_mut().set_position(Vec3::new(1.5, 0.0, 0.0));
    }
    scene.add_component(ball, Box::new(SphereColliderComponent::new(0.25).trigger()))?;

    let sun = scene.spawn("Sun");
    if let Some(entity) = scene.graph_mut().get_mut(sun) {
        entity.transform_mut().set_rotation(Vec3::new(50.0, -30.0, 0.0));
    }
    scene.add_component(sun, Box::new(LightComponent::directional(Vec3::new(1.0, 0.95, 0.9), 1.2)))?;

    Ok(scene)
}

fn log_poses(scene: &Scene) {
    let graph = scene.graph();
    for key in graph.reachable_entities() {
        let (Some(entity), Some(position)) = (graph.get(key), graph.world_position(key)) else {
            continue;
        };
        log::info!(
            "{} '{}' at ({:.3}, {:.3}, {:.3})",
            entity.id(),
            entity.name,
            position.x,
            position.y,
            position.z
        );
    }
}

fn run(args: &Args) -> Result<(), RunnerError> {
    let mut config = match &args.config {
        Some(path) => RunnerConfig::load_from_file(path)?,
        None => RunnerConfig::default(),
    };
    if let Some(frames) = args.frames {
        config.frames = frames;
    }

    let mut scene = match &args.scene {
        Some(path) => {
            log::info!("Loading scene from {}", path.display());
            let data = SceneData::load(path)?;
            Scene::from_data(&data, registry(), &config.simulation)?
        }
        None => {
            log::info!("No scene given; building demo scene");
            demo_scene(&config.simulation)?
        }
    };
    log::info!(
        "Scene '{}': {} entities, fixed dt {:.4}s",
        scene.name(),
        scene.graph().len(),
        scene.fixed_delta_time()
    );

    scene.play()?;
    let mut enters = 0;
    let mut exits = 0;
    for frame in 1..=config.frames {
        let stats = scene.update(config.frame_delta_time);
        enters += stats.contacts_entered;
        exits += stats.contacts_exited;
        if config.report_every > 0 && frame % config.report_every == 0 {
            log::info!(
                "Frame {}: t={:.2}s, {} fixed steps, {} touching pairs",
                frame,
                scene.elapsed_time(),
                scene.fixed_step_count(),
                scene.physics().touching_pairs().count()
            );
        }
    }

    log::info!("Contacts: {} entered, {} exited", enters, exits);
    log_poses(&scene);

    if let Some(path) = &args.save {
        scene.save(path)?;
        log::info!("Saved end-of-run state to {}", path.display());
    }

    scene.stop()?;
    Ok(())
}

fn main() {
    let args = Args::parse();
    logging::init();
    log::info!("Starting scene runner");

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
