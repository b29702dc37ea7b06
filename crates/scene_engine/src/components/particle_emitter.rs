//! Particle emitter unit
//!
//! Emission parameters only; simulating the particles is the renderer's job.

use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentBase};
use crate::foundation::math::Vec3;

/// Emission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleEmitterComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Particles per second
    pub emission_rate: f32,
    /// Particle lifetime in seconds
    pub lifetime: f32,
    /// Initial speed along the owner's forward axis
    pub start_speed: f32,
    /// Initial particle size
    pub start_size: f32,
    /// Start color (RGB)
    pub start_color: Vec3,
    /// Hard cap on live particles
    pub max_particles: u32,
    /// Restart when the lifetime ends
    pub looping: bool,
    /// Begin emitting when the scene starts playing
    pub play_on_start: bool,
}

impl Default for ParticleEmitterComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            emission_rate: 10.0,
            lifetime: 5.0,
            start_speed: 5.0,
            start_size: 1.0,
            start_color: Vec3::new(1.0, 1.0, 1.0),
            max_particles: 1000,
            looping: true,
            play_on_start: true,
        }
    }
}

impl Component for ParticleEmitterComponent {
    fn type_name(&self) -> &'static str {
        "ParticleSystem"
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
}
