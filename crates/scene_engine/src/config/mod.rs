//! Configuration system
//!
//! Simulation tuning lives in a [`SimulationConfig`] that can be read from and
//! written to TOML or RON files. Every default reproduces the engine's fixed
//! physics constants, so an absent config file changes nothing.

use std::path::Path;

pub use serde::{Serialize, Deserialize};

use crate::foundation::math::Vec3;
use crate::foundation::time::DEFAULT_FIXED_DELTA_TIME;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match extension_of(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension_of(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }

    /// Load configuration, falling back to defaults when the file is missing or invalid
    fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default configuration ({}): {}", path.display(), e);
                Self::default()
            }
        }
    }
}

fn extension_of(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Physics and stepping parameters for a scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seconds per fixed physics step
    pub fixed_delta_time: f32,
    /// Global gravity (m/s²)
    pub gravity: [f32; 3],
    /// Whether the physics world steps at all
    pub physics_enabled: bool,
    /// Coefficient of restitution used for every contact
    pub restitution: f32,
    /// Coulomb friction coefficient used for every contact
    pub friction: f32,
    /// Linear speed below which a body counts as idle
    pub sleep_linear_threshold: f32,
    /// Angular speed (degrees/s) below which a body counts as idle
    pub sleep_angular_threshold: f32,
    /// Seconds a body must stay idle before it is marked sleeping
    pub sleep_time: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            fixed_delta_time: DEFAULT_FIXED_DELTA_TIME,
            gravity: [0.0, -9.81, 0.0],
            physics_enabled: true,
            restitution: 0.2,
            friction: 0.5,
            sleep_linear_threshold: 0.01,
            sleep_angular_threshold: 0.5,
            sleep_time: 0.5,
        }
    }
}

impl SimulationConfig {
    /// Gravity as a vector
    pub fn gravity_vector(&self) -> Vec3 {
        Vec3::new(self.gravity[0], self.gravity[1], self.gravity[2])
    }
}

impl Config for SimulationConfig {}
