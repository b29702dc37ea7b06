//! Audio source unit

use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentBase};

/// Clip reference and playback settings for the audio collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSourceComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Clip asset name
    pub clip: String,
    /// Volume (0..1)
    pub volume: f32,
    /// Pitch multiplier
    pub pitch: f32,
    /// Loop playback
    pub looping: bool,
    /// Start playing when the scene starts
    pub play_on_start: bool,
    /// 0 = 2D, 1 = fully positional
    pub spatial_blend: f32,
}

impl Default for AudioSourceComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            clip: String::new(),
            volume: 1.0,
            pitch: 1.0,
            looping: false,
            play_on_start: true,
            spatial_blend: 0.0,
        }
    }
}

impl Component for AudioSourceComponent {
    fn type_name(&self) -> &'static str {
        "AudioSource"
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
