//! Animator unit

use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentBase};

/// Reference to an animation controller plus playback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Controller asset name
    pub controller: String,
    /// Playback speed multiplier
    pub speed: f32,
    /// Let the animation drive the owner's transform
    pub apply_root_motion: bool,
}

impl Default for AnimatorComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            controller: String::new(),
            speed: 1.0,
            apply_root_motion: false,
        }
    }
}

impl Component for AnimatorComponent {
    fn type_name(&self) -> &'static str {
        "Animator"
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
