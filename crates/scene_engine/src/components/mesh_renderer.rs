//! Mesh renderer unit: asset references only

use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentBase};

/// Mesh and material references drawn at the owner's world matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshRendererComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Mesh asset name
    pub mesh: String,
    /// Material asset name
    pub material: String,
    /// Shadow casting
    pub cast_shadows: bool,
    /// Shadow receiving
    pub receive_shadows: bool,
}

impl Default for MeshRendererComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            mesh: String::new(),
            material: String::from("default"),
            cast_shadows: true,
            receive_shadows: true,
        }
    }
}

impl MeshRendererComponent {
    /// Renderer for a mesh with the default material
    pub fn new(mesh: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            ..Self::default()
        }
    }
}

impl Component for MeshRendererComponent {
    fn type_name(&self) -> &'static str {
        "MeshRenderer"
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
