//! Camera unit

use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentBase};
use crate::foundation::math::{utils, Mat4};

/// Projection kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionMode {
    /// Perspective projection using `fov`
    Perspective,
    /// Orthographic projection using `orthographic_size`
    Orthographic,
}

/// View parameters read by the rendering collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Projection kind
    pub projection: ProjectionMode,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Half-height of the orthographic view volume
    pub orthographic_size: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Whether this is the scene's main camera
    pub is_main: bool,
}

impl Default for CameraComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            projection: ProjectionMode::Perspective,
            fov: 60.0,
            orthographic_size: 5.0,
            near: 0.1,
            far: 1000.0,
            is_main: false,
        }
    }
}

impl CameraComponent {
    /// Projection matrix for the given aspect ratio (width / height)
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect > 0.0 { aspect } else { 1.0 };
        match self.projection {
            ProjectionMode::Perspective => {
                Mat4::new_perspective(aspect, utils::deg_to_rad(self.fov), self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_h = self.orthographic_size;
                let half_w = half_h * aspect;
                Mat4::new_orthographic(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        }
    }
}

impl Component for CameraComponent {
    fn type_name(&self) -> &'static str {
        "Camera"
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
