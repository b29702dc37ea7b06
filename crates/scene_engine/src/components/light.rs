//! Light unit
//!
//! Pure data consumed by the rendering collaborator. Direction and position
//! come from the owning entity's world transform, so neither is stored here.

use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentBase};
use crate::foundation::math::Vec3;

/// Types of lights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightType {
    /// Parallel rays along the owner's forward axis
    Directional,
    /// Radiates in all directions from the owner's position
    Point,
    /// Cone along the owner's forward axis
    Spot,
}

/// Light source parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Light kind
    pub light_type: LightType,
    /// Linear RGB color (0..1)
    pub color: Vec3,
    /// Intensity multiplier
    pub intensity: f32,
    /// Falloff distance for point and spot lights
    pub range: f32,
    /// Spot cone angle in degrees
    pub spot_angle: f32,
    /// Whether the light casts shadows
    pub cast_shadows: bool,
}

impl Default for LightComponent {
    fn default() -> Self {
        Self {
            base: ComponentBase::default(),
            light_type: LightType::Directional,
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            range: 10.0,
            spot_angle: 30.0,
            cast_shadows: true,
        }
    }
}

impl LightComponent {
    /// Directional light
    pub fn directional(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            ..Self::default()
        }
    }

    /// Point light with a falloff range
    pub fn point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            light_type: LightType::Point,
            color,
            intensity,
            range,
            ..Self::default()
        }
    }

    /// Spot light with a cone angle in degrees
    pub fn spot(color: Vec3, intensity: f32, range: f32, spot_angle: f32) -> Self {
        Self {
            light_type: LightType::Spot,
            color,
            intensity,
            range,
            spot_angle,
            ..Self::default()
        }
    }
}

impl Component for LightComponent {
    fn type_name(&self) -> &'static str {
        "Light"
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_factories() {
        let point = LightComponent::point(Vec3::new(1.0, 0.5, 0.0), 2.0, 15.0);
        assert_eq!(point.light_type, LightType::Point);
        assert_eq!(point.range, 15.0);

        let spot = LightComponent::spot(Vec3::new(1.0, 1.0, 1.0), 1.0, 5.0, 45.0);
        assert_eq!(spot.light_type, LightType::Spot);
        assert_eq!(spot.spot_angle, 45.0);
    }

    #[test]
    fn test_missing_fields_default() {
        let light: LightComponent = serde_json::from_str(r#"{"light_type":"Point"}"#).unwrap();
        assert_eq!(light.light_type, LightType::Point);
        assert_eq!(light.intensity, 1.0);
        assert!(light.base().enabled);
    }
}
