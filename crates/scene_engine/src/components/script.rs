//! Script unit placeholder
//!
//! Holds a reference to a script asset and its exposed properties. The script
//! runtime supplies the real behavior by registering its own unit types; this
//! variant keeps the reference and properties intact across save and load.

use serde::{Deserialize, Serialize};

use crate::components::{Component, ComponentBase};

/// Script asset reference with user-editable properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptComponent {
    #[serde(skip)]
    base: ComponentBase,
    /// Script asset name; also the key into exported script sources
    pub script: String,
    /// Exposed properties, kept verbatim
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl ScriptComponent {
    /// Reference a script asset
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            ..Self::default()
        }
    }

    /// Builder: set an exposed property
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(name.into(), value);
        self
    }
}

impl Component for ScriptComponent {
    fn type_name(&self) -> &'static str {
        "Script"
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
    fn test_properties_survive_round_trip() {
        let script = ScriptComponent::new("player_controller")
            .with_property("speed", serde_json::json!(4.5));

        let value = script.to_data().unwrap();
        let restored: ScriptComponent = serde_json::from_value(value).unwrap();
        assert_eq!(restored.script, "player_controller");
        assert_eq!(restored.properties["speed"], serde_json::json!(4.5));
    }
}
