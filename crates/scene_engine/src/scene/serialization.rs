//! Scene file format
//!
//! Scenes are stored as JSON. Entities nest their children and units carry
//! their type name next to a free-form payload, so a loader that does not know
//! a unit type can drop just that unit. Only semantic ids are written: arena
//! keys, cached matrices and started flags never reach the file.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::ComponentRegistry;
use crate::foundation::time::DEFAULT_FIXED_DELTA_TIME;
use crate::scene::entity::{EntityId, EntityKey};
use crate::scene::error::{SceneError, SceneResult};
use crate::scene::graph::SceneGraph;
use crate::scene::scene::Environment;
use crate::scene::transform::{Transform, TransformData};

/// Version written into runtime exports
pub const RUNTIME_FORMAT_VERSION: u32 = 1;

fn default_true() -> bool {
    true
}

fn default_fixed_delta_time() -> f32 {
    DEFAULT_FIXED_DELTA_TIME
}

fn default_gravity() -> [f32; 3] {
    [0.0, -9.81, 0.0]
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// Whole scene: settings plus the root entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneData {
    /// Scene name
    #[serde(default)]
    pub name: String,
    /// Seconds per fixed step
    #[serde(default = "default_fixed_delta_time")]
    pub fixed_delta_time: f32,
    /// Global gravity
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 3],
    /// Rendering environment
    #[serde(default)]
    pub environment: Environment,
    /// Root entities, children nested
    #[serde(default)]
    pub entities: Vec<EntityData>,
}

impl Default for SceneData {
    fn default() -> Self {
        Self {
            name: String::new(),
            fixed_delta_time: DEFAULT_FIXED_DELTA_TIME,
            gravity: default_gravity(),
            environment: Environment::default(),
            entities: Vec::new(),
        }
    }
}

/// One entity and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    /// Stable id; a fresh one is assigned when absent or already taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Own active flag
    #[serde(default = "default_true")]
    pub active: bool,
    /// Tags, sorted
    #[serde(default)]
    pub tags: Vec<String>,
    /// Integer layer
    #[serde(default)]
    pub layer: i32,
    /// Local pose
    #[serde(default)]
    pub transform: TransformData,
    /// Units in execution order
    #[serde(default)]
    pub components: Vec<ComponentData>,
    /// Children in order
    #[serde(default)]
    pub children: Vec<EntityData>,
}

impl Default for EntityData {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            active: true,
            tags: Vec::new(),
            layer: 0,
            transform: TransformData::default(),
            components: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// One unit: registry name, enabled flag and type-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    /// Registry name
    #[serde(rename = "type")]
    pub type_name: String,
    /// Enabled flag
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Unit fields
    #[serde(default = "empty_object")]
    pub data: serde_json::Value,
}

impl SceneData {
    /// Pretty JSON text
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON text
    pub fn from_json(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Total entity count including nested children
    pub fn entity_count(&self) -> usize {
        fn count(entities: &[EntityData]) -> usize {
            entities.iter().map(|e| 1 + count(&e.children)).sum()
        }
        count(&self.entities)
    }
}

/// Standalone-runtime bundle: the scene plus every script source verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeExport {
    /// Bundle format version
    #[serde(default)]
    pub format_version: u32,
    /// Serialized scene
    pub scene: SceneData,
    /// Script sources keyed by script asset name
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl RuntimeExport {
    /// Bundle a scene with its script sources
    pub fn new(scene: SceneData, scripts: BTreeMap<String, String>) -> Self {
        Self {
            format_version: RUNTIME_FORMAT_VERSION,
            scene,
            scripts,
        }
    }

    /// Pretty JSON text
    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON text
    pub fn from_json(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> SceneResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Read from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SceneResult<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl SceneGraph {
    /// Serialize every attached root and its subtree
    pub fn to_data(&self) -> SceneResult<Vec<EntityData>> {
        self.roots().iter().map(|&root| self.entity_to_data(root)).collect()
    }

    /// Serialize one entity and its subtree
    pub fn entity_to_data(&self, key: EntityKey) -> SceneResult<EntityData> {
        let entity = self.get(key).ok_or(SceneError::EntityNotFound(key))?;

        let components = entity
            .components()
            .map(|unit| -> SceneResult<ComponentData> {
                Ok(ComponentData {
                    type_name: unit.type_name().to_string(),
                    enabled: unit.base().enabled,
                    data: unit.to_data()?,
                })
            })
            .collect::<SceneResult<Vec<_>>>()?;

        let children = entity
            .children()
            .iter()
            .map(|&child| self.entity_to_data(child))
            .collect::<SceneResult<Vec<_>>>()?;

        Ok(EntityData {
            id: Some(entity.id()),
            name: entity.name.clone(),
            active: entity.is_active(),
            tags: entity.tags().map(str::to_string).collect(),
            layer: entity.layer,
            transform: entity.transform().to_data(),
            components,
            children,
        })
    }

    /// Build an entity subtree from data and attach it below `parent` (or as a root).
    ///
    /// Units whose type is not registered are skipped with a warning; a
    /// registered type with a malformed payload is an error.
    pub fn instantiate(
        &mut self,
        data: &EntityData,
        parent: Option<EntityKey>,
        registry: &ComponentRegistry,
    ) -> SceneResult<EntityKey> {
        let mut units = Vec::with_capacity(data.components.len());
        for component in &data.components {
            match registry.create(&component.type_name, component.data.clone()) {
                Ok(mut unit) => {
                    unit.base_mut().enabled = component.enabled;
                    units.push(unit);
                }
                Err(SceneError::UnknownComponentType(type_name)) => {
                    log::warn!("Skipping unknown component type '{}' on '{}'", type_name, data.name);
                }
                Err(err) => return Err(err),
            }
        }

        let key = self.create_with_id(data.id, data.name.clone());
        if let Some(entity) = self.get_mut(key) {
            entity.set_active_flag(data.active);
            entity.layer = data.layer;
            for tag in &data.tags {
                entity.add_tag(tag.clone());
            }
            entity.replace_transform(Transform::from_data(&data.transform));
        }
        self.set_parent(key, parent)?;

        for unit in units {
            self.add_component(key, unit)?;
        }
        for child in &data.children {
            self.instantiate(child, Some(key), registry)?;
        }
        Ok(key)
    }
}
