//! Type-name to factory table for behavior units

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::components::{
    AnimatorComponent, AudioSourceComponent, BoxColliderComponent, CameraComponent,
    CapsuleColliderComponent, Component, LightComponent, MeshColliderComponent,
    MeshRendererComponent, ParticleEmitterComponent, RigidBodyComponent, ScriptComponent,
    SphereColliderComponent,
};
use crate::scene::error::{SceneError, SceneResult};

/// Builds a unit from its persisted payload
pub type ComponentFactory = fn(serde_json::Value) -> Result<Box<dyn Component>, serde_json::Error>;

fn construct<T: Component + DeserializeOwned>(
    data: serde_json::Value,
) -> Result<Box<dyn Component>, serde_json::Error> {
    Ok(Box::new(serde_json::from_value::<T>(data)?))
}

/// Registry of constructible unit types
#[derive(Clone)]
pub struct ComponentRegistry {
    factories: HashMap<String, ComponentFactory>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.type_names())
            .finish()
    }
}

impl ComponentRegistry {
    /// Empty registry
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registry with every built-in unit type
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register::<MeshRendererComponent>("MeshRenderer");
        registry.register::<LightComponent>("Light");
        registry.register::<CameraComponent>("Camera");
        registry.register::<RigidBodyComponent>("Rigidbody");
        registry.register::<BoxColliderComponent>("BoxCollider");
        registry.register::<SphereColliderComponent>("SphereCollider");
        registry.register::<CapsuleColliderComponent>("CapsuleCollider");
        registry.register::<MeshColliderComponent>("MeshCollider");
        registry.register::<ParticleEmitterComponent>("ParticleSystem");
        registry.register::<AnimatorComponent>("Animator");
        registry.register::<AudioSourceComponent>("AudioSource");
        registry.register::<ScriptComponent>("Script");
        registry
    }

    /// Register a serde-decodable unit type under `type_name`
    ///
    /// The name must match what the type's `type_name()` returns, otherwise
    /// saved scenes will not load back into the same type.
    pub fn register<T: Component + DeserializeOwned>(&mut self, type_name: &str) {
        self.register_factory(type_name, construct::<T>);
    }

    /// Register a hand-written factory; replaces any previous entry
    pub fn register_factory(&mut self, type_name: &str, factory: ComponentFactory) {
        if self.factories.insert(type_name.to_string(), factory).is_some() {
            log::debug!("Replaced component factory for '{}'", type_name);
        }
    }

    /// Whether `type_name` can be constructed
    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build a unit from a payload; missing fields take their defaults
    pub fn create(&self, type_name: &str, data: serde_json::Value) -> SceneResult<Box<dyn Component>> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| SceneError::UnknownComponentType(type_name.to_string()))?;

        let data = if data.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            data
        };

        factory(data).map_err(|source| SceneError::InvalidComponentData {
            type_name: type_name.to_string(),
            source,
        })
    }

    /// Build a unit with all-default fields
    pub fn create_default(&self, type_name: &str) -> SceneResult<Box<dyn Component>> {
        self.create(type_name, serde_json::Value::Null)
    }
}
