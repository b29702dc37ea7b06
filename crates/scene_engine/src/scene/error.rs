//! Scene-level errors

use crate::scene::entity::{EntityId, EntityKey};
use thiserror::Error;

/// Errors raised by structural scene operations and (de)serialization
#[derive(Error, Debug)]
pub enum SceneError {
    /// The handle does not refer to a live arena slot
    #[error("Entity not found: {0:?}")]
    EntityNotFound(EntityKey),

    /// Re-parenting would make a node its own ancestor
    #[error("Cannot parent entity {child} under {parent}: it would create a cycle")]
    HierarchyCycle {
        /// Entity being moved
        child: EntityId,
        /// Requested new parent
        parent: EntityId,
    },

    /// No component at the requested index
    #[error("Entity {entity} has no component at index {index}")]
    ComponentNotFound {
        /// Owning entity
        entity: EntityId,
        /// Requested slot
        index: usize,
    },

    /// The component is currently executing a hook and cannot be moved
    #[error("Component {index} of entity {entity} is busy dispatching")]
    ComponentBusy {
        /// Owning entity
        entity: EntityId,
        /// Busy slot
        index: usize,
    },

    /// No factory registered under this type name
    #[error("Unknown component type: {0}")]
    UnknownComponentType(String),

    /// A registered type failed to decode its payload
    #[error("Invalid data for component '{type_name}': {source}")]
    InvalidComponentData {
        /// Registered type name
        type_name: String,
        /// Decoder failure
        #[source]
        source: serde_json::Error,
    },

    /// Scene file could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error while reading or writing scene files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Scene result alias
pub type SceneResult<T> = Result<T, SceneError>;
