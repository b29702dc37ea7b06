//! Per-entity pose with lazily cached matrices
//!
//! A [`Transform`] stores the local pose (position, Euler-degree rotation,
//! scale) and caches both the local matrix and the last computed world matrix.
//! Caches are refreshed on read, never pushed: mutating the pose only flips the
//! dirty flag, and [`SceneGraph::world_matrix`](crate::scene::SceneGraph::world_matrix)
//! walks the ancestor chain and recomputes whatever went stale.
//!
//! Staleness of the world matrix is tracked with stamps. Every recomputation
//! bumps the node's `world_stamp`; a child remembers the parent stamp it was
//! composed against, so a parent that changed since the child's last read is
//! detected without touching the child when the parent moved.

use std::cell::Cell;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Mat4, Vec3};

/// Local pose plus cached local/world matrices
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,

    local_matrix: Cell<Mat4>,
    world_matrix: Cell<Mat4>,
    dirty: Cell<bool>,
    world_valid: Cell<bool>,
    world_stamp: Cell<u64>,
    parent_stamp: Cell<u64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0))
    }
}

impl PartialEq for Transform {
    /// Poses compare equal; caches are ignored
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.rotation == other.rotation
            && self.scale == other.scale
    }
}

impl Transform {
    /// Create a transform from a full pose (rotation in Euler degrees)
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            local_matrix: Cell::new(Mat4::identity()),
            world_matrix: Cell::new(Mat4::identity()),
            dirty: Cell::new(true),
            world_valid: Cell::new(false),
            world_stamp: Cell::new(0),
            parent_stamp: Cell::new(0),
        }
    }

    /// Create from position only
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Local position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation in Euler degrees
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Local scale
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Set local position
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.mark_dirty();
    }

    /// Set local rotation (Euler degrees)
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.mark_dirty();
    }

    /// Set local scale
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.mark_dirty();
    }

    /// Offset the local position
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.mark_dirty();
    }

    /// Offset the local rotation (Euler degrees)
    pub fn rotate(&mut self, delta_degrees: Vec3) {
        self.rotation += delta_degrees;
        self.mark_dirty();
    }

    /// Flag the pose as changed; caches refresh on the next read
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    /// Whether the local pose changed since the matrices were last computed
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Local TRS matrix, recomputed if the pose changed
    pub fn local_matrix(&self) -> Mat4 {
        if self.dirty.get() {
            self.local_matrix
                .set(utils::trs_matrix(&self.position, &self.rotation, &self.scale));
        }
        self.local_matrix.get()
    }

    /// Bring the world cache up to date against the parent's current world matrix.
    ///
    /// `parent_stamp` is the parent's stamp after its own refresh (0 for roots).
    /// Returns the world matrix and this node's stamp.
    pub(crate) fn resolve_world(&self, parent_world: &Mat4, parent_stamp: u64) -> (Mat4, u64) {
        let local_changed = self.dirty.get();
        let local = self.local_matrix();

        if local_changed || !self.world_valid.get() || self.parent_stamp.get() != parent_stamp {
            self.world_matrix.set(parent_world * local);
            self.world_stamp.set(self.world_stamp.get().wrapping_add(1));
            self.parent_stamp.set(parent_stamp);
            self.world_valid.set(true);
            self.dirty.set(false);
        }

        (self.world_matrix.get(), self.world_stamp.get())
    }

    /// Drop the cached world matrix (used when the parent link changes)
    pub(crate) fn invalidate_world(&self) {
        self.world_valid.set(false);
        self.dirty.set(true);
    }

    /// Plain pose values for persistence
    pub fn to_data(&self) -> TransformData {
        TransformData {
            position: self.position.into(),
            rotation: self.rotation.into(),
            scale: self.scale.into(),
        }
    }

    /// Rebuild from persisted pose values; caches start dirty
    pub fn from_data(data: &TransformData) -> Self {
        Self::new(data.position.into(), data.rotation.into(), data.scale.into())
    }
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Serialized pose: cached matrices are never persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformData {
    /// Local position
    #[serde(default)]
    pub position: [f32; 3],
    /// Local rotation in Euler degrees
    #[serde(default)]
    pub rotation: [f32; 3],
    /// Local scale
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
}

impl Default for TransformData {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: default_scale(),
        }
    }
}
