//! Physics module for collision detection and response
//!
//! Bounds are axis-aligned boxes derived from each collider's world position
//! and scale. Contacts are found by testing every pair and resolved with an
//! impulse solver; see [`world::PhysicsWorld::step`] for the per-step order.

pub mod aabb;
pub mod collision_layers;
pub mod contact;
pub mod world;

pub use aabb::{Ray, RayHit, AABB};
pub use collision_layers::LayerMask;
pub use contact::{Contact, ContactKind, ContactResolution, PairKey};
pub use world::{PhysicsWorld, StepStats};
