//! Core types for the arplay engine
//!
//! This crate provides the entity-component-system and the scene graph:
//!
//! - [`Entity`] - Opaque id of a game object
//! - [`ComponentStore`] - Sparse set holding one component kind
//! - [`ComponentKind`] / [`ComponentMask`] - Closed set of component kinds, used for queries
//! - [`System`] - Per-tick logic with a [`Priority`]
//! - [`World`] - Owner of entities, components, systems and the simulation clock
//! - [`Scene`] - Tree of entities with parent/child transforms
//! - [`SceneManager`] - Named scenes with one active at a time

mod entity;
mod component;
pub mod components;
mod system;
mod world;
mod scene;
mod scene_manager;

pub use entity::{Entity, EntityAllocator};
pub use component::{Component, ComponentKind, ComponentMask, ComponentStore, Components};
pub use system::{Priority, System};
pub use world::{HierarchyError, World, WorldStats, DEFAULT_FIXED_TIMESTEP, DEFAULT_MAX_DELTA};
pub use scene::{NodeKey, Scene, SceneError, SceneNode, ROOT_NODE_NAME};
pub use scene_manager::SceneManager;

// Re-export math and collision types carried by components
pub use arplay_math::{Mat4, Quat, Transform, Vec2, Vec3};
pub use arplay_physics::{Collider, ColliderShape};
