//! Collision shapes and ray queries for arplay
//!
//! This crate provides:
//! - Primitive shapes (spheres, AABBs, planes)
//! - Collider descriptions (box, sphere, capsule) with point containment
//! - Raycasting: intersection tests, screen-to-ray projection and closest-hit casts

pub mod collider;
pub mod raycast;
pub mod shapes;

// Re-export commonly used types
pub use collider::{Collider, ColliderShape};
pub use raycast::{cast, screen_point_to_ray, world_to_screen, Ray, RayCamera, RaycastHit, RaycastTarget};
pub use shapes::{Aabb, Plane, Sphere};
