//! 3D Mathematics Library
//!
//! Vector, rotation, matrix and transform types shared by every arplay crate.
//!
//! ## Core Types
//!
//! - [`Vec2`] - screen-space vector
//! - [`Vec3`] - world-space vector (+Y up, -Z forward)
//! - [`Quat`] - unit quaternion rotation
//! - [`Mat4`] - column-major 4x4 matrix, operated on by the [`mat4`] free functions
//! - [`Transform`] - position, rotation and scale
//!
//! Degenerate inputs (zero-length normalisation, division by zero) never
//! panic: they return a neutral value and log a warning.

mod vec2;
mod vec3;
mod quat;
pub mod mat4;
mod transform;

pub use vec2::Vec2;
pub use vec3::Vec3;
pub use quat::Quat;
pub use mat4::Mat4;
pub use transform::Transform;
