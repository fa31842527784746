//! Collider descriptions attached to entities
//!
//! Colliders are defined in the owning entity's local space. Points passed
//! to [`Collider::contains_point`] must already be local.

use arplay_math::Vec3;
use serde::{Serialize, Deserialize};

use crate::shapes::{Aabb, Sphere};

/// Shape of a collider
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    /// Vertical capsule; `height` is the full tip-to-tip length
    Capsule { radius: f32, height: f32 },
}

/// A collision volume with a local offset
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Collider {
    pub shape: ColliderShape,
    pub offset: Vec3,
    /// Triggers report overlaps but are ignored by ray picking
    pub is_trigger: bool,
}

impl Default for Collider {
    fn default() -> Self {
        Self::cube(Vec3::ONE)
    }
}

impl Collider {
    pub fn new(shape: ColliderShape) -> Self {
        Self {
            shape,
            offset: Vec3::ZERO,
            is_trigger: false,
        }
    }

    /// Box collider with full edge lengths `size`
    pub fn cube(size: Vec3) -> Self {
        Self::new(ColliderShape::Box { half_extents: size * 0.5 })
    }

    pub fn sphere(radius: f32) -> Self {
        Self::new(ColliderShape::Sphere { radius })
    }

    pub fn capsule(radius: f32, height: f32) -> Self {
        Self::new(ColliderShape::Capsule { radius, height })
    }

    /// Builder-style offset
    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    /// Builder-style trigger flag
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }

    /// Check whether a local-space point lies inside the collider
    pub fn contains_point(&self, point: Vec3) -> bool {
        let local = point - self.offset;

        match self.shape {
            ColliderShape::Box { half_extents } => {
                Aabb::from_center_half_extents(Vec3::ZERO, half_extents).contains(local)
            }
            ColliderShape::Sphere { radius } => Sphere::new(Vec3::ZERO, radius).contains(local),
            ColliderShape::Capsule { radius, height } => {
                let top = height * 0.5 - radius;
                let bottom = -height * 0.5 + radius;

                if local.y >= bottom && local.y <= top {
                    let radial = (local.x * local.x + local.z * local.z).sqrt();
                    radial <= radius
                } else if local.y > top {
                    Sphere::new(Vec3::new(0.0, top, 0.0), radius).contains(local)
                } else {
                    Sphere::new(Vec3::new(0.0, bottom, 0.0), radius).contains(local)
                }
            }
        }
    }

    /// Radius of a sphere around the local origin enclosing the collider
    pub fn bounding_radius(&self) -> f32 {
        let extent = match self.shape {
            ColliderShape::Box { half_extents } => half_extents.length(),
            ColliderShape::Sphere { radius } => radius,
            ColliderShape::Capsule { radius, height } => (height * 0.5).max(radius),
        };
        extent + self.offset.length()
    }
}
