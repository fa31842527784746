//! Primitive 3D shapes used by ray queries
//!
//! These are lightweight value types, separate from the collider
//! descriptions attached to entities.

use arplay_math::Vec3;
use serde::{Serialize, Deserialize};

/// A sphere defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if a point is inside or on the sphere
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }
}

/// An axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if a point is inside or on the box
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Closest point inside or on the box
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp_components(self.min, self.max)
    }

    /// Outward face normal nearest to a point on the surface
    pub fn surface_normal(&self, point: Vec3) -> Vec3 {
        let local = point - self.center();
        let half = self.half_extents();
        let safe = |v: f32, h: f32| if h > 0.0 { v / h } else { 0.0 };
        let rel = Vec3::new(safe(local.x, half.x), safe(local.y, half.y), safe(local.z, half.z));
        let abs = rel.abs();

        if abs.x >= abs.y && abs.x >= abs.z {
            Vec3::new(rel.x.signum(), 0.0, 0.0)
        } else if abs.y >= abs.z {
            Vec3::new(0.0, rel.y.signum(), 0.0)
        } else {
            Vec3::new(0.0, 0.0, rel.z.signum())
        }
    }
}

/// An infinite plane
///
/// The plane equation is: normal · point = distance
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal vector pointing to the positive side
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    /// Create a plane from a point on the plane and a normal
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.normalized();
        Self {
            normal: n,
            distance: n.dot(point),
        }
    }

    /// Horizontal plane at the given height, facing up
    pub fn horizontal(y: f32) -> Self {
        Self::from_point_normal(Vec3::new(0.0, y, 0.0), Vec3::UP)
    }

    /// Positive above the plane, negative below
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.distance
    }

    /// A point lying on the plane
    pub fn point(&self) -> Vec3 {
        self.normal * self.distance
    }

    pub fn project_point(&self, point: Vec3) -> Vec3 {
        point - self.normal * self.signed_distance(point)
    }
}
