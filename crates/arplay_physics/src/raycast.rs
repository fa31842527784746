//! Ray queries: intersection tests, screen-space picking and closest-hit casts
//!
//! Screen coordinates have their origin at the top-left corner with +Y
//! pointing down, matching pointer events.

use arplay_math::{Vec2, Vec3};
use serde::{Serialize, Deserialize};

use crate::shapes::{Aabb, Plane, Sphere};

/// Denominators below this are treated as a ray parallel to a plane
const PARALLEL_EPSILON: f32 = 1e-6;

/// A half-line with a unit direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; the direction is normalized
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalized(),
        }
    }

    /// Point at parameter `t` along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Distance to the first crossing of a sphere surface
    ///
    /// From inside the sphere the exit point is returned.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.dot(self.direction);
        let b = 2.0 * oc.dot(self.direction);
        let c = oc.dot(oc) - radius * radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 || a == 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let near = (-b - sqrt_d) / (2.0 * a);
        if near > 0.0 {
            return Some(near);
        }
        let far = (-b + sqrt_d) / (2.0 * a);
        (far > 0.0).then_some(far)
    }

    /// Distance to a plane given by a point and normal
    pub fn intersect_plane(&self, point: Vec3, normal: Vec3) -> Option<f32> {
        let denom = normal.dot(self.direction);
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (point - self.origin).dot(normal) / denom;
        (t >= 0.0).then_some(t)
    }

    /// Slab test against an axis-aligned box
    ///
    /// From inside the box the exit distance is returned.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        let origin = self.origin.to_array();
        let dir = self.direction.to_array();
        let lo = min.to_array();
        let hi = max.to_array();

        for axis in 0..3 {
            if dir[axis].abs() < PARALLEL_EPSILON {
                // Parallel to this slab: must already be between its faces
                if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir[axis];
            let mut t0 = (lo[axis] - origin[axis]) * inv;
            let mut t1 = (hi[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        if t_min >= 0.0 {
            Some(t_min)
        } else if t_max >= 0.0 {
            Some(t_max)
        } else {
            None
        }
    }

    pub fn intersect_sphere_shape(&self, sphere: &Sphere) -> Option<f32> {
        self.intersect_sphere(sphere.center, sphere.radius)
    }

    pub fn intersect_plane_shape(&self, plane: &Plane) -> Option<f32> {
        self.intersect_plane(plane.point(), plane.normal)
    }

    pub fn intersect_aabb_shape(&self, aabb: &Aabb) -> Option<f32> {
        self.intersect_aabb(aabb.min, aabb.max)
    }
}

/// Pinhole camera description used for screen/world mapping
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RayCamera {
    pub position: Vec3,
    pub forward: Vec3,
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
}

impl Default for RayCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 1.6, 0.0),
            forward: Vec3::FORWARD,
            up: Vec3::UP,
            fov_y: std::f32::consts::FRAC_PI_3,
        }
    }
}

impl RayCamera {
    pub fn new(position: Vec3, forward: Vec3, up: Vec3, fov_y: f32) -> Self {
        Self { position, forward, up, fov_y }
    }

    /// Orthonormal (forward, right, up) basis
    ///
    /// Falls back to world +X for `right` if forward and up are parallel.
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = self.forward.normalized();
        let right = forward.cross(self.up).try_normalized().unwrap_or(Vec3::RIGHT);
        let up = right.cross(forward).normalized();
        (forward, right, up)
    }
}

/// Build a world-space ray through a screen pixel
pub fn screen_point_to_ray(point: Vec2, width: f32, height: f32, camera: &RayCamera) -> Ray {
    let x = (2.0 * point.x) / width - 1.0;
    let y = 1.0 - (2.0 * point.y) / height;

    let aspect = width / height;
    let tan_half_fov = (camera.fov_y * 0.5).tan();
    let (forward, right, up) = camera.basis();

    let direction = forward + right * (x * aspect * tan_half_fov) + up * (y * tan_half_fov);
    Ray::new(camera.position, direction)
}

/// Project a world point to screen pixels
///
/// Returns `None` for points at or behind the camera plane. Points outside
/// the viewport produce coordinates outside `[0, width] x [0, height]`.
pub fn world_to_screen(world: Vec3, width: f32, height: f32, camera: &RayCamera) -> Option<Vec2> {
    let (forward, right, up) = camera.basis();
    let rel = world - camera.position;
    let depth = rel.dot(forward);
    if depth <= 0.0 {
        return None;
    }

    let aspect = width / height;
    let tan_half_fov = (camera.fov_y * 0.5).tan();
    let x = rel.dot(right) / (depth * aspect * tan_half_fov);
    let y = rel.dot(up) / (depth * tan_half_fov);

    Some(Vec2::new((x + 1.0) * 0.5 * width, (1.0 - y) * 0.5 * height))
}

/// A bounding sphere tagged with caller data
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastTarget<T: Copy> {
    pub center: Vec3,
    pub radius: f32,
    pub id: T,
}

/// Result of a successful cast
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit<T: Copy> {
    pub point: Vec3,
    pub distance: f32,
    pub normal: Vec3,
    pub id: T,
}

/// Closest sphere hit across all candidates
///
/// Ties keep the earlier candidate.
pub fn cast<T: Copy>(ray: &Ray, targets: &[RaycastTarget<T>]) -> Option<RaycastHit<T>> {
    let mut closest: Option<RaycastHit<T>> = None;

    for target in targets {
        let Some(t) = ray.intersect_sphere(target.center, target.radius) else {
            continue;
        };
        if closest.as_ref().is_some_and(|hit| t >= hit.distance) {
            continue;
        }
        let point = ray.at(t);
        closest = Some(RaycastHit {
            point,
            distance: t,
            normal: (point - target.center).try_normalized().unwrap_or(-ray.direction),
            id: target.id,
        });
    }

    closest
}
