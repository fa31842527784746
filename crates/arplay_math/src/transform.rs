//! 3D Transform (position, rotation, scale)

use crate::{mat4, Mat4, Quat, Vec3};
use serde::{Serialize, Deserialize};

/// A 3D transform with position, rotation, and per-axis scale
///
/// Points are mapped by scale, then rotation, then translation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Create an identity transform
    pub const fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    pub const fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self { position, rotation, scale }
    }

    /// Create a transform with just a position
    pub const fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// Builder-style uniform scale
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::new(scale, scale, scale);
        self
    }

    /// Builder-style rotation
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Local-to-parent matrix (`T * R * S`)
    pub fn to_matrix(&self) -> Mat4 {
        mat4::compose(self.position, self.rotation, self.scale)
    }

    /// Recover a transform from an affine matrix
    pub fn from_matrix(m: Mat4) -> Self {
        let (position, rotation, scale) = mat4::decompose(m);
        Self { position, rotation, scale }
    }

    /// Local -Z expressed in parent space
    pub fn forward(&self) -> Vec3 {
        self.rotation.rotate_vector(Vec3::FORWARD)
    }

    pub fn up(&self) -> Vec3 {
        self.rotation.rotate_vector(Vec3::UP)
    }

    pub fn right(&self) -> Vec3 {
        self.rotation.rotate_vector(Vec3::RIGHT)
    }

    /// Orient so that local -Z points at `target`
    ///
    /// When the view direction is parallel to `up`, world forward (-Z) is
    /// used as the reference up instead, then +X if that is parallel too.
    /// Looking at the current position leaves the rotation unchanged.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let Some(forward) = (target - self.position).try_normalized() else {
            log::debug!("look_at target coincides with position, keeping rotation");
            return;
        };

        let mut right = forward.cross(up);
        if right.length_squared() < 1e-12 {
            log::debug!("look_at forward is parallel to up, using -Z as reference");
            right = forward.cross(Vec3::FORWARD);
            if right.length_squared() < 1e-12 {
                log::debug!("look_at forward is parallel to -Z, using +X as reference");
                right = forward.cross(Vec3::X);
            }
        }
        let right = right.normalized();
        let true_up = right.cross(forward);

        let back = -forward;
        let basis: Mat4 = [
            [right.x, right.y, right.z, 0.0],
            [true_up.x, true_up.y, true_up.z, 0.0],
            [back.x, back.y, back.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let (_, rotation, _) = mat4::decompose(basis);
        self.rotation = rotation.normalized();
    }

    /// Move by an offset in parent space
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Move by an offset in local space
    pub fn translate_local(&mut self, offset: Vec3) {
        self.position += self.rotation.rotate_vector(offset);
    }

    /// Apply a rotation in local space
    pub fn rotate(&mut self, q: Quat) {
        self.rotation = (self.rotation * q).normalized();
    }

    /// Orbit `point` around `axis` by `angle` radians, turning with it
    pub fn rotate_around(&mut self, point: Vec3, axis: Vec3, angle: f32) {
        let q = Quat::from_axis_angle(axis.normalized(), angle);
        self.position = point + q.rotate_vector(self.position - point);
        self.rotation = (q * self.rotation).normalized();
    }

    pub fn scale_uniform(&mut self, factor: f32) {
        self.scale *= factor;
    }

    /// Transform a point from local space to parent space
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        self.rotation.rotate_vector(p.component_mul(self.scale)) + self.position
    }

    /// Transform a direction; translation is not applied
    pub fn transform_direction(&self, d: Vec3) -> Vec3 {
        self.rotation.rotate_vector(d.component_mul(self.scale))
    }

    /// Map a parent-space point back into local space
    ///
    /// Axes with zero scale collapse to 0.
    pub fn inverse_transform_point(&self, p: Vec3) -> Vec3 {
        let local = self.rotation.conjugate().rotate_vector(p - self.position);
        let inv = |v: f32, s: f32| if s != 0.0 { v / s } else { 0.0 };
        Vec3::new(
            inv(local.x, self.scale.x),
            inv(local.y, self.scale.y),
            inv(local.z, self.scale.z),
        )
    }

    /// Compose two transforms: `self` is the parent, `child` is local to it
    pub fn compose(&self, child: &Transform) -> Transform {
        Transform {
            position: self.transform_point(child.position),
            rotation: (self.rotation * child.rotation).normalized(),
            scale: self.scale.component_mul(child.scale),
        }
    }

    /// Interpolate position and scale linearly, rotation spherically
    pub fn lerp(&self, other: &Transform, t: f32) -> Transform {
        Transform {
            position: self.position.lerp(other.position, t),
            rotation: self.rotation.slerp(other.rotation, t),
            scale: self.scale.lerp(other.scale, t),
        }
    }

    pub fn approx_eq(&self, other: &Transform, epsilon: f32) -> bool {
        self.position.approx_eq(other.position, epsilon)
            && self.rotation.same_rotation(other.rotation, epsilon)
            && self.scale.approx_eq(other.scale, epsilon)
    }
}
