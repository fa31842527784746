//! Unit quaternion rotations
//!
//! Components are stored as (x, y, z, w) with `w` the scalar part.

use crate::Vec3;
use bytemuck::{Pod, Zeroable};
use serde::{Serialize, Deserialize};
use std::f32::consts::PI;

/// Quaternion used to represent 3D rotations
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quat {
    /// The identity rotation
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a quaternion from raw components
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Overwrite all components in place
    #[inline]
    pub fn set(&mut self, x: f32, y: f32, z: f32, w: f32) {
        self.x = x;
        self.y = y;
        self.z = z;
        self.w = w;
    }

    /// Rotation of `angle` radians around a unit `axis`
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let half = angle * 0.5;
        let s = half.sin();
        Self::new(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    /// Build a rotation from Euler angles in radians
    ///
    /// `roll` turns around X, `pitch` around Y and `yaw` around Z. The
    /// result is the inverse of [`Quat::to_euler`].
    pub fn from_euler(pitch: f32, yaw: f32, roll: f32) -> Self {
        let (sy, cy) = (yaw * 0.5).sin_cos();
        let (sp, cp) = (pitch * 0.5).sin_cos();
        let (sr, cr) = (roll * 0.5).sin_cos();

        Self::new(
            sr * cp * cy - cr * sp * sy,
            cr * sp * cy + sr * cp * sy,
            cr * cp * sy - sr * sp * cy,
            cr * cp * cy + sr * sp * sy,
        )
    }

    /// Shortest rotation taking direction `from` onto direction `to`
    ///
    /// Opposite directions rotate half a turn around an axis perpendicular
    /// to `from`.
    pub fn from_rotation_arc(from: Vec3, to: Vec3) -> Self {
        let from = from.normalized();
        let to = to.normalized();
        let dot = from.dot(to);

        if dot > 0.999_999 {
            return Self::IDENTITY;
        }

        if dot < -0.999_999 {
            let mut axis = Vec3::X.cross(from);
            if axis.length_squared() < 1e-6 {
                axis = Vec3::Y.cross(from);
            }
            return Self::from_axis_angle(axis.normalized(), PI);
        }

        let axis = from.cross(to);
        let w = (from.length_squared() * to.length_squared()).sqrt() + dot;
        Self::new(axis.x, axis.y, axis.z, w).normalized()
    }

    /// Convert to Euler angles, returned as `(pitch, yaw, roll)`
    pub fn to_euler(self) -> (f32, f32, f32) {
        let sinr_cosp = 2.0 * (self.w * self.x + self.y * self.z);
        let cosr_cosp = 1.0 - 2.0 * (self.x * self.x + self.y * self.y);
        let roll = sinr_cosp.atan2(cosr_cosp);

        let sinp = 2.0 * (self.w * self.y - self.z * self.x);
        let pitch = if sinp.abs() >= 1.0 {
            (PI / 2.0).copysign(sinp)
        } else {
            sinp.asin()
        };

        let siny_cosp = 2.0 * (self.w * self.z + self.x * self.y);
        let cosy_cosp = 1.0 - 2.0 * (self.y * self.y + self.z * self.z);
        let yaw = siny_cosp.atan2(cosy_cosp);

        (pitch, yaw, roll)
    }

    /// Conjugate (inverse for unit quaternions)
    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Four-component dot product
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    #[inline]
    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Normalize to unit length
    ///
    /// A zero quaternion normalizes to [`Quat::IDENTITY`] with a warning.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            log::warn!("Quat::normalized on zero quaternion, returning identity");
            return Self::IDENTITY;
        }
        let inv = 1.0 / len;
        Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
    }

    /// Rotate a vector (q * v * q^-1)
    pub fn rotate_vector(self, v: Vec3) -> Vec3 {
        let qv = Self::new(v.x, v.y, v.z, 0.0);
        let r = self * qv * self.conjugate();
        Vec3::new(r.x, r.y, r.z)
    }

    /// Spherical linear interpolation
    ///
    /// Always takes the short path. Nearly parallel inputs (dot > 0.9995)
    /// fall back to a normalized lerp.
    pub fn slerp(self, other: Self, t: f32) -> Self {
        let mut dot = self.dot(other);
        let mut end = other;
        if dot < 0.0 {
            dot = -dot;
            end = Self::new(-other.x, -other.y, -other.z, -other.w);
        }

        if dot > 0.9995 {
            return Self::new(
                self.x + (end.x - self.x) * t,
                self.y + (end.y - self.y) * t,
                self.z + (end.z - self.z) * t,
                self.w + (end.w - self.w) * t,
            )
            .normalized();
        }

        let theta = dot.acos();
        let sin_theta = theta.sin();
        let wa = ((1.0 - t) * theta).sin() / sin_theta;
        let wb = (t * theta).sin() / sin_theta;

        Self::new(
            self.x * wa + end.x * wb,
            self.y * wa + end.y * wb,
            self.z * wa + end.z * wb,
            self.w * wa + end.w * wb,
        )
    }

    /// Component-wise comparison within `epsilon`
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.x - other.x).abs() < epsilon
            && (self.y - other.y).abs() < epsilon
            && (self.z - other.z).abs() < epsilon
            && (self.w - other.w).abs() < epsilon
    }

    /// True when both represent the same rotation (q and -q are equivalent)
    pub fn same_rotation(self, other: Self, epsilon: f32) -> bool {
        self.dot(other).abs() > 1.0 - epsilon
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    #[inline]
    pub fn from_array(arr: [f32; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }
}

impl std::fmt::Display for Quat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Quat({:.3}, {:.3}, {:.3}, {:.3})", self.x, self.y, self.z, self.w)
    }
}

/// Hamilton product: `a * b` applies `b` first, then `a`
impl std::ops::Mul for Quat {
    type Output = Self;

    fn mul(self, q: Self) -> Self {
        Self::new(
            self.w * q.x + self.x * q.w + self.y * q.z - self.z * q.y,
            self.w * q.y + self.y * q.w + self.z * q.x - self.x * q.z,
            self.w * q.z + self.z * q.w + self.x * q.y - self.y * q.x,
            self.w * q.w - self.x * q.x - self.y * q.y - self.z * q.z,
        )
    }
}

impl std::ops::Mul<Vec3> for Quat {
    type Output = Vec3;

    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        self.rotate_vector(v)
    }
}
