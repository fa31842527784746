//! 4x4 matrix utilities for 3D affine and projective transforms
//!
//! Matrices are column-major, indexed `m[col][row]`, so `m[3]` holds the
//! translation column. Composition follows the usual convention: `mul(a, b)`
//! applies `b` first, then `a`.

use crate::{Quat, Vec3};

/// 4x4 matrix type (column-major)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Pure translation matrix
pub fn translation(t: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[3][0] = t.x;
    m[3][1] = t.y;
    m[3][2] = t.z;
    m
}

/// Rotation matrix for a unit quaternion
pub fn rotation(q: Quat) -> Mat4 {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);
    let (x2, y2, z2) = (x + x, y + y, z + z);
    let (xx, xy, xz) = (x * x2, x * y2, x * z2);
    let (yy, yz, zz) = (y * y2, y * z2, z * z2);
    let (wx, wy, wz) = (w * x2, w * y2, w * z2);

    [
        [1.0 - (yy + zz), xy + wz, xz - wy, 0.0],
        [xy - wz, 1.0 - (xx + zz), yz + wx, 0.0],
        [xz + wy, yz - wx, 1.0 - (xx + yy), 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Non-uniform scale matrix
pub fn scaling(s: Vec3) -> Mat4 {
    let mut m = IDENTITY;
    m[0][0] = s.x;
    m[1][1] = s.y;
    m[2][2] = s.z;
    m
}

/// Build `T * R * S` from position, rotation and scale
pub fn compose(position: Vec3, rot: Quat, scale: Vec3) -> Mat4 {
    let mut m = rotation(rot);
    for (col, s) in [scale.x, scale.y, scale.z].into_iter().enumerate() {
        m[col][0] *= s;
        m[col][1] *= s;
        m[col][2] *= s;
    }
    m[3][0] = position.x;
    m[3][1] = position.y;
    m[3][2] = position.z;
    m
}

/// Split an affine matrix into position, rotation and scale
///
/// Scale comes from the basis column lengths. Rotation uses the trace
/// method, branching on the largest diagonal term so the square root
/// argument never gets close to zero.
pub fn decompose(m: Mat4) -> (Vec3, Quat, Vec3) {
    let position = get_translation(m);

    let sx = get_column(m, 0).length();
    let sy = get_column(m, 1).length();
    let sz = get_column(m, 2).length();
    let scale = Vec3::new(sx, sy, sz);

    let inv_sx = if sx != 0.0 { 1.0 / sx } else { 0.0 };
    let inv_sy = if sy != 0.0 { 1.0 / sy } else { 0.0 };
    let inv_sz = if sz != 0.0 { 1.0 / sz } else { 0.0 };

    // Row/column notation: mRC
    let m11 = m[0][0] * inv_sx;
    let m21 = m[0][1] * inv_sx;
    let m31 = m[0][2] * inv_sx;
    let m12 = m[1][0] * inv_sy;
    let m22 = m[1][1] * inv_sy;
    let m32 = m[1][2] * inv_sy;
    let m13 = m[2][0] * inv_sz;
    let m23 = m[2][1] * inv_sz;
    let m33 = m[2][2] * inv_sz;

    let trace = m11 + m22 + m33;
    let rot = if trace > 0.0 {
        let s = 0.5 / (trace + 1.0).sqrt();
        Quat::new((m32 - m23) * s, (m13 - m31) * s, (m21 - m12) * s, 0.25 / s)
    } else if m11 > m22 && m11 > m33 {
        let s = 2.0 * (1.0 + m11 - m22 - m33).sqrt();
        Quat::new(0.25 * s, (m12 + m21) / s, (m13 + m31) / s, (m32 - m23) / s)
    } else if m22 > m33 {
        let s = 2.0 * (1.0 + m22 - m11 - m33).sqrt();
        Quat::new((m12 + m21) / s, 0.25 * s, (m23 + m32) / s, (m13 - m31) / s)
    } else {
        let s = 2.0 * (1.0 + m33 - m11 - m22).sqrt();
        Quat::new((m13 + m31) / s, (m23 + m32) / s, 0.25 * s, (m21 - m12) / s)
    };

    (position, rot, scale)
}

/// OpenGL-style perspective projection
///
/// `fov_y` is the vertical field of view in radians. Maps view-space depth
/// `[-near, -far]` onto clip-space `[-1, 1]`.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fov_y * 0.5).tan();
    let range_inv = 1.0 / (near - far);

    [
        [f / aspect, 0.0, 0.0, 0.0],
        [0.0, f, 0.0, 0.0],
        [0.0, 0.0, (far + near) * range_inv, -1.0],
        [0.0, 0.0, 2.0 * far * near * range_inv, 0.0],
    ]
}

/// Multiply two 4x4 matrices: result = a * b
///
/// In column-major convention, this applies b first, then a.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[k][j] * b[i][k];
            }
        }
    }

    result
}

/// Transform a point (w = 1), applying the perspective divide
pub fn transform_point(m: Mat4, p: Vec3) -> Vec3 {
    let x = m[0][0] * p.x + m[1][0] * p.y + m[2][0] * p.z + m[3][0];
    let y = m[0][1] * p.x + m[1][1] * p.y + m[2][1] * p.z + m[3][1];
    let z = m[0][2] * p.x + m[1][2] * p.y + m[2][2] * p.z + m[3][2];
    let w = m[0][3] * p.x + m[1][3] * p.y + m[2][3] * p.z + m[3][3];

    if w != 0.0 && w != 1.0 {
        Vec3::new(x / w, y / w, z / w)
    } else {
        Vec3::new(x, y, z)
    }
}

/// Transform a direction (w = 0); translation is ignored
pub fn transform_vector(m: Mat4, v: Vec3) -> Vec3 {
    Vec3::new(
        m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
        m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
        m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
    )
}

/// The xyz part of a column
pub fn get_column(m: Mat4, col: usize) -> Vec3 {
    Vec3::new(m[col][0], m[col][1], m[col][2])
}

/// Translation column
pub fn get_translation(m: Mat4) -> Vec3 {
    Vec3::new(m[3][0], m[3][1], m[3][2])
}

/// Transpose a matrix
pub fn transpose(m: Mat4) -> Mat4 {
    [
        [m[0][0], m[1][0], m[2][0], m[3][0]],
        [m[0][1], m[1][1], m[2][1], m[3][1]],
        [m[0][2], m[1][2], m[2][2], m[3][2]],
        [m[0][3], m[1][3], m[2][3], m[3][3]],
    ]
}

/// 2x2 sub-determinants shared by `determinant` and `invert`
fn minors(m: &Mat4) -> [f32; 12] {
    [
        m[0][0] * m[1][1] - m[0][1] * m[1][0],
        m[0][0] * m[1][2] - m[0][2] * m[1][0],
        m[0][0] * m[1][3] - m[0][3] * m[1][0],
        m[0][1] * m[1][2] - m[0][2] * m[1][1],
        m[0][1] * m[1][3] - m[0][3] * m[1][1],
        m[0][2] * m[1][3] - m[0][3] * m[1][2],
        m[2][0] * m[3][1] - m[2][1] * m[3][0],
        m[2][0] * m[3][2] - m[2][2] * m[3][0],
        m[2][0] * m[3][3] - m[2][3] * m[3][0],
        m[2][1] * m[3][2] - m[2][2] * m[3][1],
        m[2][1] * m[3][3] - m[2][3] * m[3][1],
        m[2][2] * m[3][3] - m[2][3] * m[3][2],
    ]
}

fn det_from_minors(b: &[f32; 12]) -> f32 {
    b[0] * b[11] - b[1] * b[10] + b[2] * b[9] + b[3] * b[8] - b[4] * b[7] + b[5] * b[6]
}

pub fn determinant(m: Mat4) -> f32 {
    det_from_minors(&minors(&m))
}

/// Inverse matrix, or `None` when the matrix is singular
pub fn invert(m: Mat4) -> Option<Mat4> {
    let b = minors(&m);
    let det = det_from_minors(&b);
    if det == 0.0 {
        log::debug!("mat4::invert on singular matrix");
        return None;
    }
    let inv = 1.0 / det;

    Some([
        [
            (m[1][1] * b[11] - m[1][2] * b[10] + m[1][3] * b[9]) * inv,
            (m[0][2] * b[10] - m[0][1] * b[11] - m[0][3] * b[9]) * inv,
            (m[3][1] * b[5] - m[3][2] * b[4] + m[3][3] * b[3]) * inv,
            (m[2][2] * b[4] - m[2][1] * b[5] - m[2][3] * b[3]) * inv,
        ],
        [
            (m[1][2] * b[8] - m[1][0] * b[11] - m[1][3] * b[7]) * inv,
            (m[0][0] * b[11] - m[0][2] * b[8] + m[0][3] * b[7]) * inv,
            (m[3][2] * b[2] - m[3][0] * b[5] - m[3][3] * b[1]) * inv,
            (m[2][0] * b[5] - m[2][2] * b[2] + m[2][3] * b[1]) * inv,
        ],
        [
            (m[1][0] * b[10] - m[1][1] * b[8] + m[1][3] * b[6]) * inv,
            (m[0][1] * b[8] - m[0][0] * b[10] - m[0][3] * b[6]) * inv,
            (m[3][0] * b[4] - m[3][1] * b[2] + m[3][3] * b[0]) * inv,
            (m[2][1] * b[2] - m[2][0] * b[4] - m[2][3] * b[0]) * inv,
        ],
        [
            (m[1][1] * b[7] - m[1][0] * b[9] - m[1][2] * b[6]) * inv,
            (m[0][0] * b[9] - m[0][1] * b[7] + m[0][2] * b[6]) * inv,
            (m[3][1] * b[1] - m[3][0] * b[3] - m[3][2] * b[0]) * inv,
            (m[2][0] * b[3] - m[2][1] * b[1] + m[2][2] * b[0]) * inv,
        ],
    ])
}
