//! 4x4 matrix utilities
//!
//! Matrices are row-major and applied to row vectors: `v' = v * M`. The
//! translation lives in the last row. Composition reads left to right, so
//! `mul(a, b)` is "apply `a`, then `b`".

use crate::{Vec3, Vec4};

/// 4x4 matrix type (row-major, row-vector convention)
pub type Mat4 = [[f32; 4]; 4];

/// Identity matrix
pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Pivots smaller than this make a matrix singular for [`inverse`]
const SINGULAR_EPSILON: f32 = 1e-8;

/// Multiply two 4x4 matrices: result = a * b
///
/// With row vectors, `v * (a * b)` applies `a` first, then `b`.
#[allow(clippy::needless_range_loop)]
pub fn mul(a: Mat4, b: Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];

    for i in 0..4 {
        for j in 0..4 {
            for k in 0..4 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }

    result
}

/// Multiply a chain of matrices left to right
///
/// An empty chain yields [`IDENTITY`].
pub fn mul_chain(chain: &[Mat4]) -> Mat4 {
    chain.iter().fold(IDENTITY, |acc, m| mul(acc, *m))
}

/// Transform a row vector by a matrix: result = v * m
pub fn transform(v: Vec4, m: Mat4) -> Vec4 {
    Vec4::new(
        v.x * m[0][0] + v.y * m[1][0] + v.z * m[2][0] + v.w * m[3][0],
        v.x * m[0][1] + v.y * m[1][1] + v.z * m[2][1] + v.w * m[3][1],
        v.x * m[0][2] + v.y * m[1][2] + v.z * m[2][2] + v.w * m[3][2],
        v.x * m[0][3] + v.y * m[1][3] + v.z * m[2][3] + v.w * m[3][3],
    )
}

/// Invert a matrix with Gauss-Jordan elimination and partial pivoting
///
/// Returns `None` for singular (or numerically near-singular) input.
pub fn inverse(m: Mat4) -> Option<Mat4> {
    let mut a = m;
    let mut inv = IDENTITY;

    for col in 0..4 {
        let mut pivot = col;
        for row in (col + 1)..4 {
            if a[row][col].abs() > a[pivot][col].abs() {
                pivot = row;
            }
        }
        if a[pivot][col].abs() < SINGULAR_EPSILON {
            return None;
        }
        a.swap(col, pivot);
        inv.swap(col, pivot);

        let p = a[col][col];
        for j in 0..4 {
            a[col][j] /= p;
            inv[col][j] /= p;
        }

        for row in 0..4 {
            if row == col {
                continue;
            }
            let f = a[row][col];
            if f == 0.0 {
                continue;
            }
            for j in 0..4 {
                let (aj, ij) = (a[col][j], inv[col][j]);
                a[row][j] -= f * aj;
                inv[row][j] -= f * ij;
            }
        }
    }

    Some(inv)
}

/// Translation by (x, y, z)
pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = IDENTITY;
    m[3][0] = x;
    m[3][1] = y;
    m[3][2] = z;
    m
}

/// Uniform scale
pub fn scale(s: f32) -> Mat4 {
    scale_xyz(s, s, s)
}

/// Non-uniform scale
pub fn scale_xyz(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = IDENTITY;
    m[0][0] = x;
    m[1][1] = y;
    m[2][2] = z;
    m
}

/// Rotation about the X axis (Y toward Z for positive angles)
pub fn rotate_x(angle: f32) -> Mat4 {
    let (sn, cs) = angle.sin_cos();
    let mut m = IDENTITY;
    m[1][1] = cs;
    m[1][2] = sn;
    m[2][1] = -sn;
    m[2][2] = cs;
    m
}

/// Rotation about the Y axis (Z toward X for positive angles)
pub fn rotate_y(angle: f32) -> Mat4 {
    let (sn, cs) = angle.sin_cos();
    let mut m = IDENTITY;
    m[0][0] = cs;
    m[0][2] = -sn;
    m[2][0] = sn;
    m[2][2] = cs;
    m
}

/// Rotation about the Z axis (X toward Y for positive angles)
pub fn rotate_z(angle: f32) -> Mat4 {
    let (sn, cs) = angle.sin_cos();
    let mut m = IDENTITY;
    m[0][0] = cs;
    m[0][1] = sn;
    m[1][0] = -sn;
    m[1][1] = cs;
    m
}

/// Left-handed perspective projection
///
/// `fovy` is the vertical field of view in radians. After the perspective
/// divide, view depth `near` maps to z = 0 and `far` to z = 1, and w carries
/// the view-space depth.
pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let y_scale = 1.0 / (fovy * 0.5).tan();
    let x_scale = y_scale / aspect;
    let depth = far / (far - near);

    [
        [x_scale, 0.0, 0.0, 0.0],
        [0.0, y_scale, 0.0, 0.0],
        [0.0, 0.0, depth, 1.0],
        [0.0, 0.0, -near * depth, 0.0],
    ]
}

/// View matrix looking from `eye` toward `target`
///
/// Builds the orthonormal camera basis with cross products (right = up x
/// forward, then up = forward x right), stores it in the upper 3x3 as
/// columns and the eye translation, expressed in that basis, in the last row.
/// The result maps world space to a camera space whose +Z is the viewing
/// direction.
///
/// Returns `None` when `eye == target` or `up` is parallel to the view
/// direction.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Option<Mat4> {
    let f = (target - eye).normalized();
    if f == Vec3::ZERO {
        return None;
    }
    let s = up.cross(f).normalized();
    if s == Vec3::ZERO {
        return None;
    }
    let u = f.cross(s);

    Some([
        [s.x, u.x, f.x, 0.0],
        [s.y, u.y, f.y, 0.0],
        [s.z, u.z, f.z, 0.0],
        [-s.dot(eye), -u.dot(eye), -f.dot(eye), 1.0],
    ])
}
