//! Homogeneous 4D vector type

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::{Vec3, EPSILON};

/// Homogeneous vector: points carry w = 1, directions w = 0
///
/// Positions carry w=1 and directions w=0. Colors reuse the type as RGBA with
/// components nominally in `[0, 1]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vec4 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0, w: 1.0 };
    pub const X: Self = Self { x: 1.0, y: 0.0, z: 0.0, w: 0.0 };
    pub const Y: Self = Self { x: 0.0, y: 1.0, z: 0.0, w: 0.0 };
    pub const Z: Self = Self { x: 0.0, y: 0.0, z: 1.0, w: 0.0 };
    pub const W: Self = Self { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Create a new Vec4
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Affine point (w = 1)
    #[inline]
    pub const fn point(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    /// Direction (w = 0)
    #[inline]
    pub const fn direction(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 0.0 }
    }

    /// Dot product over all four components
    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Dot product over xyz only
    #[inline]
    pub fn dot3(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product of the xyz parts; the result is a direction (w = 0)
    #[inline]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
            0.0,
        )
    }

    /// Squared length over all four components
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Length (magnitude)
    #[inline]
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Normalize to unit length
    ///
    /// Vectors shorter than [`EPSILON`] normalize to zero instead of
    /// blowing up.
    #[inline]
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len > EPSILON {
            self * (1.0 / len)
        } else {
            Self::ZERO
        }
    }

    /// Perspective divide: x, y and z divided by w, w set to 1
    ///
    /// Returns `None` when |w| is below [`EPSILON`].
    #[inline]
    pub fn divided_by_w(self) -> Option<Self> {
        if self.w.abs() < EPSILON {
            return None;
        }
        let inv = 1.0 / self.w;
        Some(Self::new(self.x * inv, self.y * inv, self.z * inv, 1.0))
    }

    /// The xyz components
    #[inline]
    pub fn xyz(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Linear interpolation between two vectors
    #[inline]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        self * (1.0 - t) + other * t
    }

    /// Add a scalar to every component
    #[inline]
    pub fn add_scalar(self, s: f32) -> Self {
        Self::new(self.x + s, self.y + s, self.z + s, self.w + s)
    }

    /// Per-component product
    #[inline]
    pub fn component_mul(self, other: Self) -> Self {
        Self::new(
            self.x * other.x,
            self.y * other.y,
            self.z * other.z,
            self.w * other.w,
        )
    }

    /// Clamp each component into `[min, max]`
    #[inline]
    pub fn clamp(self, min: f32, max: f32) -> Self {
        Self::new(
            self.x.clamp(min, max),
            self.y.clamp(min, max),
            self.z.clamp(min, max),
            self.w.clamp(min, max),
        )
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl From<[f32; 4]> for Vec4 {
    fn from(a: [f32; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }
}

// Operator overloads

impl std::ops::Add for Vec4 {
    type Output = Self;
    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(
            self.x + other.x,
            self.y + other.y,
            self.z + other.z,
            self.w + other.w,
        )
    }
}

impl std::ops::AddAssign for Vec4 {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
        self.z += other.z;
        self.w += other.w;
    }
}

impl std::ops::Sub for Vec4 {
    type Output = Self;
    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(
            self.x - other.x,
            self.y - other.y,
            self.z - other.z,
            self.w - other.w,
        )
    }
}

impl std::ops::Mul<f32> for Vec4 {
    type Output = Self;
    #[inline]
    fn mul(self, scalar: f32) -> Self {
        Self::new(
            self.x * scalar,
            self.y * scalar,
            self.z * scalar,
            self.w * scalar,
        )
    }
}

impl std::ops::MulAssign<f32> for Vec4 {
    #[inline]
    fn mul_assign(&mut self, scalar: f32) {
        self.x *= scalar;
        self.y *= scalar;
        self.z *= scalar;
        self.w *= scalar;
    }
}

impl std::ops::Neg for Vec4 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot() {
        let point = Vec4::new(2.0, -1.0, 3.0, 1.0);
        let dir = Vec4::new(1.0, 4.0, 2.0, 0.0);
        assert_eq!(point.dot(dir), 4.0);
        assert_eq!(point.dot3(Vec4::new(1.0, 4.0, 2.0, 5.0)), 4.0);
        assert_eq!(point.dot(point), 15.0);
    }

    #[test]
    fn test_cross_is_direction() {
        let c = Vec4::point(1.0, 0.0, 0.0).cross(Vec4::point(0.0, 1.0, 0.0));
        assert_eq!(c, Vec4::direction(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_normalized() {
        let v = Vec4::new(3.0, 0.0, 0.0, 0.0);
        let n = v.normalized();
        assert!((n.x - 1.0).abs() < 0.0001);
        assert_eq!(n.y, 0.0);
    }

    #[test]
    fn test_normalized_near_zero() {
        let n = Vec4::new(1e-8, 0.0, 0.0, 0.0).normalized();
        assert_eq!(n, Vec4::ZERO);
        assert!(n.is_finite());
    }

    #[test]
    fn test_divided_by_w() {
        let v = Vec4::new(2.0, 4.0, 6.0, 2.0);
        assert_eq!(v.divided_by_w(), Some(Vec4::new(1.0, 2.0, 3.0, 1.0)));
    }

    #[test]
    fn test_divided_by_zero_w_is_none() {
        assert_eq!(Vec4::direction(1.0, 2.0, 3.0).divided_by_w(), None);
    }

    #[test]
    fn test_add_scalar() {
        let v = Vec4::new(1.0, 2.0, 3.0, 4.0).add_scalar(1.0);
        assert_eq!(v, Vec4::new(2.0, 3.0, 4.0, 5.0));
    }

    #[test]
    fn test_lerp() {
        let a = Vec4::ZERO;
        let b = Vec4::new(10.0, 10.0, 10.0, 10.0);
        assert_eq!(a.lerp(b, 0.5), Vec4::new(5.0, 5.0, 5.0, 5.0));
    }

    #[test]
    fn test_component_mul() {
        let a = Vec4::new(1.0, 2.0, 3.0, 4.0);
        let b = Vec4::new(2.0, 3.0, 4.0, 5.0);
        assert_eq!(a.component_mul(b), Vec4::new(2.0, 6.0, 12.0, 20.0));
    }

    #[test]
    fn test_pod_cast() {
        let pixels = [Vec4::new(0.1, 0.2, 0.3, 1.0), Vec4::ONE];
        let flat: &[f32] = bytemuck::cast_slice(&pixels);
        assert_eq!(flat.len(), 8);
        assert_eq!(flat[2], 0.3);
        assert_eq!(flat[7], 1.0);
    }
}
