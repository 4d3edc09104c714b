//! Vertex type
//!
//! A vertex is a point sample carrying everything the rasterizer
//! interpolates across a triangle.

use serde::{Deserialize, Serialize};
use softgl_math::{Vec2, Vec3, Vec4, EPSILON};

/// Texture coordinate of a vertex that has none
pub(crate) const DEFAULT_TEXTURE: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// A point sample: position, color, normal and texture coordinate
///
/// Positions are homogeneous (w=1 for model-space points); normals are
/// directions (w=0). The texture coordinate keeps the optional third OBJ
/// component (1 when absent); sampling reads only `u` and `v`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Vec4,
    pub color: Vec4,
    pub normal: Vec4,
    pub texture: Vec3,
}

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Vec4::W,
            color: Vec4::ONE,
            normal: Vec4::ZERO,
            texture: DEFAULT_TEXTURE,
        }
    }
}

impl Vertex {
    /// Create a vertex with a position and color, no normal or texture
    pub fn new(position: Vec4, color: Vec4) -> Self {
        Self {
            position,
            color,
            ..Self::default()
        }
    }

    /// White vertex at a position
    pub fn at(position: Vec4) -> Self {
        Self::new(position, Vec4::ONE)
    }

    pub fn with_normal(mut self, normal: Vec4) -> Self {
        self.normal = normal;
        self
    }

    pub fn with_texture(mut self, texture: Vec3) -> Self {
        self.texture = texture;
        self
    }

    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    pub fn with_position(mut self, position: Vec4) -> Self {
        self.position = position;
        self
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.position.y
    }

    #[inline]
    pub fn z(&self) -> f32 {
        self.position.z
    }

    /// The x/y of the position, used once the vertex is in screen space
    #[inline]
    pub fn screen_position(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.y)
    }

    /// True when the normal is long enough to be used for shading
    #[inline]
    pub fn has_normal(&self) -> bool {
        self.normal.length_squared() > EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_white_point_at_origin() {
        let v = Vertex::default();
        assert_eq!(v.position, Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(v.color, Vec4::ONE);
        assert!(!v.has_normal());
        assert_eq!(v.texture, Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_builders() {
        let v = Vertex::at(Vec4::point(1.0, 2.0, 3.0))
            .with_normal(Vec4::direction(0.0, 0.0, -1.0))
            .with_texture(Vec3::new(0.5, 0.25, 1.0));
        assert_eq!(v.x(), 1.0);
        assert_eq!(v.y(), 2.0);
        assert_eq!(v.z(), 3.0);
        assert!(v.has_normal());
        assert_eq!(v.texture.y, 0.25);
        assert_eq!(v.screen_position(), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_equality_compares_all_fields() {
        let a = Vertex::at(Vec4::point(1.0, 0.0, 0.0));
        let b = a.with_color(Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_ne!(a, b);
        assert_eq!(a, Vertex::at(Vec4::point(1.0, 0.0, 0.0)));
    }
}
