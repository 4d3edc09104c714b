//! Camera and projection
//!
//! The camera looks along +Z of its view space. A triangle is back-facing
//! when its world-space face normal points along the viewing direction
//! (`normal · direction >= 0`); with the cube's outward normals and
//! counter-clockwise winding this hides the far faces.

use softgl_math::{mat4, Mat4, Vec3, Vec4};

/// Eye, look-at target and up vector
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, -5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
        }
    }
}

impl Camera {
    pub fn new(eye: Vec3, target: Vec3, up: Vec3) -> Self {
        Self { eye, target, up }
    }

    /// World-to-view matrix, `None` when eye, target and up are degenerate
    pub fn look_at(&self) -> Option<Mat4> {
        mat4::look_at(self.eye, self.target, self.up)
    }

    /// Normalized viewing direction `target - eye` as a direction vector
    pub fn direction(&self) -> Vec4 {
        (self.target - self.eye).normalized().extend(0.0)
    }

    pub fn position(&self) -> Vec4 {
        self.eye.extend(1.0)
    }

    /// True when a surface with this normal faces away from the camera
    #[inline]
    pub fn is_back_facing(&self, normal: Vec4) -> bool {
        normal.dot3(self.direction()) >= 0.0
    }
}

/// Perspective projection parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    pub fn new(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self { fov_degrees, near, far }
    }

    /// Projection matrix for a viewport with the given width / height
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        mat4::perspective(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }
}
