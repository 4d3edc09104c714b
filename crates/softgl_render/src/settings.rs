//! Rasterizer settings

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use softgl_math::Vec4;

bitflags! {
    /// Per-frame rasterizer toggles
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u8 {
        /// Less-than depth test against the depth buffer
        const DEPTH_TEST = 1 << 0;
        /// Skip triangles facing away from the camera
        const BACKFACE_CULL = 1 << 1;
        /// Directional light term
        const SHADING = 1 << 2;
        /// Modulate color with the bound texture
        const TEXTURE = 1 << 3;
        /// Draw triangle edges instead of filling
        const WIREFRAME = 1 << 4;
    }
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self::DEPTH_TEST | Self::BACKFACE_CULL | Self::SHADING | Self::TEXTURE
    }
}

/// How a triangle's interior is walked
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterMode {
    /// Test every pixel of the bounding box with barycentric weights
    #[default]
    Barycentric,
    /// Intersect each row with the edges and draw a line between the crossings
    ///
    /// Color and depth only; textures are ignored in this mode.
    Scanline,
}

/// Everything that changes how triangles are rasterized
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderSettings {
    pub flags: RenderFlags,
    /// Direction the light shines *from*, dotted with surface normals
    pub light_dir: Vec4,
    /// Minimum shade in `[0, 1]`
    pub ambient: f32,
    pub raster_mode: RasterMode,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            flags: RenderFlags::default(),
            light_dir: Vec4::direction(0.0, 0.0, -1.0),
            ambient: 0.0,
            raster_mode: RasterMode::Barycentric,
        }
    }
}

impl RenderSettings {
    pub fn with_flags(mut self, flags: RenderFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_raster_mode(mut self, mode: RasterMode) -> Self {
        self.raster_mode = mode;
        self
    }

    pub fn with_light(mut self, light_dir: Vec4, ambient: f32) -> Self {
        self.light_dir = light_dir;
        self.ambient = ambient;
        self
    }
}

/// Shade in `[ambient, 1]` for a surface normal
///
/// A zero-length normal leaves the surface unlit (shade 1).
pub(crate) fn shade_intensity(normal: Vec4, light_dir: Vec4, ambient: f32) -> f32 {
    let n = normal.normalized();
    if n == Vec4::ZERO {
        return 1.0;
    }
    let diffuse = n.dot3(light_dir.normalized()).max(0.0);
    (ambient + (1.0 - ambient) * diffuse).clamp(0.0, 1.0)
}
