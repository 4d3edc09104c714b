//! Software rendering system
//!
//! Owns the renderer, camera and projection, and turns a [`SceneState`]
//! into one cleared, fully rasterized frame per call.

use std::path::Path;

use softgl_core::{AssetError, Vec4};
use softgl_render::{render_scene, Camera, FrameStats, Image, Projection, Renderer};

use crate::config::AppConfig;
use crate::scene::SceneState;

/// Render error types
#[derive(Debug)]
pub enum RenderError {
    /// Eye and target coincide or up is parallel to the view direction
    DegenerateCamera,
    /// Zero-sized framebuffer
    EmptyImage,
    /// Texture or output image failed to load or save
    Image(AssetError),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::DegenerateCamera => write!(f, "Degenerate camera"),
            RenderError::EmptyImage => write!(f, "Image has zero size"),
            RenderError::Image(e) => write!(f, "Render error: {}", e),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Image(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AssetError> for RenderError {
    fn from(e: AssetError) -> Self {
        RenderError::Image(e)
    }
}

/// Manages software rendering
pub struct RenderSystem {
    renderer: Renderer,
    camera: Camera,
    projection: Projection,
    clear_color: Vec4,
    far_z: f32,
}

impl RenderSystem {
    /// Create render system from config
    pub fn new(config: &AppConfig) -> Result<Self, RenderError> {
        let (width, height) = (config.image.width, config.image.height);
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage);
        }

        let camera = config.camera.to_camera();
        if camera.look_at().is_none() {
            return Err(RenderError::DegenerateCamera);
        }

        let mut renderer = Renderer::new(width, height, config.rendering.to_render_settings());
        if let Some(path) = &config.rendering.texture {
            renderer.bind_texture(Some(Image::load_tga(path)?));
        }

        Ok(Self {
            renderer,
            camera,
            projection: config.camera.to_projection(),
            clear_color: config.rendering.clear_color(),
            far_z: config.rendering.far_z,
        })
    }

    /// Clear and draw one frame
    pub fn render_frame(&mut self, scene: &SceneState) -> FrameStats {
        self.renderer.clear_frame(self.clear_color, self.far_z);
        let stats = render_scene(
            &mut self.renderer,
            &scene.tree,
            &scene.library,
            &self.camera,
            &self.projection,
        );
        log::debug!(
            "Frame: {} drawn, {} culled, {} behind camera, {} degenerate",
            stats.drawn,
            stats.culled,
            stats.behind_camera,
            stats.degenerate
        );
        stats
    }

    /// The last completed frame
    pub fn image(&self) -> &Image {
        self.renderer.image()
    }

    /// Write the last completed frame as TGA
    pub fn save_frame<P: AsRef<Path>>(&self, path: P) -> Result<(), RenderError> {
        let path = path.as_ref();
        self.renderer.image().save_tga(path)?;
        log::info!("Wrote frame to {}", path.display());
        Ok(())
    }

    /// Get current framebuffer size
    pub fn size(&self) -> (usize, usize) {
        (self.renderer.width(), self.renderer.height())
    }
}
