//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. Built-in defaults
//! 2. `config/default.toml` (version controlled)
//! 3. `config/user.toml` (gitignored, user overrides)
//! 4. Environment variables (`SGL_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env, Serialized}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use softgl_math::{Vec3, Vec4};
use softgl_render::{Camera, Projection, RasterMode, RenderFlags, RenderSettings};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Framebuffer size
    #[serde(default)]
    pub image: ImageConfig,
    /// Camera placement and projection
    #[serde(default)]
    pub camera: CameraConfig,
    /// Rasterizer configuration
    #[serde(default)]
    pub rendering: RenderingConfig,
    /// What to render
    #[serde(default)]
    pub scene: SceneConfig,
    /// Scene animation
    #[serde(default)]
    pub animation: AnimationConfig,
    /// Headless run parameters
    #[serde(default)]
    pub run: RunConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. Built-in defaults
    /// 2. `config/default.toml`
    /// 3. `config/user.toml`
    /// 4. Environment variables (`SGL_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // User overrides (optional, gitignored)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // SGL_IMAGE__WIDTH=320 -> image.width = 320
        figment = figment.merge(Env::prefixed("SGL_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Framebuffer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Eye position [x, y, z]
    pub eye: [f32; 3],
    /// Look-at target [x, y, z]
    pub target: [f32; 3],
    /// Up vector [x, y, z]
    pub up: [f32; 3],
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near plane distance
    pub near: f32,
    /// Far plane distance
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [0.0, 1.5, -5.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            fov: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraConfig {
    pub fn to_camera(&self) -> Camera {
        Camera::new(Vec3::from(self.eye), Vec3::from(self.target), Vec3::from(self.up))
    }

    pub fn to_projection(&self) -> Projection {
        Projection::new(self.fov, self.near, self.far)
    }
}

/// Rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderingConfig {
    /// Clear color [r, g, b, a]
    pub clear_color: [f32; 4],
    /// Depth written by the per-frame clear
    pub far_z: f32,
    /// Light direction [x, y, z]
    pub light_dir: [f32; 3],
    /// Minimum shade in [0, 1]
    pub ambient: f32,
    /// Interior walk: "barycentric" or "scanline"
    pub raster_mode: RasterMode,
    pub depth_test: bool,
    pub backface_cull: bool,
    pub shading: bool,
    pub wireframe: bool,
    /// Optional TGA texture bound for the whole frame
    pub texture: Option<String>,
}

impl Default for RenderingConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.0, 0.2, 1.0],
            far_z: 1.0,
            light_dir: [0.0, 0.0, -1.0],
            ambient: 0.1,
            raster_mode: RasterMode::Barycentric,
            depth_test: true,
            backface_cull: true,
            shading: true,
            wireframe: false,
            texture: None,
        }
    }
}

impl RenderingConfig {
    pub fn flags(&self) -> RenderFlags {
        let mut flags = RenderFlags::empty();
        flags.set(RenderFlags::DEPTH_TEST, self.depth_test);
        flags.set(RenderFlags::BACKFACE_CULL, self.backface_cull);
        flags.set(RenderFlags::SHADING, self.shading);
        flags.set(RenderFlags::WIREFRAME, self.wireframe);
        flags.set(RenderFlags::TEXTURE, self.texture.is_some());
        flags
    }

    pub fn to_render_settings(&self) -> RenderSettings {
        let [x, y, z] = self.light_dir;
        RenderSettings::default()
            .with_flags(self.flags())
            .with_light(Vec4::direction(x, y, z), self.ambient)
            .with_raster_mode(self.raster_mode)
    }

    pub fn clear_color(&self) -> Vec4 {
        Vec4::from(self.clear_color)
    }
}

/// Scene source configuration
///
/// A RON scene wins over a single mesh; with neither, the built-in cube is
/// rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Path to a RON scene template
    pub path: Option<String>,
    /// Path to a single OBJ mesh
    pub mesh: Option<String>,
}

/// Animation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Rotation speed about X, Y and Z in radians per second
    pub angular_speed: [f32; 3],
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            angular_speed: [0.0, 0.8, 0.0],
        }
    }
}

/// Headless run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of frames to render
    pub frames: u32,
    /// Simulated time between frames in seconds
    pub frame_dt: f32,
    /// Write the last frame to this TGA file
    pub output: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 60,
            frame_dt: 1.0 / 60.0,
            output: None,
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.image.width, 640);
        assert_eq!(config.rendering.far_z, 1.0);
        assert_eq!(config.rendering.raster_mode, RasterMode::Barycentric);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("clear_color"));
        assert!(toml.contains("raster_mode = \"barycentric\""));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str("[image]\nwidth = 32\nheight = 16\n").unwrap();
        assert_eq!(config.image.width, 32);
        assert_eq!(config.camera.fov, 60.0);
    }

    #[test]
    fn test_flags_follow_toggles() {
        let rendering = RenderingConfig {
            backface_cull: false,
            wireframe: true,
            ..RenderingConfig::default()
        };
        let flags = rendering.flags();
        assert!(flags.contains(RenderFlags::DEPTH_TEST | RenderFlags::WIREFRAME));
        assert!(!flags.contains(RenderFlags::BACKFACE_CULL));
        assert!(!flags.contains(RenderFlags::TEXTURE));
    }

    #[test]
    fn test_camera_from_config() {
        let camera = CameraConfig::default().to_camera();
        assert!(camera.look_at().is_some());
        assert_eq!(camera.eye, Vec3::new(0.0, 1.5, -5.0));
    }
}
