//! Software rasterizer for softgl
//!
//! - [`Image`] - RGBA float framebuffer with a TGA codec
//! - [`Renderer`] - pixel, line and triangle drawing with a depth buffer
//! - [`Camera`] / [`Projection`] - view and projection matrices
//! - [`render_scene`] - per-frame transform pipeline from a scene tree

pub mod camera;
pub mod image;
pub mod pipeline;
pub mod renderer;
pub mod settings;

pub use camera::{Camera, Projection};
pub use image::{Image, DEFAULT_FILL};
pub use pipeline::{render_scene, viewport_transform, FrameStats};
pub use renderer::{Renderer, EDGE_TOLERANCE};
pub use settings::{RasterMode, RenderFlags, RenderSettings};

// Re-export core types for convenience
pub use softgl_core::{Mesh, MeshKey, MeshLibrary, SceneTree, Triangle, Vertex};
pub use softgl_math::{Mat4, Vec3, Vec4};
