//! Core geometry for the softgl rasterizer
//!
//! This crate provides the types that sit between loaded assets and the
//! rasterizer:
//!
//! - [`Vertex`] - position, color, normal and texture coordinate of a sample
//! - [`Triangle`] - three vertices with cached barycentric constants
//! - [`Mesh`] - indexed positions/normals/texture coordinates with bulk
//!   transforms and a lazy triangle sequence
//! - [`MeshLibrary`] - generational storage for loaded meshes
//! - [`SceneTree`] - arena of transform and mesh nodes composing model matrices
//! - [`SceneTemplate`] - RON scene description instantiated into a tree
//! - [`AssetError`] - failures while loading OBJ/TGA data

mod asset_error;
mod vertex;
mod triangle;
mod mesh;
mod obj;
mod mesh_library;
mod scene_tree;
mod scene;

pub use asset_error::AssetError;
pub use vertex::Vertex;
pub use triangle::{BoundingBox, Triangle};
pub use mesh::{IndexTriple, Mesh, Triangles};
pub use mesh_library::{MeshKey, MeshLibrary};
pub use scene_tree::{MeshInstance, NodeId, SceneError, SceneNode, SceneTree};
pub use scene::{MeshSource, NodeTemplate, SceneLoadError, SceneTemplate, TransformTemplate};

// Re-export commonly used types from softgl_math for convenience
pub use softgl_math::{mat4, Mat4, Vec2, Vec3, Vec4};
