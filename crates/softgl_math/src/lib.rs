//! Linear algebra for the softgl rasterizer
//!
//! This crate provides the small vector and matrix types every other softgl
//! crate depends on.
//!
//! ## Core Types
//!
//! - [`Vec2`] - screen-space points and UV pairs
//! - [`Vec3`] - camera vectors and texture coordinates `(u, v, w)`
//! - [`Vec4`] - homogeneous positions (w=1), directions (w=0) and RGBA colors
//! - [`Mat4`] - 4x4 row-major matrix, applied as `v' = v * M`
//!
//! ## Conventions
//!
//! Vectors are row vectors. A chain `v * A * B` applies `A` first, so
//! `mat4::mul(a, b)` is the transform "a, then b". The camera looks along +Z
//! (left-handed), and [`mat4::perspective`] maps view depth to `[0, 1]` after
//! the perspective divide.

mod vec2;
mod vec3;
mod vec4;
pub mod mat4;

pub use vec2::Vec2;
pub use vec3::Vec3;
pub use vec4::Vec4;
pub use mat4::Mat4;

/// Lengths below this are treated as zero when normalizing or dividing
pub const EPSILON: f32 = 1e-6;
