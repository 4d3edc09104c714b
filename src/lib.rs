//! softgl - CPU triangle rasterizer
//!
//! The library side of the `softgl` binary: layered configuration, the scene
//! builder, and the animation and render systems that drive a frame.

pub mod config;
pub mod scene;
pub mod systems;
