//! Scene construction utilities
//!
//! This module provides a declarative API for building renderable scenes.

mod scene_builder;

pub use scene_builder::{build_from_config, SceneBuilder, SceneState};
