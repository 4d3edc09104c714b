//! Application systems
//!
//! Per-frame systems driven by the headless run loop.

mod animation;
mod render;

pub use animation::AnimationSystem;
pub use render::{RenderError, RenderSystem};
