//! Animation system
//!
//! Spins every animated root of the scene about its own origin. Time is
//! advanced explicitly by the caller, so a run is reproducible frame for
//! frame.

use softgl_core::{mat4, Mat4, Vec3};

use crate::config::AnimationConfig;
use crate::scene::SceneState;

/// Time-driven rotation of the scene's root nodes
pub struct AnimationSystem {
    /// Radians per second about X, Y and Z
    angular_speed: Vec3,
    elapsed: f32,
}

impl AnimationSystem {
    pub fn new(config: &AnimationConfig) -> Self {
        Self {
            angular_speed: Vec3::from(config.angular_speed),
            elapsed: 0.0,
        }
    }

    /// Seconds of simulated time so far
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Rotation for the current time
    pub fn rotation(&self) -> Mat4 {
        let angles = self.angular_speed * self.elapsed;
        mat4::mul_chain(&[
            mat4::rotate_x(angles.x),
            mat4::rotate_y(angles.y),
            mat4::rotate_z(angles.z),
        ])
    }

    /// Advance time by `dt` seconds and update the animated nodes
    pub fn update(&mut self, dt: f32, scene: &mut SceneState) {
        self.elapsed += dt;
        let rotation = self.rotation();
        for &(node, base) in &scene.animated {
            // Rotate in place, then move to the node's resting transform
            if let Err(e) = scene.tree.set_matrix(node, mat4::mul(rotation, base)) {
                log::warn!("Cannot animate node: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneBuilder;
    use softgl_core::Vec4;

    const EPSILON: f32 = 0.0001;

    fn vec_approx_eq(a: Vec4, b: Vec4) -> bool {
        (a - b).length() < EPSILON
    }

    #[test]
    fn test_no_time_no_rotation() {
        let system = AnimationSystem::new(&AnimationConfig::default());
        let p = mat4::transform(Vec4::point(1.0, 2.0, 3.0), system.rotation());
        assert!(vec_approx_eq(p, Vec4::point(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_update_rotates_about_own_origin() {
        let mut scene = SceneBuilder::new().add_cube(Vec3::new(5.0, 0.0, 0.0)).build();
        let config = AnimationConfig { angular_speed: [0.0, std::f32::consts::PI, 0.0] };
        let mut system = AnimationSystem::new(&config);

        // Half a turn about Y after one second
        system.update(0.5, &mut scene);
        system.update(0.5, &mut scene);
        assert!((system.elapsed() - 1.0).abs() < EPSILON);

        let model = scene.tree.mesh_instances()[0].model;
        let center = mat4::transform(Vec4::point(0.0, 0.0, 0.0), model);
        let corner = mat4::transform(Vec4::point(1.0, 0.0, 0.0), model);
        assert!(vec_approx_eq(center, Vec4::point(5.0, 0.0, 0.0)));
        assert!(vec_approx_eq(corner, Vec4::point(4.0, 0.0, 0.0)));
    }
}
