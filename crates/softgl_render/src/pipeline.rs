//! Frame pipeline
//!
//! Feeds every mesh instance of a scene tree through the transform chain and
//! into the rasterizer:
//!
//! 1. model transform of the whole mesh (bulk, in a per-frame copy)
//! 2. back-face culling against the camera in world space
//! 3. normals pinned in world space for lighting
//! 4. view and projection
//! 5. perspective divide and viewport mapping
//! 6. rasterization
//!
//! Triangles are drawn one after another into the shared framebuffer.

use softgl_core::{MeshLibrary, SceneTree, Triangle};
use softgl_math::{mat4, Vec4, EPSILON};

use crate::camera::{Camera, Projection};
use crate::renderer::Renderer;
use crate::settings::RenderFlags;

/// Per-frame counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Mesh instances found in the scene
    pub instances: usize,
    /// Triangles handed to the pipeline
    pub triangles: usize,
    /// Triangles rasterized
    pub drawn: usize,
    /// Triangles dropped by back-face culling
    pub culled: usize,
    /// Triangles with a vertex on or behind the camera plane (w ≤ 0)
    pub behind_camera: usize,
    /// Zero-area or non-finite triangles after projection
    pub degenerate: usize,
    /// Mesh nodes whose key is no longer in the library
    pub missing_meshes: usize,
}

impl FrameStats {
    /// Add another frame's counters to these
    pub fn accumulate(&mut self, other: FrameStats) {
        self.instances += other.instances;
        self.triangles += other.triangles;
        self.drawn += other.drawn;
        self.culled += other.culled;
        self.behind_camera += other.behind_camera;
        self.degenerate += other.degenerate;
        self.missing_meshes += other.missing_meshes;
    }
}

/// Map a divided position from NDC `[-1, 1]` to pixels
///
/// `(p + 1) * 0.5` component-wise scaled by `(width, height, 1, 1)`; z lands
/// in `[0.5, 1]` for the projection's `[0, 1]` depth range.
pub fn viewport_transform(triangle: &Triangle, width: usize, height: usize) -> Triangle {
    triangle
        .add_scalar(1.0)
        .mul_scalar(0.5)
        .mul_components(Vec4::new(width as f32, height as f32, 1.0, 1.0))
}

/// Draw every mesh instance of `tree` into `renderer`
///
/// The frame is not cleared; call [`Renderer::clear_frame`] first.
pub fn render_scene(
    renderer: &mut Renderer,
    tree: &SceneTree,
    library: &MeshLibrary,
    camera: &Camera,
    projection: &Projection,
) -> FrameStats {
    let mut stats = FrameStats::default();

    let Some(view) = camera.look_at() else {
        log::warn!("Camera is degenerate (eye {:?}, target {:?}); nothing drawn", camera.eye, camera.target);
        return stats;
    };
    let (width, height) = (renderer.width(), renderer.height());
    if width == 0 || height == 0 {
        return stats;
    }
    let view_projection = mat4::mul(view, projection.matrix(width as f32 / height as f32));
    let cull = renderer.settings().flags.contains(RenderFlags::BACKFACE_CULL);

    for instance in tree.mesh_instances() {
        stats.instances += 1;
        let Some(mesh) = library.get(instance.mesh) else {
            stats.missing_meshes += 1;
            continue;
        };

        let mut world = mesh.clone();
        world.multiply_positions_by_matrix(instance.model);
        world.multiply_normals_by_matrix(instance.model);

        for triangle in world.triangles() {
            stats.triangles += 1;
            if cull && camera.is_back_facing(triangle.face_normal()) {
                stats.culled += 1;
                continue;
            }

            let lit = triangle.with_normal_fixed(true);
            let clip = lit.matrix_transform(view_projection);
            if clip.vertices().iter().any(|v| v.position.w <= EPSILON) {
                stats.behind_camera += 1;
                continue;
            }

            let screen = viewport_transform(&clip.divide_by_w(), width, height);
            if renderer.draw_triangle(&screen) {
                stats.drawn += 1;
            } else {
                stats.degenerate += 1;
            }
        }
    }

    if stats.missing_meshes > 0 {
        log::warn!("{} mesh nodes refer to removed meshes", stats.missing_meshes);
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use softgl_core::Vertex;

    #[test]
    fn test_viewport_transform() {
        let tri = Triangle::new(
            Vertex::at(Vec4::new(-1.0, -1.0, 0.0, 1.0)),
            Vertex::at(Vec4::new(1.0, -1.0, 0.0, 1.0)),
            Vertex::at(Vec4::new(0.0, 1.0, 1.0, 1.0)),
        );
        let screen = viewport_transform(&tri, 100, 50);
        assert_eq!(screen.v1().position, Vec4::new(0.0, 0.0, 0.5, 1.0));
        assert_eq!(screen.v2().position, Vec4::new(100.0, 0.0, 0.5, 1.0));
        assert_eq!(screen.v3().position, Vec4::new(50.0, 50.0, 1.0, 1.0));
    }

    #[test]
    fn test_stats_accumulate() {
        let mut a = FrameStats { drawn: 2, culled: 1, ..FrameStats::default() };
        a.accumulate(FrameStats { drawn: 3, degenerate: 4, ..FrameStats::default() });
        assert_eq!(a.drawn, 5);
        assert_eq!(a.culled, 1);
        assert_eq!(a.degenerate, 4);
    }
}
