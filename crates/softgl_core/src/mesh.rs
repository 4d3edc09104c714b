//! Indexed triangle mesh
//!
//! A mesh stores positions, normals and texture coordinates in flat
//! containers plus one [`IndexTriple`] per triangle corner. It is populated
//! once by the OBJ loader, then bulk-transformed in place each frame (clone
//! the loaded mesh first if the original must survive the frame).

use std::path::Path;

use softgl_math::{mat4, Mat4, Vec3, Vec4, EPSILON};

use crate::vertex::DEFAULT_TEXTURE;
use crate::{AssetError, Triangle, Vertex};

/// Normal used for corners without one
const DEFAULT_NORMAL: Vec4 = Vec4::ZERO;

/// Built-in unit cube (edge length 2, centered on the origin)
const CUBE_OBJ: &str = include_str!("../../../assets/cube.obj");

/// Per-corner references into a mesh's containers
///
/// `None` means the corner has no texture coordinate / normal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexTriple {
    pub position: usize,
    pub texture: Option<usize>,
    pub normal: Option<usize>,
}

impl IndexTriple {
    pub fn new(position: usize, texture: Option<usize>, normal: Option<usize>) -> Self {
        Self { position, texture, normal }
    }
}

/// Indexed triangle mesh
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec4>,
    normals: Vec<Vec4>,
    textures: Vec<Vec3>,
    indices: Vec<IndexTriple>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a mesh from its containers, validating every index
    ///
    /// Fails when the corner count is not a multiple of 3 or a corner refers
    /// past the end of a container.
    pub fn from_parts(
        positions: Vec<Vec4>,
        normals: Vec<Vec4>,
        textures: Vec<Vec3>,
        indices: Vec<IndexTriple>,
    ) -> Result<Self, AssetError> {
        let mesh = Self { positions, normals, textures, indices };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Load a mesh from a Wavefront OBJ file
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let mesh = Self::from_obj_str(&source)?;
        log::info!(
            "Loaded mesh {}: {} positions, {} normals, {} texture coordinates, {} triangles",
            path.display(),
            mesh.positions.len(),
            mesh.normals.len(),
            mesh.textures.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Parse a mesh from OBJ text
    pub fn from_obj_str(source: &str) -> Result<Self, AssetError> {
        crate::obj::parse(source)
    }

    /// The built-in cube, with per-face normals and texture coordinates
    pub fn cube() -> Self {
        // The embedded source is covered by tests; an empty mesh is the fallback.
        Self::from_obj_str(CUBE_OBJ).unwrap_or_default()
    }

    pub fn positions(&self) -> &[Vec4] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec4] {
        &self.normals
    }

    pub fn textures(&self) -> &[Vec3] {
        &self.textures
    }

    pub fn indices(&self) -> &[IndexTriple] {
        &self.indices
    }

    /// Number of triangles (one per three index triples)
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    // ==================== Bulk transforms ====================

    /// `p = p * m` for every position
    pub fn multiply_positions_by_matrix(&mut self, m: Mat4) {
        for_each_element(&mut self.positions, |p| *p = mat4::transform(*p, m));
    }

    /// `n = n * m` for every normal
    pub fn multiply_normals_by_matrix(&mut self, m: Mat4) {
        for_each_element(&mut self.normals, |n| *n = mat4::transform(*n, m));
    }

    /// Perspective divide of every position
    ///
    /// Positions with |w| below epsilon are left untouched; the number of
    /// such positions is returned.
    pub fn divide_positions_by_w(&mut self) -> usize {
        let skipped = self.positions.iter().filter(|p| p.w.abs() < EPSILON).count();
        for_each_element(&mut self.positions, |p| {
            if let Some(d) = p.divided_by_w() {
                *p = d;
            }
        });
        if skipped > 0 {
            log::trace!("Perspective divide skipped {} positions with w≈0", skipped);
        }
        skipped
    }

    /// Add `f` to every component of every position
    pub fn add_scalar_to_positions(&mut self, f: f32) {
        for_each_element(&mut self.positions, |p| *p = p.add_scalar(f));
    }

    /// Multiply every position by `f`
    pub fn multiply_positions_by_scalar(&mut self, f: f32) {
        for_each_element(&mut self.positions, |p| *p = *p * f);
    }

    /// Multiply every position component-wise by `v`
    pub fn multiply_positions_componentwise(&mut self, v: Vec4) {
        for_each_element(&mut self.positions, |p| *p = p.component_mul(v));
    }

    // ==================== Triangle sequence ====================

    /// Lazy sequence of the mesh's triangles
    ///
    /// The sequence borrows the mesh, never mutates it, and can be restarted
    /// by calling this again.
    pub fn triangles(&self) -> Triangles<'_> {
        Triangles { mesh: self, next: 0 }
    }

    fn corner(&self, index: &IndexTriple) -> Vertex {
        Vertex::at(self.positions[index.position])
            .with_normal(index.normal.map_or(DEFAULT_NORMAL, |i| self.normals[i]))
            .with_texture(index.texture.map_or(DEFAULT_TEXTURE, |i| self.textures[i]))
    }

    fn validate(&self) -> Result<(), AssetError> {
        if self.indices.len() % 3 != 0 {
            return Err(AssetError::parse(
                0,
                format!("{} corners is not a multiple of 3", self.indices.len()),
            ));
        }
        for (i, index) in self.indices.iter().enumerate() {
            let face = i / 3 + 1;
            if index.position >= self.positions.len() {
                return Err(AssetError::parse(
                    0,
                    format!("face {} refers to missing position {}", face, index.position + 1),
                ));
            }
            if index.texture.is_some_and(|t| t >= self.textures.len()) {
                return Err(AssetError::parse(
                    0,
                    format!("face {} refers to a missing texture coordinate", face),
                ));
            }
            if index.normal.is_some_and(|n| n >= self.normals.len()) {
                return Err(AssetError::parse(
                    0,
                    format!("face {} refers to a missing normal", face),
                ));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Mesh {
    type Item = Triangle;
    type IntoIter = Triangles<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.triangles()
    }
}

/// Iterator over a mesh's triangles, built from index triples three at a time
#[derive(Clone, Debug)]
pub struct Triangles<'a> {
    mesh: &'a Mesh,
    next: usize,
}

impl Iterator for Triangles<'_> {
    type Item = Triangle;

    fn next(&mut self) -> Option<Triangle> {
        let corners = self.mesh.indices.get(self.next..self.next + 3)?;
        self.next += 3;
        Some(Triangle::new(
            self.mesh.corner(&corners[0]),
            self.mesh.corner(&corners[1]),
            self.mesh.corner(&corners[2]),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.mesh.indices.len().saturating_sub(self.next) / 3;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Triangles<'_> {}

/// Apply `f` to every element; elements are independent, so with the
/// `parallel` feature the work is spread over the rayon pool
fn for_each_element<T, F>(items: &mut [T], f: F)
where
    T: Send,
    F: Fn(&mut T) + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        items.par_iter_mut().for_each(f);
    }
    #[cfg(not(feature = "parallel"))]
    {
        items.iter_mut().for_each(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn vec_approx_eq(a: Vec4, b: Vec4) -> bool {
        approx_eq(a.x, b.x) && approx_eq(a.y, b.y) && approx_eq(a.z, b.z) && approx_eq(a.w, b.w)
    }

    fn quad() -> Mesh {
        Mesh::from_parts(
            vec![
                Vec4::point(0.0, 0.0, 0.0),
                Vec4::point(1.0, 0.0, 0.0),
                Vec4::point(1.0, 1.0, 0.0),
                Vec4::point(0.0, 1.0, 0.0),
            ],
            vec![Vec4::direction(0.0, 0.0, -1.0)],
            vec![Vec3::new(0.0, 0.0, 1.0), Vec3::new(1.0, 1.0, 1.0)],
            vec![
                IndexTriple::new(0, Some(0), Some(0)),
                IndexTriple::new(1, None, Some(0)),
                IndexTriple::new(2, Some(1), Some(0)),
                IndexTriple::new(0, None, None),
                IndexTriple::new(2, None, None),
                IndexTriple::new(3, None, None),
            ],
        )
        .expect("valid quad")
    }

    #[test]
    fn test_from_parts_rejects_partial_face() {
        let err = Mesh::from_parts(
            vec![Vec4::point(0.0, 0.0, 0.0)],
            vec![],
            vec![],
            vec![IndexTriple::new(0, None, None); 4],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_from_parts_rejects_out_of_range() {
        let err = Mesh::from_parts(
            vec![Vec4::point(0.0, 0.0, 0.0)],
            vec![],
            vec![],
            vec![
                IndexTriple::new(0, None, None),
                IndexTriple::new(0, None, Some(0)),
                IndexTriple::new(0, None, None),
            ],
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_triangle_count_and_restart() {
        let mesh = quad();
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles().len(), 2);

        let first: Vec<Triangle> = mesh.triangles().collect();
        let second: Vec<Triangle> = (&mesh).into_iter().collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_components_use_defaults() {
        let mesh = quad();
        let tris: Vec<Triangle> = mesh.triangles().collect();

        let a = tris[0];
        assert_eq!(a.v1().normal, Vec4::direction(0.0, 0.0, -1.0));
        assert_eq!(a.v2().texture, DEFAULT_TEXTURE);
        assert_eq!(a.v2().texture, Vertex::default().texture);
        assert_eq!(a.v3().texture, Vec3::new(1.0, 1.0, 1.0));

        let b = tris[1];
        assert_eq!(b.v1().normal, DEFAULT_NORMAL);
        assert_eq!(b.v3().position, Vec4::point(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_identity_transform_leaves_positions() {
        let mut mesh = quad();
        let before = mesh.positions().to_vec();
        mesh.multiply_positions_by_matrix(mat4::IDENTITY);
        assert_eq!(mesh.positions(), before.as_slice());
    }

    #[test]
    fn test_matrix_transforms() {
        let mut mesh = quad();
        mesh.multiply_positions_by_matrix(mat4::translation(0.0, 0.0, 5.0));
        assert!(vec_approx_eq(mesh.positions()[2], Vec4::point(1.0, 1.0, 5.0)));

        mesh.multiply_normals_by_matrix(mat4::mul(
            mat4::rotate_y(std::f32::consts::PI),
            mat4::translation(9.0, 9.0, 9.0),
        ));
        // Translation does not move a w=0 normal
        assert!(vec_approx_eq(mesh.normals()[0], Vec4::direction(0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_divide_positions_by_w() {
        let mut mesh = Mesh::from_parts(
            vec![Vec4::new(2.0, 4.0, 6.0, 2.0), Vec4::new(1.0, 1.0, 1.0, 0.0)],
            vec![],
            vec![],
            vec![],
        )
        .expect("valid mesh");
        let skipped = mesh.divide_positions_by_w();
        assert_eq!(skipped, 1);
        assert_eq!(mesh.positions()[0], Vec4::point(1.0, 2.0, 3.0));
        assert_eq!(mesh.positions()[1], Vec4::new(1.0, 1.0, 1.0, 0.0));
    }

    #[test]
    fn test_viewport_bulk_ops() {
        let mut mesh = Mesh::from_parts(vec![Vec4::new(-1.0, 1.0, 0.0, 1.0)], vec![], vec![], vec![])
            .expect("valid mesh");
        mesh.add_scalar_to_positions(1.0);
        mesh.multiply_positions_by_scalar(0.5);
        mesh.multiply_positions_componentwise(Vec4::new(640.0, 480.0, 1.0, 1.0));
        assert_eq!(mesh.positions()[0], Vec4::new(0.0, 480.0, 0.5, 1.0));
    }

    #[test]
    fn test_cube() {
        let cube = Mesh::cube();
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.positions().len(), 8);
        for tri in cube.triangles() {
            for v in tri.vertices() {
                assert!(v.has_normal());
                // The face normal agrees with the stored per-face normal
                assert!(vec_approx_eq(tri.face_normal(), v.normal));
            }
        }
    }
}
