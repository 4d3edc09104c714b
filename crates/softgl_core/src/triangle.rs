//! Triangle with cached barycentric constants
//!
//! The screen-space area, the barycentric denominator and the bounding box
//! are derived from the three vertices and recomputed every time a vertex is
//! replaced. The barycentric queries only make sense once the vertices are in
//! screen space (x/y in pixels).

use softgl_math::{mat4, Mat4, Vec2, Vec4};

use crate::Vertex;

/// Triangles whose |area| falls below this are not rasterized
const DEGENERATE_AREA: f32 = 1e-6;

/// Axis-aligned bounding box over the x/y of a triangle's vertices
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl BoundingBox {
    /// Inclusive containment test
    #[inline]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// Three vertices plus derived barycentric data
#[derive(Clone, Copy, Debug)]
pub struct Triangle {
    v1: Vertex,
    v2: Vertex,
    v3: Vertex,
    area: f32,
    den: f32,
    bbox: BoundingBox,
    normal_fixed: bool,
}

impl PartialEq for Triangle {
    fn eq(&self, other: &Self) -> bool {
        self.v1 == other.v1
            && self.v2 == other.v2
            && self.v3 == other.v3
            && self.normal_fixed == other.normal_fixed
    }
}

impl Triangle {
    pub fn new(v1: Vertex, v2: Vertex, v3: Vertex) -> Self {
        let mut tri = Self {
            v1,
            v2,
            v3,
            area: 0.0,
            den: 0.0,
            bbox: BoundingBox { min_x: 0.0, min_y: 0.0, max_x: 0.0, max_y: 0.0 },
            normal_fixed: false,
        };
        tri.update_constants();
        tri
    }

    #[inline]
    pub fn v1(&self) -> &Vertex {
        &self.v1
    }

    #[inline]
    pub fn v2(&self) -> &Vertex {
        &self.v2
    }

    #[inline]
    pub fn v3(&self) -> &Vertex {
        &self.v3
    }

    #[inline]
    pub fn vertices(&self) -> [Vertex; 3] {
        [self.v1, self.v2, self.v3]
    }

    pub fn set_v1(&mut self, v: Vertex) {
        self.v1 = v;
        self.update_constants();
    }

    pub fn set_v2(&mut self, v: Vertex) {
        self.v2 = v;
        self.update_constants();
    }

    pub fn set_v3(&mut self, v: Vertex) {
        self.v3 = v;
        self.update_constants();
    }

    /// Signed screen-space area (positive for counter-clockwise x/y winding)
    #[inline]
    pub fn area(&self) -> f32 {
        self.area
    }

    #[inline]
    pub fn bounding_box(&self) -> BoundingBox {
        self.bbox
    }

    /// True when the triangle must not be rasterized
    ///
    /// Covers zero area (the barycentric denominator is infinite) and
    /// non-finite screen positions left over from a w≈0 divide.
    pub fn is_degenerate(&self) -> bool {
        self.area.abs() < DEGENERATE_AREA
            || !self.den.is_finite()
            || !self.v1.screen_position().is_finite()
            || !self.v2.screen_position().is_finite()
            || !self.v3.screen_position().is_finite()
    }

    /// Barycentric weight of `v1` at `pos`
    #[inline]
    pub fn barycentric_s(&self, pos: Vec2) -> f32 {
        ((self.v2.y() - self.v3.y()) * (pos.x - self.v3.x())
            + (self.v3.x() - self.v2.x()) * (pos.y - self.v3.y()))
            * self.den
    }

    /// Barycentric weight of `v2` at `pos`
    #[inline]
    pub fn barycentric_t(&self, pos: Vec2) -> f32 {
        ((self.v3.y() - self.v1.y()) * (pos.x - self.v3.x())
            + (self.v1.x() - self.v3.x()) * (pos.y - self.v3.y()))
            * self.den
    }

    /// All three weights `(s, t, u)` with `u = 1 - s - t` weighting `v3`
    #[inline]
    pub fn barycentric(&self, pos: Vec2) -> (f32, f32, f32) {
        let s = self.barycentric_s(pos);
        let t = self.barycentric_t(pos);
        (s, t, 1.0 - s - t)
    }

    /// Closed inside test: every weight in `[0, 1]`
    pub fn contains(&self, pos: Vec2) -> bool {
        let (s, t, u) = self.barycentric(pos);
        (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u)
    }

    /// Left and right x where the horizontal line at `y` crosses the edges
    ///
    /// Returns `None` when the line misses the triangle. Horizontal edges
    /// lying on the line contribute both endpoints.
    pub fn scanline_span(&self, y: f32) -> Option<(f32, f32)> {
        if y < self.bbox.min_y || y > self.bbox.max_y {
            return None;
        }

        let mut lo = f32::INFINITY;
        let mut hi = f32::NEG_INFINITY;
        for (a, b) in [(&self.v1, &self.v2), (&self.v2, &self.v3), (&self.v3, &self.v1)] {
            if a.y() == b.y() {
                if a.y() == y {
                    lo = lo.min(a.x().min(b.x()));
                    hi = hi.max(a.x().max(b.x()));
                }
                continue;
            }
            let t = (y - a.y()) / (b.y() - a.y());
            if !(0.0..=1.0).contains(&t) {
                continue;
            }
            let x = a.x() + t * (b.x() - a.x());
            lo = lo.min(x);
            hi = hi.max(x);
        }

        if lo <= hi {
            Some((lo.max(self.bbox.min_x), hi.min(self.bbox.max_x)))
        } else {
            None
        }
    }

    /// New triangle with positions (and unpinned normals) multiplied by `m`
    pub fn matrix_transform(&self, m: Mat4) -> Triangle {
        let map = |v: &Vertex| {
            let mut out = *v;
            out.position = mat4::transform(v.position, m);
            if !self.normal_fixed {
                out.normal = mat4::transform(v.normal, m);
            }
            out
        };
        let mut out = Triangle::new(map(&self.v1), map(&self.v2), map(&self.v3));
        out.normal_fixed = self.normal_fixed;
        out
    }

    /// Pin or unpin the normals
    ///
    /// Pinning a triangle where any vertex lacks a usable normal assigns the
    /// flat face normal to all three vertices. Pinned normals are left alone
    /// by [`Triangle::matrix_transform`].
    pub fn set_normal_fixed(&mut self, fixed: bool) {
        self.normal_fixed = fixed;
        if fixed && !(self.v1.has_normal() && self.v2.has_normal() && self.v3.has_normal()) {
            let normal = self.face_normal();
            self.v1.normal = normal;
            self.v2.normal = normal;
            self.v3.normal = normal;
        }
    }

    pub fn with_normal_fixed(mut self, fixed: bool) -> Self {
        self.set_normal_fixed(fixed);
        self
    }

    #[inline]
    pub fn is_normal_fixed(&self) -> bool {
        self.normal_fixed
    }

    /// Unit normal of the plane, `(v2 - v1) x (v3 - v1)`, as a direction
    ///
    /// Zero for collinear vertices.
    pub fn face_normal(&self) -> Vec4 {
        let e1 = self.v2.position - self.v1.position;
        let e2 = self.v3.position - self.v1.position;
        e1.cross(e2).normalized()
    }

    /// Perspective divide of all three positions; w≈0 positions are kept as-is
    pub fn divide_by_w(&self) -> Triangle {
        self.map_positions(|p| p.divided_by_w().unwrap_or(p))
    }

    /// Add `f` to every component of every position
    pub fn add_scalar(&self, f: f32) -> Triangle {
        self.map_positions(|p| p.add_scalar(f))
    }

    /// Multiply every position by `f`
    pub fn mul_scalar(&self, f: f32) -> Triangle {
        self.map_positions(|p| p * f)
    }

    /// Multiply every position component-wise by `v`
    pub fn mul_components(&self, v: Vec4) -> Triangle {
        self.map_positions(|p| p.component_mul(v))
    }

    fn map_positions(&self, f: impl Fn(Vec4) -> Vec4) -> Triangle {
        let [a, b, c] = self.vertices().map(|v| v.with_position(f(v.position)));
        let mut out = Triangle::new(a, b, c);
        out.normal_fixed = self.normal_fixed;
        out
    }

    fn update_constants(&mut self) {
        let (x1, y1) = (self.v1.x(), self.v1.y());
        let (x2, y2) = (self.v2.x(), self.v2.y());
        let (x3, y3) = (self.v3.x(), self.v3.y());

        self.area = 0.5 * ((x2 - x1) * (y3 - y1) - (x3 - x1) * (y2 - y1));
        self.den = 1.0 / ((y2 - y3) * (x1 - x3) + (x3 - x2) * (y1 - y3));
        self.bbox = BoundingBox {
            min_x: x1.min(x2).min(x3),
            min_y: y1.min(y2).min(y3),
            max_x: x1.max(x2).max(x3),
            max_y: y1.max(y2).max(y3),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.0001;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn screen_triangle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> Triangle {
        Triangle::new(
            Vertex::at(Vec4::point(a.0, a.1, 0.0)),
            Vertex::at(Vec4::point(b.0, b.1, 0.0)),
            Vertex::at(Vec4::point(c.0, c.1, 0.0)),
        )
    }

    #[test]
    fn test_area_and_bounding_box() {
        let tri = screen_triangle((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        assert!(approx_eq(tri.area(), 50.0));
        let reversed = screen_triangle((0.0, 0.0), (0.0, 10.0), (10.0, 0.0));
        assert!(approx_eq(reversed.area(), -50.0));

        let bb = tri.bounding_box();
        assert_eq!(bb, BoundingBox { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 });
    }

    #[test]
    fn test_barycentric_at_vertices() {
        let tri = screen_triangle((1.0, 1.0), (9.0, 2.0), (4.0, 8.0));
        let (s, t, u) = tri.barycentric(Vec2::new(1.0, 1.0));
        assert!(approx_eq(s, 1.0) && approx_eq(t, 0.0) && approx_eq(u, 0.0));
        let (s, t, u) = tri.barycentric(Vec2::new(9.0, 2.0));
        assert!(approx_eq(s, 0.0) && approx_eq(t, 1.0) && approx_eq(u, 0.0));
        let (s, t, u) = tri.barycentric(Vec2::new(4.0, 8.0));
        assert!(approx_eq(s, 0.0) && approx_eq(t, 0.0) && approx_eq(u, 1.0));
    }

    #[test]
    fn test_barycentric_inside_sums_to_one() {
        let tri = screen_triangle((0.0, 0.0), (10.0, 0.0), (5.0, 10.0));
        for p in [Vec2::new(5.0, 3.0), Vec2::new(2.0, 1.0), Vec2::new(7.5, 2.5)] {
            let (s, t, u) = tri.barycentric(p);
            assert!(approx_eq(s + t + u, 1.0));
            assert!(tri.contains(p), "{:?} should be inside", p);
            for w in [s, t, u] {
                assert!((0.0..=1.0).contains(&w));
            }
        }
    }

    #[test]
    fn test_contains_rejects_outside() {
        let tri = screen_triangle((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        assert!(!tri.contains(Vec2::new(8.0, 8.0)));
        assert!(!tri.contains(Vec2::new(-1.0, 2.0)));
        // Edges are inclusive
        assert!(tri.contains(Vec2::new(5.0, 0.0)));
        assert!(tri.contains(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_setters_recompute_constants() {
        let mut tri = screen_triangle((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        tri.set_v3(Vertex::at(Vec4::point(0.0, 20.0, 0.0)));
        assert!(approx_eq(tri.area(), 100.0));
        assert_eq!(tri.bounding_box().max_y, 20.0);
        let (s, _, _) = tri.barycentric(Vec2::new(0.0, 0.0));
        assert!(approx_eq(s, 1.0));
    }

    #[test]
    fn test_degenerate() {
        let line = screen_triangle((0.0, 0.0), (5.0, 5.0), (10.0, 10.0));
        assert!(line.is_degenerate());
        let point = screen_triangle((3.0, 3.0), (3.0, 3.0), (3.0, 3.0));
        assert!(point.is_degenerate());
        let inf = screen_triangle((f32::INFINITY, 0.0), (5.0, 5.0), (0.0, 10.0));
        assert!(inf.is_degenerate());
        let ok = screen_triangle((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        assert!(!ok.is_degenerate());
    }

    #[test]
    fn test_matrix_transform_does_not_mutate() {
        let tri = screen_triangle((0.0, 0.0), (1.0, 0.0), (0.0, 1.0));
        let moved = tri.matrix_transform(mat4::translation(5.0, 0.0, 0.0));
        assert_eq!(tri.v1().x(), 0.0);
        assert_eq!(moved.v1().x(), 5.0);
        assert_eq!(moved.bounding_box().min_x, 5.0);
    }

    #[test]
    fn test_matrix_transform_rotates_normals_unless_fixed() {
        let n = Vec4::direction(1.0, 0.0, 0.0);
        let tri = Triangle::new(
            Vertex::at(Vec4::point(0.0, 0.0, 0.0)).with_normal(n),
            Vertex::at(Vec4::point(1.0, 0.0, 0.0)).with_normal(n),
            Vertex::at(Vec4::point(0.0, 1.0, 0.0)).with_normal(n),
        );
        let r = mat4::rotate_z(std::f32::consts::FRAC_PI_2);

        let rotated = tri.matrix_transform(r);
        assert!(approx_eq(rotated.v1().normal.y, 1.0));

        let pinned = tri.with_normal_fixed(true).matrix_transform(r);
        assert!(pinned.is_normal_fixed());
        assert!(approx_eq(pinned.v1().normal.x, 1.0));
        assert!(approx_eq(pinned.v2().position.y, 1.0));
    }

    #[test]
    fn test_normal_fixed_assigns_face_normal() {
        let tri = screen_triangle((0.0, 0.0), (1.0, 0.0), (0.0, 1.0)).with_normal_fixed(true);
        for v in tri.vertices() {
            assert_eq!(v.normal, Vec4::direction(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn test_normal_fixed_keeps_existing_normals() {
        let n = Vec4::direction(0.0, 1.0, 0.0);
        let tri = Triangle::new(
            Vertex::at(Vec4::point(0.0, 0.0, 0.0)).with_normal(n),
            Vertex::at(Vec4::point(1.0, 0.0, 0.0)).with_normal(n),
            Vertex::at(Vec4::point(0.0, 1.0, 0.0)).with_normal(n),
        )
        .with_normal_fixed(true);
        assert_eq!(tri.v3().normal, n);
    }

    #[test]
    fn test_viewport_chain() {
        // NDC (-1..1) to a 100x50 viewport: add 1, halve, scale
        let tri = Triangle::new(
            Vertex::at(Vec4::new(-2.0, -2.0, 0.0, 2.0)),
            Vertex::at(Vec4::new(1.0, -1.0, 0.0, 1.0)),
            Vertex::at(Vec4::new(0.0, 1.0, 0.5, 1.0)),
        );
        let screen = tri
            .divide_by_w()
            .add_scalar(1.0)
            .mul_scalar(0.5)
            .mul_components(Vec4::new(100.0, 50.0, 1.0, 1.0));
        assert_eq!(screen.v1().screen_position(), Vec2::new(0.0, 0.0));
        assert_eq!(screen.v2().screen_position(), Vec2::new(100.0, 0.0));
        assert_eq!(screen.v3().screen_position(), Vec2::new(50.0, 50.0));
        assert!(approx_eq(screen.v3().z(), 0.75));
    }

    #[test]
    fn test_divide_by_w_keeps_zero_w() {
        let tri = Triangle::new(
            Vertex::at(Vec4::new(1.0, 2.0, 3.0, 0.0)),
            Vertex::at(Vec4::new(2.0, 2.0, 2.0, 2.0)),
            Vertex::at(Vec4::point(0.0, 1.0, 0.0)),
        )
        .divide_by_w();
        assert_eq!(tri.v1().position, Vec4::new(1.0, 2.0, 3.0, 0.0));
        assert_eq!(tri.v2().position, Vec4::point(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_scanline_span() {
        let tri = screen_triangle((0.0, 0.0), (10.0, 0.0), (0.0, 10.0));
        let (lo, hi) = tri.scanline_span(5.0).expect("line crosses the triangle");
        assert!(approx_eq(lo, 0.0));
        assert!(approx_eq(hi, 5.0));

        // Horizontal edge on the line
        let (lo, hi) = tri.scanline_span(0.0).expect("edge row");
        assert!(approx_eq(lo, 0.0) && approx_eq(hi, 10.0));

        assert!(tri.scanline_span(11.0).is_none());
        assert!(tri.scanline_span(-0.5).is_none());
    }
}
