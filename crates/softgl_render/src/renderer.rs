//! Framebuffer rasterizer
//!
//! The [`Renderer`] owns an [`Image`] and its depth buffer and draws pixels,
//! lines and triangles into them.
//!
//! Pixel inclusion: pixels are sampled at integer coordinates and a pixel is
//! covered when all three barycentric weights lie in the closed range
//! `[0, 1]` (widened by [`EDGE_TOLERANCE`] for rounding in the cached
//! denominator). Pixels on an edge shared by two triangles are covered by both;
//! with the strict less-than depth test the first triangle drawn keeps them
//! at equal depth.

use softgl_core::{Triangle, Vertex};
use softgl_math::{Vec2, Vec3, Vec4};

use crate::image::Image;
use crate::settings::{shade_intensity, RasterMode, RenderFlags, RenderSettings};

/// Lines with an endpoint further out than this are dropped
const MAX_LINE_COORD: f32 = 1.0e6;

/// Slack on barycentric weights so pixels exactly on an edge stay covered
pub const EDGE_TOLERANCE: f32 = 1.0e-5;

#[inline]
fn covers(weight: f32) -> bool {
    (-EDGE_TOLERANCE..=1.0 + EDGE_TOLERANCE).contains(&weight)
}

/// Software rasterizer over an owned image and depth buffer
pub struct Renderer {
    image: Image,
    depth: Vec<f32>,
    settings: RenderSettings,
    texture: Option<Image>,
}

impl Renderer {
    /// Create a renderer; the depth buffer stays empty until the first clear
    pub fn new(width: usize, height: usize, settings: RenderSettings) -> Self {
        Self {
            image: Image::new(width, height),
            depth: Vec::new(),
            settings,
            texture: None,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.image.height()
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn into_image(self) -> Image {
        self.image
    }

    /// Depth per pixel; empty before the first [`clear_frame`](Self::clear_frame)
    pub fn depth_buffer(&self) -> &[f32] {
        &self.depth
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    /// Texture sampled when [`RenderFlags::TEXTURE`] is set
    pub fn bind_texture(&mut self, texture: Option<Image>) {
        self.texture = texture;
    }

    /// Reallocate the image and depth buffer at a new size
    ///
    /// The depth buffer is empty again until the next clear.
    pub fn resize(&mut self, width: usize, height: usize) {
        log::debug!("Resizing framebuffer to {}x{}", width, height);
        self.image = Image::new(width, height);
        self.depth = Vec::new();
    }

    /// Fill every pixel with `color` and every depth entry with `far_z`
    pub fn clear_frame(&mut self, color: Vec4, far_z: f32) {
        self.image.fill(color);
        let len = self.image.width() * self.image.height();
        self.depth.clear();
        self.depth.resize(len, far_z);
    }

    /// Depth-tested write of one pixel at the vertex's screen position
    ///
    /// Positions outside the image and non-finite values are ignored.
    pub fn draw_pixel(&mut self, vertex: &Vertex) {
        let (x, y, z) = (vertex.x().floor(), vertex.y().floor(), vertex.z());
        if !(x >= 0.0 && y >= 0.0 && x < self.width() as f32 && y < self.height() as f32) {
            return;
        }
        if !vertex.color.is_finite() {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let index = y * self.width() + x;

        if self.settings.flags.contains(RenderFlags::DEPTH_TEST) && !self.depth.is_empty() {
            if z.is_nan() || z >= self.depth[index] {
                return;
            }
            self.depth[index] = z;
        }
        self.image.set(x, y, vertex.color);
    }

    /// Line between two vertices with interpolated color and depth
    ///
    /// Steps one pixel at a time along the major axis (x when |dx| > |dy|,
    /// otherwise y), always in increasing order, with the minor coordinate
    /// from integer midpoint rounding. A zero-length line is one pixel.
    pub fn draw_line(&mut self, v1: &Vertex, v2: &Vertex) {
        let in_range = |v: &Vertex| {
            v.x().abs() < MAX_LINE_COORD && v.y().abs() < MAX_LINE_COORD
        };
        if !(in_range(v1) && in_range(v2)) {
            return;
        }

        let dx = (v2.x().round() - v1.x().round()).abs();
        let dy = (v2.y().round() - v1.y().round()).abs();
        let x_major = dx > dy;
        let (a, b) = if (x_major && v1.x().round() > v2.x().round())
            || (!x_major && v1.y().round() > v2.y().round())
        {
            (v2, v1)
        } else {
            (v1, v2)
        };

        let (ax, ay) = (a.x().round() as i64, a.y().round() as i64);
        let (bx, by) = (b.x().round() as i64, b.y().round() as i64);
        let (major_start, major_end, minor_start, minor_end, limit) = if x_major {
            (ax, bx, ay, by, self.width() as i64)
        } else {
            (ay, by, ax, bx, self.height() as i64)
        };

        let steps = major_end - major_start;
        let rise = (minor_end - minor_start).abs();
        let dir = if minor_end >= minor_start { 1 } else { -1 };

        // Only the part of the major range inside the image is walked
        let first = (-major_start).max(0);
        let last = steps.min(limit - 1 - major_start);

        for i in first..=last {
            let t = if steps == 0 { 0.0 } else { i as f32 / steps as f32 };
            let minor = if steps == 0 {
                minor_start
            } else {
                minor_start + dir * ((2 * i * rise + steps) / (2 * steps))
            };
            let major = major_start + i;
            let (x, y) = if x_major { (major, minor) } else { (minor, major) };

            let z = a.z() + (b.z() - a.z()) * t;
            let color = a.color.lerp(b.color, t);
            self.draw_pixel(&Vertex::new(Vec4::new(x as f32, y as f32, z, 1.0), color));
        }
    }

    /// Rasterize a screen-space triangle
    ///
    /// Returns false when the triangle is degenerate and nothing was drawn.
    pub fn draw_triangle(&mut self, triangle: &Triangle) -> bool {
        self.rasterize(triangle, None)
    }

    /// Rasterize with one normal substituted for every pixel (flat shading)
    pub fn draw_triangle_with_normal(&mut self, triangle: &Triangle, normal: Vec4) -> bool {
        self.rasterize(triangle, Some(normal))
    }

    fn rasterize(&mut self, triangle: &Triangle, normal: Option<Vec4>) -> bool {
        if triangle.is_degenerate() {
            return false;
        }

        if self.settings.flags.contains(RenderFlags::WIREFRAME) {
            self.draw_edges(triangle, normal);
            return true;
        }

        let bbox = triangle.bounding_box();
        let x0 = bbox.min_x.ceil().max(0.0);
        let x1 = bbox.max_x.floor().min(self.width() as f32 - 1.0);
        let y0 = bbox.min_y.ceil().max(0.0);
        let y1 = bbox.max_y.floor().min(self.height() as f32 - 1.0);
        if x0 > x1 || y0 > y1 {
            return true;
        }
        let (x0, x1, y0, y1) = (x0 as usize, x1 as usize, y0 as usize, y1 as usize);

        match self.settings.raster_mode {
            RasterMode::Barycentric => {
                for y in y0..=y1 {
                    for x in x0..=x1 {
                        let pos = Vec2::new(x as f32, y as f32);
                        let (s, t, u) = triangle.barycentric(pos);
                        if !(covers(s) && covers(t) && covers(u)) {
                            continue;
                        }
                        let vertex = self.fragment(triangle, pos, (s, t, u), normal, true);
                        self.draw_pixel(&vertex);
                    }
                }
            }
            RasterMode::Scanline => {
                for y in y0..=y1 {
                    let row = y as f32;
                    let Some((lo, hi)) = triangle.scanline_span(row) else {
                        continue;
                    };
                    let left = lo.ceil().max(x0 as f32);
                    let right = hi.floor().min(x1 as f32);
                    if left > right {
                        continue;
                    }
                    let start = Vec2::new(left, row);
                    let end = Vec2::new(right, row);
                    let a = self.fragment(triangle, start, triangle.barycentric(start), normal, false);
                    let b = self.fragment(triangle, end, triangle.barycentric(end), normal, false);
                    self.draw_line(&a, &b);
                }
            }
        }
        true
    }

    fn draw_edges(&mut self, triangle: &Triangle, normal: Option<Vec4>) {
        let corners = triangle
            .vertices()
            .map(|v| self.lit(v.color, normal.unwrap_or(v.normal)));
        let [a, b, c] = triangle.vertices();
        let [ca, cb, cc] = corners;
        let (a, b, c) = (a.with_color(ca), b.with_color(cb), c.with_color(cc));
        self.draw_line(&a, &b);
        self.draw_line(&b, &c);
        self.draw_line(&c, &a);
    }

    /// Interpolated, shaded and textured sample at `pos`
    fn fragment(
        &self,
        triangle: &Triangle,
        pos: Vec2,
        (s, t, u): (f32, f32, f32),
        normal: Option<Vec4>,
        textured: bool,
    ) -> Vertex {
        let (v1, v2, v3) = (triangle.v1(), triangle.v2(), triangle.v3());

        let z = v1.z() * s + v2.z() * t + v3.z() * u;
        let normal = normal.unwrap_or_else(|| v1.normal * s + v2.normal * t + v3.normal * u);
        let texture: Vec3 = v1.texture * s + v2.texture * t + v3.texture * u;

        let mut color = self.lit(v1.color * s + v2.color * t + v3.color * u, normal);
        if textured && self.settings.flags.contains(RenderFlags::TEXTURE) {
            if let Some(image) = &self.texture {
                color = color.component_mul(image.sample_nearest(texture.x, texture.y));
            }
        }

        Vertex::new(Vec4::new(pos.x, pos.y, z, 1.0), color)
            .with_normal(normal)
            .with_texture(texture)
    }

    /// Color scaled by the light term; alpha is kept
    fn lit(&self, color: Vec4, normal: Vec4) -> Vec4 {
        if !self.settings.flags.contains(RenderFlags::SHADING) {
            return color;
        }
        let shade = shade_intensity(normal, self.settings.light_dir, self.settings.ambient);
        Vec4::new(color.x * shade, color.y * shade, color.z * shade, color.w)
    }
}
