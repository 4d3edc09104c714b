//! RGBA float image
//!
//! Pixels are stored row by row starting at the bottom row, matching the
//! viewport mapping (row 0 is NDC y = -1) and the TGA default origin.
//!
//! TGA support covers uncompressed truecolor images (type 2) at 24 or 32
//! bits per pixel, decoded and encoded through the `image` crate. Channels are
//! normalized to `[0, 1]` on load.

use std::path::Path;

use image::codecs::tga::TgaEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageFormat};
use softgl_core::AssetError;
use softgl_math::Vec4;

/// Fill color of a freshly created image
pub const DEFAULT_FILL: Vec4 = Vec4::new(0.2, 0.0, 0.2, 1.0);

const TGA_HEADER_LEN: usize = 18;
const TGA_TRUECOLOR: u8 = 2;

/// Fixed-size grid of RGBA pixels
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Vec4>,
}

impl Image {
    /// Create an image filled with [`DEFAULT_FILL`]
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, DEFAULT_FILL)
    }

    pub fn filled(width: usize, height: usize, color: Vec4) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    /// Pixels as a flat `[r, g, b, a, r, g, b, a, ...]` slice
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.pixels)
    }

    pub fn fill(&mut self, color: Vec4) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Vec4> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Write a pixel; out-of-range coordinates are ignored
    pub fn set(&mut self, x: usize, y: usize, color: Vec4) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Nearest texel for texture coordinate `(u, v)`, clamped to the edges
    ///
    /// `v = 0` is the bottom row. An empty image samples as white.
    pub fn sample_nearest(&self, u: f32, v: f32) -> Vec4 {
        if self.pixels.is_empty() || !u.is_finite() || !v.is_finite() {
            return Vec4::ONE;
        }
        let x = ((u.clamp(0.0, 1.0) * self.width as f32) as usize).min(self.width - 1);
        let y = ((v.clamp(0.0, 1.0) * self.height as f32) as usize).min(self.height - 1);
        self.pixels[y * self.width + x]
    }

    // ==================== TGA ====================

    /// Load an uncompressed truecolor TGA file
    pub fn load_tga<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let image = Self::from_tga_bytes(&bytes)?;
        log::info!("Loaded texture {}: {}x{}", path.display(), image.width, image.height);
        Ok(image)
    }

    /// Decode an uncompressed truecolor TGA image
    ///
    /// The header is checked against the supported subset before the pixel
    /// data is handed to the `image` decoder.
    pub fn from_tga_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let (width, height) = check_tga_header(bytes)?;

        let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Tga)
            .map_err(tga_error)?
            .to_rgba32f();

        // Decoded rows run top to bottom
        let pixels = decoded
            .as_raw()
            .chunks_exact(width * 4)
            .rev()
            .flat_map(|row| row.chunks_exact(4))
            .map(|c| Vec4::from([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self { width, height, pixels })
    }

    /// Encode as a 32-bit uncompressed TGA
    ///
    /// Channels are clamped to `[0, 1]`. Fails when a side exceeds 65535.
    pub fn to_tga_bytes(&self) -> Result<Vec<u8>, AssetError> {
        let mut rgba = Vec::with_capacity(self.pixels.len() * 4);
        for row in self.pixels.chunks_exact(self.width.max(1)).rev() {
            for p in row {
                rgba.extend(p.clamp(0.0, 1.0).to_array().map(|c| (c * 255.0).round() as u8));
            }
        }

        let mut bytes = Vec::new();
        TgaEncoder::new(&mut bytes)
            .disable_rle()
            .write_image(&rgba, self.width as u32, self.height as u32, ExtendedColorType::Rgba8)
            .map_err(tga_error)?;
        Ok(bytes)
    }

    pub fn save_tga<P: AsRef<Path>>(&self, path: P) -> Result<(), AssetError> {
        std::fs::write(path, self.to_tga_bytes()?)?;
        Ok(())
    }
}

/// Validate a TGA header and the pixel data length, returning the image size
fn check_tga_header(bytes: &[u8]) -> Result<(usize, usize), AssetError> {
    let header = bytes
        .get(..TGA_HEADER_LEN)
        .ok_or_else(|| AssetError::parse(0, "TGA header is truncated"))?;

    let id_length = header[0] as usize;
    let colour_map_type = header[1];
    let image_type = header[2];
    let width = u16::from_le_bytes([header[12], header[13]]) as usize;
    let height = u16::from_le_bytes([header[14], header[15]]) as usize;
    let bits_per_pixel = header[16];

    if image_type != TGA_TRUECOLOR {
        return Err(AssetError::Unsupported(format!("TGA image type {}", image_type)));
    }
    if colour_map_type != 0 {
        return Err(AssetError::Unsupported("TGA colour map".to_string()));
    }
    let channels = match bits_per_pixel {
        24 => 3,
        32 => 4,
        other => {
            return Err(AssetError::Unsupported(format!("TGA pixel depth {}", other)));
        }
    };
    if width == 0 || height == 0 {
        return Err(AssetError::parse(0, format!("TGA size {}x{}", width, height)));
    }

    let needed = TGA_HEADER_LEN + id_length + width * height * channels;
    if bytes.len() < needed {
        return Err(AssetError::parse(0, "TGA pixel data is truncated"));
    }
    Ok((width, height))
}

fn tga_error(err: ImageError) -> AssetError {
    match err {
        ImageError::IoError(err) => AssetError::Io(err),
        ImageError::Unsupported(err) => AssetError::Unsupported(err.to_string()),
        other => AssetError::parse(0, other.to_string()),
    }
}
