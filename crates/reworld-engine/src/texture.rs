//! Texture handles into the shared atlas.
//!
//! A `TextureHandle` is a small `Copy` value: an atlas region plus flip flags.
//! Flipping, sampling and splitting derive new handles without touching the
//! atlas or the GPU.

use std::path::Path;

use crate::atlas::{Region, BYTES_PER_TEXEL};
use crate::error::{EngineError, Result};

/// Normalized texture coordinates of a handle, already flipped.
///
/// `(x1, y1)` maps to the quad's top-left corner, `(x2, y2)` to bottom-right.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct UvRect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextureHandle {
    region: Region,
    flip_x: bool,
    flip_y: bool,
    atlas_width: u32,
    atlas_height: u32,
}

impl Default for TextureHandle {
    /// Empty handle: zero-sized region, all UVs zero.
    fn default() -> Self {
        Self {
            region: Region::default(),
            flip_x: false,
            flip_y: false,
            atlas_width: 1,
            atlas_height: 1,
        }
    }
}

impl TextureHandle {
    pub(crate) fn new(region: Region, atlas_width: u32, atlas_height: u32) -> Self {
        Self {
            region,
            flip_x: false,
            flip_y: false,
            atlas_width: atlas_width.max(1),
            atlas_height: atlas_height.max(1),
        }
    }

    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.region.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.region.height
    }

    #[inline]
    pub fn is_child(&self) -> bool {
        self.region.child
    }

    #[inline]
    pub fn flipped_x(&self) -> bool {
        self.flip_x
    }

    #[inline]
    pub fn flipped_y(&self) -> bool {
        self.flip_y
    }

    #[must_use]
    pub fn flip_vertically(self) -> Self {
        Self {
            flip_y: !self.flip_y,
            ..self
        }
    }

    #[must_use]
    pub fn flip_horizontally(self) -> Self {
        Self {
            flip_x: !self.flip_x,
            ..self
        }
    }

    /// Handle to a sub-rectangle of this one, offset from its top-left corner.
    ///
    /// Flip flags carry over. Fails if the rectangle leaves the parent region.
    pub fn sample(self, start_x: u32, start_y: u32, width: u32, height: u32) -> Result<Self> {
        let region = self.region.sub(start_x, start_y, width, height)?;
        Ok(Self { region, ..self })
    }

    /// Splits into `columns × rows` equal tiles, row-major.
    pub fn split(self, columns: u32, rows: u32) -> Result<Vec<Self>> {
        Ok(self
            .region
            .split(columns, rows)?
            .into_iter()
            .map(|region| Self { region, ..self })
            .collect())
    }

    pub fn uv(&self) -> UvRect {
        let w = self.atlas_width as f32;
        let h = self.atlas_height as f32;

        let u0 = self.region.x as f32 / w;
        let v0 = self.region.y as f32 / h;
        let u1 = self.region.right() as f32 / w;
        let v1 = self.region.bottom() as f32 / h;

        let (x1, x2) = if self.flip_x { (u1, u0) } else { (u0, u1) };
        let (y1, y2) = if self.flip_y { (v1, v0) } else { (v0, v1) };

        UvRect { x1, y1, x2, y2 }
    }
}

/// Decoded RGBA8 image, rows tightly packed.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Image filled with one colour.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * BYTES_PER_TEXEL)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Reads and decodes an image file, converting to RGBA8.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| EngineError::Decode {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    /// Decodes an in-memory encoded image (PNG, JPEG, ...).
    pub fn from_encoded(bytes: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(bytes).map_err(|source| EngineError::Decode {
            path: "<memory>".to_string(),
            source,
        })?;
        Ok(Self::from_rgba(img.to_rgba8()))
    }

    fn from_rgba(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(x: u32, y: u32, w: u32, h: u32) -> TextureHandle {
        TextureHandle::new(Region::new(x, y, w, h), 100, 50)
    }

    // ── uv ────────────────────────────────────────────────────────────────

    #[test]
    fn uv_is_region_over_atlas_size() {
        let uv = handle(10, 5, 20, 10).uv();
        assert_eq!(uv, UvRect { x1: 0.1, y1: 0.1, x2: 0.3, y2: 0.3 });
    }

    #[test]
    fn flip_horizontally_swaps_u_only() {
        let plain = handle(10, 5, 20, 10).uv();
        let flipped = handle(10, 5, 20, 10).flip_horizontally().uv();
        assert_eq!((flipped.x1, flipped.x2), (plain.x2, plain.x1));
        assert_eq!((flipped.y1, flipped.y2), (plain.y1, plain.y2));
    }

    #[test]
    fn flip_vertically_swaps_v_only() {
        let plain = handle(10, 5, 20, 10).uv();
        let flipped = handle(10, 5, 20, 10).flip_vertically().uv();
        assert_eq!((flipped.y1, flipped.y2), (plain.y2, plain.y1));
        assert_eq!((flipped.x1, flipped.x2), (plain.x1, plain.x2));
    }

    #[test]
    fn double_flip_restores_uv() {
        let t = handle(3, 4, 5, 6);
        assert_eq!(t.flip_horizontally().flip_horizontally().uv(), t.uv());
        assert_eq!(t.flip_vertically().flip_vertically().uv(), t.uv());
        assert_eq!(t.flip_horizontally().flip_horizontally(), t);
    }

    #[test]
    fn default_handle_has_zero_uv() {
        assert_eq!(TextureHandle::default().uv(), UvRect::default());
    }

    // ── sample / split ────────────────────────────────────────────────────

    #[test]
    fn sample_is_child_and_keeps_flips() {
        let s = handle(10, 10, 20, 20).flip_vertically().sample(5, 5, 10, 10).unwrap();
        assert!(s.is_child());
        assert!(s.flipped_y());
        assert_eq!(s.region(), Region { x: 15, y: 15, width: 10, height: 10, child: true });
    }

    #[test]
    fn sample_out_of_bounds_fails() {
        assert!(handle(0, 0, 8, 8).sample(4, 4, 8, 8).is_err());
    }

    #[test]
    fn split_tiles_are_row_major_handles() {
        let tiles = handle(0, 0, 10, 10).split(2, 2).unwrap();
        let origins: Vec<_> = tiles.iter().map(|t| (t.region().x, t.region().y)).collect();
        assert_eq!(origins, vec![(0, 0), (5, 0), (0, 5), (5, 5)]);
    }

    // ── decoded image ─────────────────────────────────────────────────────

    #[test]
    fn solid_image_has_expected_length() {
        let img = DecodedImage::solid(3, 2, [1, 2, 3, 4]);
        assert_eq!(img.pixels.len(), 24);
        assert_eq!(&img.pixels[4..8], &[1, 2, 3, 4]);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            DecodedImage::from_encoded(b"not an image"),
            Err(EngineError::Decode { .. })
        ));
    }
}
