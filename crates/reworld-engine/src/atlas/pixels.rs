use crate::error::{EngineError, Result};

use super::Region;

pub const BYTES_PER_TEXEL: usize = 4;

/// CPU copy of the atlas pixels (RGBA8, tightly packed rows).
///
/// Writes land here first; regions written since the last `take_dirty` are
/// uploaded to the GPU texture by the renderer.
#[derive(Debug, Clone)]
pub struct AtlasImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    dirty: Vec<Region>,
}

impl AtlasImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * BYTES_PER_TEXEL],
            dirty: Vec::new(),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whole atlas, row stride `width * 4`.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Byte offset of texel `(x, y)` in `pixels()`.
    #[inline]
    pub fn offset_of(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * BYTES_PER_TEXEL
    }

    /// Copies `rgba` (tightly packed `region.width * 4` byte rows) into `region`.
    pub fn write(&mut self, region: Region, rgba: &[u8]) -> Result<()> {
        let row_bytes = region.width as usize * BYTES_PER_TEXEL;
        let expected = row_bytes * region.height as usize;
        if rgba.len() != expected {
            return Err(EngineError::PixelSizeMismatch {
                expected,
                actual: rgba.len(),
            });
        }
        if region.right() > self.width || region.bottom() > self.height {
            return Err(EngineError::RegionOutOfAtlas {
                region,
                atlas_width: self.width,
                atlas_height: self.height,
            });
        }

        if region.is_empty() {
            return Ok(());
        }

        for (row, src) in rgba.chunks_exact(row_bytes).enumerate() {
            let start = self.offset_of(region.x, region.y + row as u32);
            self.pixels[start..start + row_bytes].copy_from_slice(src);
        }

        self.dirty.push(region);
        Ok(())
    }

    /// RGBA of a single texel.
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = self.offset_of(x, y);
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    #[inline]
    pub fn has_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Regions written since the previous call, in write order.
    pub fn take_dirty(&mut self) -> Vec<Region> {
        std::mem::take(&mut self.dirty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_lands_at_region_offset() {
        let mut img = AtlasImage::new(4, 4);
        let px: Vec<u8> = (0..2 * 2 * 4).map(|i| i as u8).collect();
        img.write(Region::new(1, 2, 2, 2), &px).unwrap();

        assert_eq!(img.texel(1, 2), [0, 1, 2, 3]);
        assert_eq!(img.texel(2, 2), [4, 5, 6, 7]);
        assert_eq!(img.texel(1, 3), [8, 9, 10, 11]);
        assert_eq!(img.texel(2, 3), [12, 13, 14, 15]);
        assert_eq!(img.texel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn wrong_length_is_rejected_and_not_marked_dirty() {
        let mut img = AtlasImage::new(4, 4);
        assert!(matches!(
            img.write(Region::new(0, 0, 2, 2), &[0; 15]),
            Err(EngineError::PixelSizeMismatch { expected: 16, actual: 15 })
        ));
        assert!(!img.has_dirty());
    }

    #[test]
    fn region_past_the_edge_is_rejected() {
        let mut img = AtlasImage::new(8, 8);
        assert!(matches!(
            img.write(Region::new(0, 0, 16, 1), &[200; 64]),
            Err(EngineError::RegionOutOfAtlas { atlas_width: 8, atlas_height: 8, .. })
        ));
        assert!(matches!(
            img.write(Region::new(6, 7, 2, 2), &[200; 16]),
            Err(EngineError::RegionOutOfAtlas { .. })
        ));
        assert_eq!(img.texel(0, 1), [0, 0, 0, 0]);
        assert!(!img.has_dirty());
    }

    #[test]
    fn take_dirty_drains() {
        let mut img = AtlasImage::new(4, 4);
        img.write(Region::new(0, 0, 1, 1), &[9; 4]).unwrap();
        img.write(Region::new(3, 3, 1, 1), &[7; 4]).unwrap();
        assert_eq!(img.take_dirty().len(), 2);
        assert!(img.take_dirty().is_empty());
    }
}
