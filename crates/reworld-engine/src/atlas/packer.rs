use crate::error::{EngineError, Result};

use super::Region;

/// First-fit rectangle allocator over a fixed `width × height` texel grid.
///
/// Candidates are scanned column by column: `x` in the outer loop, `y` in the
/// inner loop. The first candidate whose whole footprint is free wins. The
/// scan order decides the layout, so it must not change.
///
/// Cost is O(W·H·w·h) in the worst case. That is fine for load-time allocation
/// into a small atlas; it does not scale to large atlases.
///
/// Regions are never freed.
#[derive(Debug, Clone)]
pub struct AtlasPacker {
    width: u32,
    height: u32,
    occupied: Vec<bool>,
    used: u64,
}

impl AtlasPacker {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            occupied: vec![false; width as usize * height as usize],
            used: 0,
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

    /// Texels claimed so far.
    #[inline]
    pub fn used_area(&self) -> u64 {
        self.used
    }

    /// Reserves a `width × height` region.
    pub fn allocate(&mut self, width: u32, height: u32) -> Result<Region> {
        if width == 0 || height == 0 {
            return Err(EngineError::EmptyRegion { width, height });
        }

        let Some((x, y)) = self.find_free(width, height) else {
            log::error!(
                "atlas full: no room for {width}x{height} in {}x{}",
                self.width,
                self.height
            );
            return Err(EngineError::AtlasFull {
                width,
                height,
                atlas_width: self.width,
                atlas_height: self.height,
            });
        };

        let region = Region::new(x, y, width, height);
        self.mark(region);
        log::debug!("atlas: allocated {width}x{height} at ({x}, {y})");
        Ok(region)
    }

    fn find_free(&self, width: u32, height: u32) -> Option<(u32, u32)> {
        if width > self.width || height > self.height {
            return None;
        }

        for x in 0..=self.width - width {
            for y in 0..=self.height - height {
                if self.is_free(x, y, width, height) {
                    return Some((x, y));
                }
            }
        }
        None
    }

    fn is_free(&self, x: u32, y: u32, width: u32, height: u32) -> bool {
        (x..x + width).all(|cx| (y..y + height).all(|cy| !self.occupied[self.cell(cx, cy)]))
    }

    fn mark(&mut self, region: Region) {
        for cy in region.y..region.bottom() {
            for cx in region.x..region.right() {
                let cell = self.cell(cx, cy);
                self.occupied[cell] = true;
            }
        }
        self.used += u64::from(region.width) * u64::from(region.height);
    }

    #[inline]
    fn cell(&self, x: u32, y: u32) -> usize {
        x as usize + y as usize * self.width as usize
    }
}
