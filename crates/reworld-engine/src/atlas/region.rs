use crate::error::{EngineError, Result};

/// Rectangle inside the atlas, in texels, origin top-left.
///
/// `child` marks regions derived from another region by sampling or splitting;
/// those never consumed atlas space of their own.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub child: bool,
}

impl Region {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            child: false,
        }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Exclusive right edge.
    #[inline]
    pub fn right(self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn overlaps(self, other: Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Child region at `(start_x, start_y)` relative to this one.
    ///
    /// The requested rectangle must lie inside `self`.
    pub fn sub(self, start_x: u32, start_y: u32, width: u32, height: u32) -> Result<Region> {
        let requested = Region {
            x: self.x.saturating_add(start_x),
            y: self.y.saturating_add(start_y),
            width,
            height,
            child: true,
        };

        let fits_x = start_x
            .checked_add(width)
            .is_some_and(|end| end <= self.width);
        let fits_y = start_y
            .checked_add(height)
            .is_some_and(|end| end <= self.height);

        if fits_x && fits_y {
            Ok(requested)
        } else {
            Err(EngineError::SampleOutOfBounds {
                parent: self,
                requested,
            })
        }
    }

    /// Cuts the region into a `columns × rows` grid of equal children.
    ///
    /// Children are returned row-major: every column of row 0, then row 1, ...
    pub fn split(self, columns: u32, rows: u32) -> Result<Vec<Region>> {
        if columns == 0 || rows == 0 || self.width % columns != 0 || self.height % rows != 0 {
            return Err(EngineError::Divisibility {
                width: self.width,
                height: self.height,
                columns,
                rows,
            });
        }

        let tile_w = self.width / columns;
        let tile_h = self.height / rows;

        let mut tiles = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows {
            for col in 0..columns {
                tiles.push(self.sub(col * tile_w, row * tile_h, tile_w, tile_h)?);
            }
        }
        Ok(tiles)
    }
}
