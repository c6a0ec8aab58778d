//! Engine error type.
//!
//! Capacity errors (`Exhausted`, `AtlasFull`) mean the configured pool or
//! atlas is too small for the workload. Geometry errors (`Divisibility`,
//! `SampleOutOfBounds`) mean a tile grid does not match its sheet. Neither is
//! expected to be recovered from at runtime.

use crate::atlas::Region;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Every slot of the shared vertex buffer is occupied.
    #[error("all {capacity} entity slots are in use")]
    Exhausted { capacity: u32 },

    /// No free `width × height` rectangle is left in the atlas.
    #[error("no free {width}x{height} region in the {atlas_width}x{atlas_height} atlas")]
    AtlasFull {
        width: u32,
        height: u32,
        atlas_width: u32,
        atlas_height: u32,
    },

    /// A region cannot be cut into an even `columns × rows` grid.
    #[error("{width}x{height} region does not split into a {columns}x{rows} grid")]
    Divisibility {
        width: u32,
        height: u32,
        columns: u32,
        rows: u32,
    },

    /// A sample rectangle reaches outside its parent region.
    #[error("sample {requested:?} lies outside parent region {parent:?}")]
    SampleOutOfBounds { parent: Region, requested: Region },

    /// Zero-width or zero-height allocation.
    #[error("cannot allocate an empty {width}x{height} region")]
    EmptyRegion { width: u32, height: u32 },

    /// A region does not fit inside the atlas it is written to.
    #[error("region {region:?} lies outside the {atlas_width}x{atlas_height} atlas")]
    RegionOutOfAtlas {
        region: Region,
        atlas_width: u32,
        atlas_height: u32,
    },

    /// Release of a slot that is free or outside the pool.
    #[error("slot {index} is not allocated")]
    SlotNotAllocated { index: u32 },

    /// The id refers to an entity that was already removed (or never existed).
    #[error("thing in slot {slot} (generation {generation}) is not live")]
    ThingNotLive { slot: u32, generation: u32 },

    /// The entity's own hook is running and holds it; use the hook's `thing`.
    #[error("thing in slot {slot} is held by its running hook")]
    ThingInUse { slot: u32 },

    /// Pixel buffer length does not match `width * height * 4`.
    #[error("expected {expected} bytes of RGBA8 pixels, got {actual}")]
    PixelSizeMismatch { expected: usize, actual: usize },

    /// Image file could not be read or decoded.
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
}
