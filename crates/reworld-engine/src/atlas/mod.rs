//! Shared texture atlas.
//!
//! Every texture in the engine lives in one fixed-size RGBA8 atlas:
//! - `AtlasPacker` hands out non-overlapping rectangles (never reclaimed)
//! - `Region` describes one rectangle, possibly derived from another
//! - `AtlasImage` is the CPU copy of the atlas pixels plus dirty tracking

mod pixels;
mod packer;
mod region;

pub use pixels::{AtlasImage, BYTES_PER_TEXEL};
pub use packer::AtlasPacker;
pub use region::Region;
