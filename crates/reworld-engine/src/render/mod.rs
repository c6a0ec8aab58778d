//! GPU side of sprite drawing.
//!
//! Convention:
//! - vertex positions are logical pixels, top-left origin, +Y down
//! - the vertex shader adds the view offset, then maps to NDC with the screen size

mod ctx;
mod sprite;

pub use ctx::{RenderCtx, RenderTarget};
pub use sprite::SpriteRenderer;
