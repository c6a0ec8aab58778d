//! Geometry and colour types shared by entities and the renderer.
//!
//! Canonical CPU space:
//! - pixels, origin top-left
//! - +X right, +Y down
//!
//! The sprite shader converts to NDC using the screen size and view offset.

mod rgb;
mod vec2;
mod viewport;

pub use rgb::Rgb;
pub use vec2::Vec2;
pub use viewport::Viewport;
