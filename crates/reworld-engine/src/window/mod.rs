//! Window and event loop.
//!
//! Owns the `winit` event loop and the single game window, and drives the
//! engine and the sprite renderer from it.

mod runtime;

pub use runtime::Runtime;
