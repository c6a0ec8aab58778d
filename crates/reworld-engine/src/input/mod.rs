//! Input subsystem.
//!
//! The public surface is backend-agnostic: the runtime turns window events into
//! `RawKeyEvent` / `RawButtonEvent` / `RawCursorEvent`, and the router turns
//! those into latched state plus hook calls.

mod router;
mod state;
mod types;

pub mod platform;

pub use router::{normalize, EventRouter, RawEvent};
pub use state::InputState;
pub use types::{Action, Key, MouseButton, RawAction, RawButtonEvent, RawCursorEvent, RawKeyEvent};
