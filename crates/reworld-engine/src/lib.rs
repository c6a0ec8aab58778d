//! ReWorld engine crate.
//!
//! A small 2D sprite engine: entities are textured quads in one shared vertex
//! buffer, textures are regions of one atlas, and game logic hooks into a
//! per-frame update pass and routed input events.
//!
//! - `stage`: the world passed to every hook (entities, textures, input, view)
//! - `core`: `Game` hooks and the `Engine` frame orchestrator
//! - `render`, `device`, `window`: wgpu + winit presentation

pub mod atlas;
pub mod config;
pub mod coords;
pub mod core;
pub mod device;
pub mod draw_list;
pub mod error;
pub mod input;
pub mod logging;
pub mod render;
pub mod slots;
pub mod stage;
pub mod texture;
pub mod thing;
pub mod vertex_buffer;
pub mod window;

pub use config::EngineConfig;
pub use core::{AppControl, Engine, Game};
pub use error::{EngineError, Result};
pub use stage::{Behavior, Stage};
pub use texture::{DecodedImage, TextureHandle};
pub use thing::{Thing, ThingDesc, ThingId};
