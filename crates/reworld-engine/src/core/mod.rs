//! Game-facing contracts and the frame orchestrator.
//!
//! `Engine` is pure CPU: it runs hooks, maintains the draw list and produces a
//! `FramePlan`. The window runtime feeds it events and hands the plan to the
//! sprite renderer.

mod app;
mod engine;

pub use app::{AppControl, Game};
pub use engine::{DrawCall, Engine, FramePlan};
