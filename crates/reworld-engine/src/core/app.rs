use crate::coords::Vec2;
use crate::error::Result;
use crate::input::{Action, Key, MouseButton};
use crate::stage::Stage;

/// Control directive returned by the per-frame hook.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Global hooks implemented by a game.
///
/// Every hook runs before the corresponding entity hooks of the same frame or
/// event. All hooks except `create` default to no-ops.
pub trait Game {
    /// Called once after the stage is built, before the first frame.
    fn create(&mut self, stage: &mut Stage) -> Result<()> {
        let _ = stage;
        Ok(())
    }

    /// Called once per frame, before entity updates.
    fn update(&mut self, stage: &mut Stage) -> AppControl {
        let _ = stage;
        AppControl::Continue
    }

    fn key(&mut self, stage: &mut Stage, key: Key, action: Action) {
        let _ = (stage, key, action);
    }

    /// Cursor moved; `position` is in view space.
    fn mouse(&mut self, stage: &mut Stage, position: Vec2) {
        let _ = (stage, position);
    }

    fn click(&mut self, stage: &mut Stage, button: MouseButton, action: Action) {
        let _ = (stage, button, action);
    }

    /// Called after entity updates and compaction, just before the frame is
    /// planned. View offset and background set here apply to this frame.
    fn render_setup(&mut self, stage: &mut Stage) {
        let _ = stage;
    }
}

/// No global hooks; entities drive everything.
impl Game for () {}
