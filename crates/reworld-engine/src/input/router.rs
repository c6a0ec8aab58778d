//! Raw event normalization and dispatch.
//!
//! Order for every accepted event:
//! 1. latch the new state,
//! 2. call the game hook,
//! 3. call each live entity's hook in draw-list order.
//!
//! Auto-repeat transitions are dropped before step 1.

use crate::core::Game;
use crate::stage::Stage;

use super::types::{Action, RawAction, RawButtonEvent, RawCursorEvent, RawKeyEvent};

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum RawEvent {
    Key(RawKeyEvent),
    Button(RawButtonEvent),
    Cursor(RawCursorEvent),
}

impl From<RawKeyEvent> for RawEvent {
    fn from(ev: RawKeyEvent) -> Self {
        RawEvent::Key(ev)
    }
}

impl From<RawButtonEvent> for RawEvent {
    fn from(ev: RawButtonEvent) -> Self {
        RawEvent::Button(ev)
    }
}

impl From<RawCursorEvent> for RawEvent {
    fn from(ev: RawCursorEvent) -> Self {
        RawEvent::Cursor(ev)
    }
}

/// Maps a window-system transition to the one delivered to hooks.
///
/// Returns `None` for auto-repeat.
#[inline]
pub fn normalize(action: RawAction) -> Option<Action> {
    match action {
        RawAction::Press => Some(Action::Pressed),
        RawAction::Release => Some(Action::Released),
        RawAction::Repeat => None,
    }
}

#[derive(Debug, Default)]
pub struct EventRouter {
    dropped_repeats: u64,
}

impl EventRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of auto-repeat events discarded so far.
    #[inline]
    pub fn dropped_repeats(&self) -> u64 {
        self.dropped_repeats
    }

    /// Routes one event. Returns `false` if it was dropped.
    pub fn route<G: Game + ?Sized>(&mut self, stage: &mut Stage, game: &mut G, event: RawEvent) -> bool {
        match event {
            RawEvent::Key(RawKeyEvent { key, action }) => {
                let Some(action) = self.accept(action) else {
                    return false;
                };
                stage.input_mut().latch_key(key, action);
                game.key(stage, key, action);
                stage.dispatch(|behavior, thing, stage| behavior.key(thing, stage, key, action));
            }

            RawEvent::Button(RawButtonEvent { button, action }) => {
                let Some(action) = self.accept(action) else {
                    return false;
                };
                stage.input_mut().latch_button(button, action);
                game.click(stage, button, action);
                stage.dispatch(|behavior, thing, stage| behavior.click(thing, stage, button, action));
            }

            RawEvent::Cursor(RawCursorEvent { position }) => {
                stage.input_mut().set_cursor(position);
                let position = stage.cursor_position();
                game.mouse(stage, position);
                stage.dispatch(|behavior, thing, stage| behavior.mouse(thing, stage, position));
            }
        }
        true
    }

    fn accept(&mut self, action: RawAction) -> Option<Action> {
        let normalized = normalize(action);
        if normalized.is_none() {
            self.dropped_repeats += 1;
        }
        normalized
    }
}
