use std::collections::HashMap;

use crate::coords::Vec2;

use super::types::{Action, Key, MouseButton};

/// Latched input state.
///
/// Each key or button maps to whether its last delivered transition was a
/// press. A key never seen is reported as up.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashMap<Key, bool>,
    buttons: HashMap<MouseButton, bool>,

    /// Last cursor position in window pixels (view offset not applied).
    cursor: Vec2,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latch_key(&mut self, key: Key, action: Action) {
        self.keys.insert(key, action.is_pressed());
    }

    pub fn latch_button(&mut self, button: MouseButton, action: Action) {
        self.buttons.insert(button, action.is_pressed());
    }

    #[inline]
    pub fn set_cursor(&mut self, device: Vec2) {
        self.cursor = device;
    }

    #[inline]
    pub fn key_down(&self, key: Key) -> bool {
        self.keys.get(&key).copied().unwrap_or(false)
    }

    #[inline]
    pub fn button_down(&self, button: MouseButton) -> bool {
        self.buttons.get(&button).copied().unwrap_or(false)
    }

    /// Cursor in window pixels.
    #[inline]
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    /// Forgets every held key and button.
    ///
    /// The runtime calls this on focus loss, when releases may never arrive.
    pub fn clear_latches(&mut self) {
        self.keys.clear();
        self.buttons.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unseen_keys_are_up() {
        let state = InputState::new();
        assert!(!state.key_down(Key::A));
        assert!(!state.button_down(MouseButton::Left));
    }

    #[test]
    fn latest_transition_wins() {
        let mut state = InputState::new();
        state.latch_key(Key::Space, Action::Pressed);
        assert!(state.key_down(Key::Space));
        state.latch_key(Key::Space, Action::Released);
        assert!(!state.key_down(Key::Space));

        state.latch_button(MouseButton::Right, Action::Pressed);
        assert!(state.button_down(MouseButton::Right));
        assert!(!state.button_down(MouseButton::Left));
    }

    #[test]
    fn clear_releases_everything() {
        let mut state = InputState::new();
        state.latch_key(Key::W, Action::Pressed);
        state.latch_button(MouseButton::Left, Action::Pressed);
        state.clear_latches();
        assert!(!state.key_down(Key::W));
        assert!(!state.button_down(MouseButton::Left));
    }
}
