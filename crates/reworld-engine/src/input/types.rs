use std::fmt;

use crate::coords::Vec2;

/// Keyboard key identifier.
///
/// Keys are identified by physical position (US layout names). The runtime
/// maps platform key codes into these; anything else arrives as
/// `Key::Unknown` with the platform code so it still latches consistently.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    LeftShift,
    RightShift,
    LeftControl,
    RightControl,
    LeftAlt,
    RightAlt,

    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Unknown(code) => write!(f, "Unknown(0x{code:x})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Transition delivered to game and entity hooks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    Pressed,
    Released,
}

impl Action {
    #[inline]
    pub fn is_pressed(self) -> bool {
        matches!(self, Action::Pressed)
    }
}

/// Transition as reported by the window system, auto-repeat included.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RawAction {
    Press,
    Release,
    Repeat,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RawKeyEvent {
    pub key: Key,
    pub action: RawAction,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RawButtonEvent {
    pub button: MouseButton,
    pub action: RawAction,
}

/// Cursor position in window pixels, before the view offset is applied.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RawCursorEvent {
    pub position: Vec2,
}
