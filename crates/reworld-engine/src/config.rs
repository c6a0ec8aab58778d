//! Engine construction parameters.

use crate::coords::Rgb;

/// Sizes and window settings fixed for the engine's lifetime.
///
/// `max_things` bounds both the slot pool and the GPU vertex buffer, and the
/// atlas size bounds every texture allocation, so both must be chosen for the
/// heaviest scene the game will show.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub max_things: u32,
    pub atlas_width: u32,
    pub atlas_height: u32,

    /// Logical window size; also the screen size used for projection.
    pub window_width: u32,
    pub window_height: u32,
    pub title: String,

    pub background: Rgb,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_things: 500,
            atlas_width: 500,
            atlas_height: 500,
            window_width: 800,
            window_height: 600,
            title: "ReWorld".to_string(),
            background: Rgb::BLACK,
        }
    }
}

impl EngineConfig {
    pub fn with_max_things(mut self, max_things: u32) -> Self {
        self.max_things = max_things;
        self
    }

    pub fn with_atlas_size(mut self, width: u32, height: u32) -> Self {
        self.atlas_width = width;
        self.atlas_height = height;
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_width = width;
        self.window_height = height;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_background(mut self, background: Rgb) -> Self {
        self.background = background;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.max_things, 500);
        assert_eq!((c.atlas_width, c.atlas_height), (500, 500));
        assert_eq!((c.window_width, c.window_height), (800, 600));
        assert_eq!(c.title, "ReWorld");
        assert_eq!(c.background, Rgb::BLACK);
    }

    #[test]
    fn builders_override_single_fields() {
        let c = EngineConfig::default().with_max_things(4).with_title("t");
        assert_eq!(c.max_things, 4);
        assert_eq!(c.title, "t");
        assert_eq!(c.atlas_width, 500);
    }
}
