use super::Vec2;

/// Screen size in pixels plus the current view offset.
///
/// The offset is added to every vertex position in the shader and subtracted
/// from cursor coordinates before they reach game code, so both agree on
/// where an entity is.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub offset: Vec2,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            offset: Vec2::ZERO,
        }
    }

    #[inline]
    pub fn with_offset(self, offset: Vec2) -> Self {
        Self { offset, ..self }
    }

    /// Converts a device-space cursor position into view space.
    #[inline]
    pub fn to_view(self, device: Vec2) -> Vec2 {
        device - self.offset
    }
}
