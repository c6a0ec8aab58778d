//! Renderable entities.

use crate::coords::{Rgb, Vec2};
use crate::stage::Stage;
use crate::texture::TextureHandle;
use crate::vertex_buffer::{SpriteVertex, QUAD_VERTICES};

/// Stable handle to a live entity.
///
/// `slot` is the entity's index into the shared vertex buffer. `generation`
/// distinguishes successive occupants of the same slot, so an id kept past
/// `Stage::remove` never resolves to the next entity placed there.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ThingId {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl ThingId {
    #[inline]
    pub fn slot(self) -> u32 {
        self.slot
    }

    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Construction parameters for a `Thing`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ThingDesc {
    pub position: Vec2,
    pub size: Vec2,
    pub texture: TextureHandle,
}

impl ThingDesc {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            position: Vec2::new(x, y),
            size: Vec2::new(width, height),
            texture: TextureHandle::default(),
        }
    }

    pub fn with_texture(self, texture: TextureHandle) -> Self {
        Self { texture, ..self }
    }
}

/// Visual and transform state of one entity.
///
/// Field writes are not seen by the renderer until `save` is called.
#[derive(Debug, Clone, PartialEq)]
pub struct Thing {
    id: ThingId,

    pub position: Vec2,
    pub size: Vec2,

    /// Pivot for `rotation`, relative to `position`.
    pub origin: Vec2,
    /// Radians, clockwise on screen.
    pub rotation: f32,

    pub tint: Rgb,
    pub visible: bool,
    pub texture: TextureHandle,
}

impl Thing {
    pub(crate) fn new(id: ThingId, desc: ThingDesc) -> Self {
        Self {
            id,
            position: desc.position,
            size: desc.size,
            origin: Vec2::ZERO,
            rotation: 0.0,
            tint: Rgb::WHITE,
            visible: true,
            texture: desc.texture,
        }
    }

    #[inline]
    pub fn id(&self) -> ThingId {
        self.id
    }

    #[inline]
    pub fn slot(&self) -> u32 {
        self.id.slot
    }

    /// Pushes the current state into the shared vertex buffer.
    #[inline]
    pub fn save(&self, stage: &mut Stage) {
        stage.save(self);
    }

    /// Axis-aligned hit test against the unrotated rectangle.
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.position.x
            && point.x < self.position.x + self.size.x
            && point.y >= self.position.y
            && point.y < self.position.y + self.size.y
    }

    /// Two triangles covering the entity rectangle.
    pub fn quad(&self) -> [SpriteVertex; QUAD_VERTICES as usize] {
        let uv = self.texture.uv();
        let (x1, y1) = (self.position.x, self.position.y);
        let (x2, y2) = (x1 + self.size.x, y1 + self.size.y);
        let pivot = (self.position + self.origin).to_array();

        let vertex = |x: f32, y: f32, u: f32, v: f32| SpriteVertex {
            position: [x, y],
            uv: [u, v],
            tint: self.tint.to_array(),
            origin: pivot,
            rotation: self.rotation,
        };

        [
            vertex(x1, y1, uv.x1, uv.y1),
            vertex(x1, y2, uv.x1, uv.y2),
            vertex(x2, y2, uv.x2, uv.y2),
            vertex(x1, y1, uv.x1, uv.y1),
            vertex(x2, y2, uv.x2, uv.y2),
            vertex(x2, y1, uv.x2, uv.y1),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::Region;

    fn thing(desc: ThingDesc) -> Thing {
        Thing::new(ThingId { slot: 0, generation: 0 }, desc)
    }

    #[test]
    fn defaults_match_a_plain_white_sprite() {
        let t = thing(ThingDesc::new(1.0, 2.0, 3.0, 4.0));
        assert!(t.visible);
        assert_eq!(t.tint, Rgb::WHITE);
        assert_eq!(t.origin, Vec2::ZERO);
        assert_eq!(t.rotation, 0.0);
    }

    #[test]
    fn quad_corners_follow_triangle_order() {
        let t = thing(ThingDesc::new(10.0, 20.0, 30.0, 40.0));
        let pos: Vec<[f32; 2]> = t.quad().iter().map(|v| v.position).collect();
        assert_eq!(
            pos,
            vec![
                [10.0, 20.0],
                [10.0, 60.0],
                [40.0, 60.0],
                [10.0, 20.0],
                [40.0, 60.0],
                [40.0, 20.0],
            ]
        );
    }

    #[test]
    fn quad_uses_texture_uv_and_state() {
        let tex = TextureHandle::new(Region::new(0, 0, 50, 25), 100, 100);
        let mut t = thing(ThingDesc::new(0.0, 0.0, 1.0, 1.0).with_texture(tex));
        t.tint = Rgb::new(0.5, 0.25, 1.0);
        t.origin = Vec2::new(3.0, 4.0);
        t.rotation = 1.5;

        let q = t.quad();
        assert_eq!(q[0].uv, [0.0, 0.0]);
        assert_eq!(q[2].uv, [0.5, 0.25]);
        assert_eq!(q[5].uv, [0.5, 0.0]);
        assert!(q.iter().all(|v| v.tint == [0.5, 0.25, 1.0]
            && v.origin == [3.0, 4.0]
            && v.rotation == 1.5));
    }

    #[test]
    fn pivot_is_resolved_against_position() {
        let mut t = thing(ThingDesc::new(100.0, 50.0, 8.0, 8.0));
        t.origin = Vec2::new(4.0, 4.0);
        assert!(t.quad().iter().all(|v| v.origin == [104.0, 54.0]));
    }

    #[test]
    fn flipped_texture_mirrors_quad_uv() {
        let tex = TextureHandle::new(Region::new(0, 0, 50, 50), 100, 100);
        let t = thing(ThingDesc::new(0.0, 0.0, 1.0, 1.0).with_texture(tex.flip_horizontally()));
        let q = t.quad();
        assert_eq!(q[0].uv, [0.5, 0.0]);
        assert_eq!(q[5].uv, [0.0, 0.0]);
    }

    #[test]
    fn contains_is_half_open() {
        let t = thing(ThingDesc::new(0.0, 0.0, 10.0, 10.0));
        assert!(t.contains(Vec2::new(0.0, 0.0)));
        assert!(t.contains(Vec2::new(9.9, 9.9)));
        assert!(!t.contains(Vec2::new(10.0, 5.0)));
    }
}
