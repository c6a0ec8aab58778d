//! The shared world every hook receives.
//!
//! `Stage` owns the slot pool, the CPU shadows of the vertex buffer and the
//! atlas, the live entities with their behaviours, the draw list, the named
//! texture cache, latched input and the view offset. There is no global
//! state: the engine passes `&mut Stage` into each hook.
//!
//! While an entity's hook runs, its entry is checked out of the arena so the
//! hook can borrow both the entity and the stage mutably. Removing that same
//! entity from inside its own hook is allowed; the entry is dropped when the
//! hook returns.

use std::collections::HashMap;
use std::path::Path;

use crate::atlas::{AtlasImage, AtlasPacker, BYTES_PER_TEXEL};
use crate::config::EngineConfig;
use crate::coords::{Rgb, Vec2, Viewport};
use crate::draw_list::DrawList;
use crate::error::{EngineError, Result};
use crate::input::{Action, InputState, Key, MouseButton};
use crate::slots::SlotAllocator;
use crate::texture::{DecodedImage, TextureHandle};
use crate::thing::{Thing, ThingDesc, ThingId};
use crate::vertex_buffer::VertexBuffer;

/// Per-entity hooks. All default to no-ops.
///
/// `thing` is the entity the behaviour is attached to. Changes to it reach
/// the renderer only after `thing.save(stage)`.
pub trait Behavior {
    fn update(&mut self, thing: &mut Thing, stage: &mut Stage) {
        let _ = (thing, stage);
    }

    fn key(&mut self, thing: &mut Thing, stage: &mut Stage, key: Key, action: Action) {
        let _ = (thing, stage, key, action);
    }

    /// Cursor moved; `position` is in view space.
    fn mouse(&mut self, thing: &mut Thing, stage: &mut Stage, position: Vec2) {
        let _ = (thing, stage, position);
    }

    fn click(&mut self, thing: &mut Thing, stage: &mut Stage, button: MouseButton, action: Action) {
        let _ = (thing, stage, button, action);
    }
}

/// Static entity with no hooks.
impl Behavior for () {}

struct Entry {
    thing: Thing,
    behavior: Box<dyn Behavior>,
}

#[derive(Debug, Copy, Clone)]
struct CheckedOut {
    id: ThingId,
    removed: bool,
}

pub struct Stage {
    slots: SlotAllocator,
    generations: Vec<u32>,
    /// Indexed by slot. `None` for free slots and for the checked-out entry.
    entries: Vec<Option<Entry>>,
    checked_out: Option<CheckedOut>,
    draw_list: DrawList,

    vertices: VertexBuffer,
    packer: AtlasPacker,
    atlas: AtlasImage,
    textures: HashMap<String, TextureHandle>,

    input: InputState,
    viewport: Viewport,
    background: Rgb,
}

impl Stage {
    pub fn new(config: &EngineConfig) -> Self {
        let capacity = config.max_things;
        Self {
            slots: SlotAllocator::new(capacity),
            generations: vec![0; capacity as usize],
            entries: (0..capacity).map(|_| None).collect(),
            checked_out: None,
            draw_list: DrawList::new(),

            vertices: VertexBuffer::new(capacity),
            packer: AtlasPacker::new(config.atlas_width, config.atlas_height),
            atlas: AtlasImage::new(config.atlas_width, config.atlas_height),
            textures: HashMap::new(),

            input: InputState::new(),
            viewport: Viewport::new(config.window_width as f32, config.window_height as f32),
            background: config.background,
        }
    }

    // ── entities ──────────────────────────────────────────────────────────

    /// Creates an entity in the lowest free slot and writes its quad once.
    ///
    /// The entity joins the end of the draw list; if this happens during the
    /// update pass it is updated later in that same pass.
    pub fn spawn(&mut self, desc: ThingDesc, behavior: impl Behavior + 'static) -> Result<ThingId> {
        let slot = self.slots.acquire()?;
        let id = ThingId {
            slot,
            generation: self.generations[slot as usize],
        };

        let thing = Thing::new(id, desc);
        self.vertices.write_quad(slot, &thing.quad());
        self.entries[slot as usize] = Some(Entry {
            thing,
            behavior: Box::new(behavior),
        });
        self.draw_list.push(id);

        log::debug!("spawned thing in slot {slot} (generation {})", id.generation);
        Ok(id)
    }

    /// Creates an entity without hooks.
    #[inline]
    pub fn spawn_static(&mut self, desc: ThingDesc) -> Result<ThingId> {
        self.spawn(desc, ())
    }

    /// Destroys an entity: frees its slot and tombstones its draw-list entry.
    ///
    /// The slot's vertex data is left as is; nothing draws it until the slot
    /// is reused and rewritten.
    pub fn remove(&mut self, id: ThingId) -> Result<()> {
        if !self.is_live(id) {
            return Err(EngineError::ThingNotLive {
                slot: id.slot,
                generation: id.generation,
            });
        }

        self.slots.release(id.slot)?;
        let generation = &mut self.generations[id.slot as usize];
        *generation = generation.wrapping_add(1);
        self.draw_list.tombstone(id);

        match &mut self.checked_out {
            Some(out) if out.id == id => out.removed = true,
            _ => {
                self.entries[id.slot as usize] = None;
            }
        }

        log::debug!("removed thing in slot {}", id.slot);
        Ok(())
    }

    #[inline]
    pub fn is_live(&self, id: ThingId) -> bool {
        self.slots.is_occupied(id.slot)
            && self.generations.get(id.slot as usize) == Some(&id.generation)
    }

    /// Number of live entities.
    #[inline]
    pub fn thing_count(&self) -> u32 {
        self.slots.live()
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.slots.capacity()
    }

    /// Looks up a live entity.
    ///
    /// Returns `None` for stale ids and for the entity whose hook is currently
    /// running (it is reachable through the hook's `thing` argument instead).
    pub fn thing(&self, id: ThingId) -> Option<&Thing> {
        if !self.is_live(id) {
            return None;
        }
        self.entries[id.slot as usize].as_ref().map(|e| &e.thing)
    }

    /// Mutable lookup. `None` in the same cases as [`Stage::thing`].
    pub fn thing_mut(&mut self, id: ThingId) -> Option<&mut Thing> {
        if !self.is_live(id) {
            return None;
        }
        self.entries[id.slot as usize].as_mut().map(|e| &mut e.thing)
    }

    /// Mutates an entity and saves it.
    ///
    /// Fails with `ThingInUse` for the entity whose hook is running; mutate
    /// the hook's `thing` and call `save` instead.
    pub fn update_thing(&mut self, id: ThingId, f: impl FnOnce(&mut Thing)) -> Result<()> {
        if !self.is_live(id) {
            return Err(EngineError::ThingNotLive {
                slot: id.slot,
                generation: id.generation,
            });
        }
        let Some(entry) = self.entries[id.slot as usize].as_mut() else {
            return Err(EngineError::ThingInUse { slot: id.slot });
        };
        f(&mut entry.thing);
        let quad = entry.thing.quad();
        self.vertices.write_quad(id.slot, &quad);
        Ok(())
    }

    /// Stores `thing` as the entity's state and writes its quad at its slot.
    ///
    /// A removed entity is ignored: its slot may already belong to another.
    /// While the entity's hook runs, the hook's `thing` is checked back in
    /// afterwards and stays authoritative.
    pub fn save(&mut self, thing: &Thing) {
        if !self.is_live(thing.id()) {
            log::warn!("ignoring save of removed thing in slot {}", thing.slot());
            return;
        }
        if let Some(entry) = self.entries[thing.slot() as usize].as_mut() {
            entry.thing.clone_from(thing);
        }
        self.vertices.write_quad(thing.slot(), &thing.quad());
    }

    /// Live ids in draw order.
    pub fn things(&self) -> impl Iterator<Item = ThingId> + '_ {
        self.draw_list.iter()
    }

    /// Runs `f` for every live entity in draw-list order.
    ///
    /// The draw-list length is re-read every step, so entities spawned by a
    /// hook are visited in the same pass. Entities removed before their turn
    /// are skipped.
    pub(crate) fn dispatch<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut dyn Behavior, &mut Thing, &mut Stage),
    {
        let mut index = 0;
        while index < self.draw_list.len() {
            if let Some(id) = self.draw_list.get(index) {
                if let Some(mut entry) = self.check_out(id) {
                    f(&mut *entry.behavior, &mut entry.thing, self);
                    self.check_in(entry);
                }
            }
            index += 1;
        }
    }

    fn check_out(&mut self, id: ThingId) -> Option<Entry> {
        debug_assert!(self.checked_out.is_none(), "nested dispatch");
        let entry = self.entries[id.slot as usize].take()?;
        self.checked_out = Some(CheckedOut { id, removed: false });
        Some(entry)
    }

    fn check_in(&mut self, entry: Entry) {
        match self.checked_out.take() {
            Some(out) if out.removed => {}
            _ => {
                let slot = entry.thing.slot() as usize;
                self.entries[slot] = Some(entry);
            }
        }
    }

    #[inline]
    pub(crate) fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub(crate) fn compact(&mut self) {
        self.draw_list.compact();
    }

    // ── textures ──────────────────────────────────────────────────────────

    /// Reserves a `width × height` atlas region. Its pixels start transparent.
    pub fn create_texture(&mut self, width: u32, height: u32) -> Result<TextureHandle> {
        let region = self.packer.allocate(width, height)?;
        Ok(TextureHandle::new(region, self.packer.width(), self.packer.height()))
    }

    /// Reserves a region and fills it with tightly packed RGBA8 `pixels`.
    pub fn create_texture_with_pixels(
        &mut self,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureHandle> {
        let expected = width as usize * height as usize * BYTES_PER_TEXEL;
        if pixels.len() != expected {
            return Err(EngineError::PixelSizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let texture = self.create_texture(width, height)?;
        self.modify_texture(&texture, pixels)?;
        Ok(texture)
    }

    pub fn create_texture_from_image(&mut self, image: &DecodedImage) -> Result<TextureHandle> {
        self.create_texture_with_pixels(image.width, image.height, &image.pixels)
    }

    /// Overwrites the pixels of `texture`'s region.
    pub fn modify_texture(&mut self, texture: &TextureHandle, pixels: &[u8]) -> Result<()> {
        self.atlas.write(texture.region(), pixels)
    }

    /// Returns the texture cached under `name`, running `loader` on first use.
    ///
    /// A failed load is not cached.
    pub fn load_texture<F>(&mut self, name: &str, loader: F) -> Result<TextureHandle>
    where
        F: FnOnce(&mut Stage) -> Result<TextureHandle>,
    {
        if let Some(texture) = self.textures.get(name) {
            return Ok(*texture);
        }

        let texture = loader(self)?;
        log::debug!("texture '{name}' cached ({}x{})", texture.width(), texture.height());
        self.textures.insert(name.to_string(), texture);
        Ok(texture)
    }

    /// Decodes an image file into the atlas, cached under its path.
    pub fn load_texture_file(&mut self, path: impl AsRef<Path>) -> Result<TextureHandle> {
        let path = path.as_ref();
        let name = path.display().to_string();
        self.load_texture(&name, |stage| {
            let image = DecodedImage::open(path)?;
            stage.create_texture_from_image(&image)
        })
    }

    #[inline]
    pub fn cached_texture(&self, name: &str) -> Option<TextureHandle> {
        self.textures.get(name).copied()
    }

    // ── input ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn is_key_down(&self, key: Key) -> bool {
        self.input.key_down(key)
    }

    #[inline]
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.input.button_down(button)
    }

    /// Cursor in view space: window position minus the current view offset.
    #[inline]
    pub fn cursor_position(&self) -> Vec2 {
        self.viewport.to_view(self.input.cursor())
    }

    /// Marks every key and button as up.
    pub fn clear_input_latches(&mut self) {
        self.input.clear_latches();
    }

    #[inline]
    pub(crate) fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    // ── view ──────────────────────────────────────────────────────────────

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn view_offset(&self) -> Vec2 {
        self.viewport.offset
    }

    /// Shifts the whole scene on screen. Takes effect on the next frame.
    #[inline]
    pub fn set_view_offset(&mut self, offset: Vec2) {
        self.viewport.offset = offset;
    }

    #[inline]
    pub fn background(&self) -> Rgb {
        self.background
    }

    #[inline]
    pub fn set_background(&mut self, background: Rgb) {
        self.background = background;
    }

    // ── GPU shadows ───────────────────────────────────────────────────────

    #[inline]
    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertices
    }

    #[inline]
    pub fn atlas(&self) -> &AtlasImage {
        &self.atlas
    }

    #[inline]
    pub(crate) fn vertex_buffer_mut(&mut self) -> &mut VertexBuffer {
        &mut self.vertices
    }

    #[inline]
    pub(crate) fn atlas_mut(&mut self) -> &mut AtlasImage {
        &mut self.atlas
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::Region;

    fn stage_with(max_things: u32) -> Stage {
        Stage::new(&EngineConfig::default().with_max_things(max_things))
    }

    fn unit() -> ThingDesc {
        ThingDesc::new(0.0, 0.0, 1.0, 1.0)
    }

    // ── entities ──────────────────────────────────────────────────────────

    #[test]
    fn spawn_uses_sequential_slots() {
        let mut stage = stage_with(8);
        let slots: Vec<u32> = (0..3).map(|_| stage.spawn_static(unit()).unwrap().slot()).collect();
        assert_eq!(slots, vec![0, 1, 2]);
        assert_eq!(stage.thing_count(), 3);
    }

    #[test]
    fn spawn_writes_its_quad_exactly_once() {
        let mut stage = stage_with(8);
        let id = stage.spawn_static(ThingDesc::new(5.0, 6.0, 2.0, 2.0)).unwrap();
        assert_eq!(stage.vertex_buffer().writes(), 1);
        assert!(stage.vertex_buffer().is_dirty(id.slot()));
        assert_eq!(stage.vertex_buffer().quad(id.slot())[0].position, [5.0, 6.0]);
    }

    #[test]
    fn removed_slot_is_reused_first() {
        let mut stage = stage_with(8);
        let ids: Vec<_> = (0..3).map(|_| stage.spawn_static(unit()).unwrap()).collect();
        stage.remove(ids[1]).unwrap();

        let reused = stage.spawn_static(unit()).unwrap();
        assert_eq!(reused.slot(), 1);
        assert_ne!(reused, ids[1]);
        assert!(!stage.is_live(ids[1]));
        assert!(stage.thing(ids[1]).is_none());
    }

    #[test]
    fn exhausted_pool_is_reported() {
        let mut stage = stage_with(2);
        stage.spawn_static(unit()).unwrap();
        stage.spawn_static(unit()).unwrap();
        assert!(matches!(
            stage.spawn_static(unit()),
            Err(EngineError::Exhausted { capacity: 2 })
        ));
    }

    #[test]
    fn double_remove_is_an_error() {
        let mut stage = stage_with(4);
        let id = stage.spawn_static(unit()).unwrap();
        stage.remove(id).unwrap();
        assert!(matches!(stage.remove(id), Err(EngineError::ThingNotLive { slot: 0, .. })));
        assert_eq!(stage.thing_count(), 0);
    }

    #[test]
    fn save_rewrites_the_slot() {
        let mut stage = stage_with(4);
        let id = stage.spawn_static(unit()).unwrap();
        stage.vertex_buffer_mut().take_dirty();

        let mut thing = stage.thing(id).unwrap().clone();
        thing.position = Vec2::new(40.0, 30.0);
        thing.save(&mut stage);

        assert_eq!(stage.vertex_buffer().writes(), 2);
        assert_eq!(stage.vertex_buffer().quad(0)[0].position, [40.0, 30.0]);
        assert_eq!(stage.thing(id).unwrap().position, Vec2::new(40.0, 30.0));
        assert!(stage.vertex_buffer().is_dirty(0));
    }

    #[test]
    fn saved_copy_survives_later_updates() {
        let mut stage = stage_with(4);
        let id = stage.spawn_static(unit()).unwrap();

        let mut copy = stage.thing(id).unwrap().clone();
        copy.position = Vec2::new(40.0, 30.0);
        copy.save(&mut stage);
        stage.update_thing(id, |t| t.rotation = 1.0).unwrap();

        let quad = stage.vertex_buffer().quad(0);
        assert_eq!(quad[0].position, [40.0, 30.0]);
        assert_eq!(quad[0].rotation, 1.0);
        assert_eq!(stage.thing(id).unwrap().position, Vec2::new(40.0, 30.0));
    }

    #[test]
    fn save_of_removed_thing_is_ignored() {
        let mut stage = stage_with(4);
        let id = stage.spawn_static(unit()).unwrap();
        let stale = stage.thing(id).unwrap().clone();
        stage.remove(id).unwrap();

        stale.save(&mut stage);
        assert_eq!(stage.vertex_buffer().writes(), 1);
    }

    #[test]
    fn update_thing_mutates_and_saves() {
        let mut stage = stage_with(4);
        let id = stage.spawn_static(unit()).unwrap();
        stage.update_thing(id, |t| t.rotation = 2.0).unwrap();
        assert_eq!(stage.thing(id).unwrap().rotation, 2.0);
        assert_eq!(stage.vertex_buffer().quad(0)[3].rotation, 2.0);
        assert_eq!(stage.vertex_buffer().writes(), 2);
    }

    struct SelfDestruct;

    impl Behavior for SelfDestruct {
        fn update(&mut self, thing: &mut Thing, stage: &mut Stage) {
            stage.remove(thing.id()).unwrap();
            // Slot is free again; a spawn here must not be clobbered on check-in.
            stage.spawn_static(ThingDesc::new(9.0, 9.0, 1.0, 1.0)).unwrap();
        }
    }

    /// Tries to reach its own entity through the stage, then saves a move.
    struct Mover;

    impl Behavior for Mover {
        fn update(&mut self, thing: &mut Thing, stage: &mut Stage) {
            assert!(matches!(
                stage.update_thing(thing.id(), |t| t.rotation = 3.0),
                Err(EngineError::ThingInUse { slot: 0 })
            ));
            assert!(stage.thing_mut(thing.id()).is_none());
            thing.position = Vec2::new(7.0, 8.0);
            thing.save(stage);
        }
    }

    #[test]
    fn running_hook_holds_its_entity() {
        let mut stage = stage_with(4);
        let id = stage.spawn(unit(), Mover).unwrap();

        stage.dispatch(|behavior, thing, stage| behavior.update(thing, stage));

        let thing = stage.thing(id).unwrap();
        assert_eq!(thing.position, Vec2::new(7.0, 8.0));
        assert_eq!(thing.rotation, 0.0);
        assert_eq!(stage.vertex_buffer().quad(0)[0].position, [7.0, 8.0]);
    }

    #[test]
    fn hook_may_remove_its_own_entity() {
        let mut stage = stage_with(4);
        let id = stage.spawn(unit(), SelfDestruct).unwrap();

        stage.dispatch(|behavior, thing, stage| behavior.update(thing, stage));

        assert!(!stage.is_live(id));
        let successor = stage.things().next().unwrap();
        assert_eq!(successor.slot(), 0);
        assert_eq!(stage.thing(successor).unwrap().position, Vec2::new(9.0, 9.0));
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn texture_regions_follow_packer() {
        let mut stage = Stage::new(&EngineConfig::default().with_atlas_size(30, 30));
        let a = stage.create_texture(10, 10).unwrap();
        let b = stage.create_texture(20, 5).unwrap();
        assert_eq!(a.region(), Region::new(0, 0, 10, 10));
        assert_eq!(b.region(), Region::new(0, 10, 20, 5));
    }

    #[test]
    fn pixels_land_in_the_atlas() {
        let mut stage = stage_with(1);
        let pixels: Vec<u8> = [9, 8, 7, 255].repeat(4);
        let tex = stage.create_texture_with_pixels(2, 2, &pixels).unwrap();
        let r = tex.region();
        assert_eq!(stage.atlas().texel(r.x + 1, r.y + 1), [9, 8, 7, 255]);
        assert!(stage.atlas().has_dirty());
    }

    #[test]
    fn bad_pixel_length_allocates_nothing() {
        let mut stage = stage_with(1);
        assert!(matches!(
            stage.create_texture_with_pixels(2, 2, &[0; 3]),
            Err(EngineError::PixelSizeMismatch { expected: 16, actual: 3 })
        ));
        let t = stage.create_texture(1, 1).unwrap();
        assert_eq!((t.region().x, t.region().y), (0, 0));
    }

    #[test]
    fn foreign_handle_cannot_write_past_the_atlas() {
        let mut big = Stage::new(&EngineConfig::default().with_atlas_size(16, 16));
        let mut small = Stage::new(&EngineConfig::default().with_atlas_size(8, 8));
        let wide = big.create_texture(16, 1).unwrap();

        assert!(matches!(
            small.modify_texture(&wide, &[200; 64]),
            Err(EngineError::RegionOutOfAtlas { .. })
        ));
        assert_eq!(small.atlas().texel(0, 1), [0, 0, 0, 0]);
        assert!(!small.atlas().has_dirty());
    }

    #[test]
    fn load_texture_is_memoized_by_name() {
        let mut stage = stage_with(1);
        let first = stage.load_texture("player", |s| s.create_texture(4, 4)).unwrap();
        let second = stage
            .load_texture("player", |_| panic!("loader must not run for a cached name"))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(stage.cached_texture("player"), Some(first));
    }

    #[test]
    fn failed_load_is_not_cached() {
        let mut stage = stage_with(1);
        assert!(stage.load_texture_file("/nonexistent/sprite.png").is_err());
        assert!(stage.cached_texture("/nonexistent/sprite.png").is_none());
    }

    // ── view ──────────────────────────────────────────────────────────────

    #[test]
    fn cursor_tracks_current_offset() {
        let mut stage = stage_with(1);
        stage.input_mut().set_cursor(Vec2::new(30.0, 40.0));
        assert_eq!(stage.cursor_position(), Vec2::new(30.0, 40.0));
        stage.set_view_offset(Vec2::new(10.0, -5.0));
        assert_eq!(stage.cursor_position(), Vec2::new(20.0, 45.0));
    }
}
