use std::collections::BTreeSet;

use bytemuck::{Pod, Zeroable};

/// Vertices per entity quad (two triangles, no index buffer).
pub const QUAD_VERTICES: u32 = 6;

/// Bytes occupied by one quad in the shared vertex buffer.
pub const QUAD_BYTES: u64 = QUAD_VERTICES as u64 * std::mem::size_of::<SpriteVertex>() as u64;

/// One vertex of an entity quad. Ten floats, 40 bytes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub tint: [f32; 3],
    /// Rotation pivot in absolute pixels (`Thing::position + Thing::origin`).
    /// The shader rotates `position` about this point, so it must be in the
    /// same space as `position`, not relative to the entity.
    pub origin: [f32; 2],
    pub rotation: f32,
}

/// CPU copy of the shared vertex buffer.
///
/// Sized for `capacity` quads up front and never reallocated. Slot `i` owns
/// vertices `i * 6 .. i * 6 + 6`, i.e. bytes starting at `i * QUAD_BYTES`.
/// Slots written since the last `take_dirty` still need uploading.
#[derive(Debug, Clone)]
pub struct VertexBuffer {
    vertices: Vec<SpriteVertex>,
    dirty: BTreeSet<u32>,
    writes: u64,
}

impl VertexBuffer {
    pub fn new(capacity: u32) -> Self {
        Self {
            vertices: vec![SpriteVertex::zeroed(); (capacity * QUAD_VERTICES) as usize],
            dirty: BTreeSet::new(),
            writes: 0,
        }
    }

    /// Capacity in quads.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.vertices.len() as u32 / QUAD_VERTICES
    }

    #[inline]
    pub fn byte_size(&self) -> u64 {
        u64::from(self.capacity()) * QUAD_BYTES
    }

    #[inline]
    pub fn byte_offset(slot: u32) -> u64 {
        u64::from(slot) * QUAD_BYTES
    }

    pub fn write_quad(&mut self, slot: u32, quad: &[SpriteVertex; QUAD_VERTICES as usize]) {
        let start = (slot * QUAD_VERTICES) as usize;
        self.vertices[start..start + quad.len()].copy_from_slice(quad);
        self.dirty.insert(slot);
        self.writes += 1;
    }

    pub fn quad(&self, slot: u32) -> &[SpriteVertex] {
        self.quads(slot, 1)
    }

    /// Vertices of `count` consecutive slots starting at `first`.
    pub fn quads(&self, first: u32, count: u32) -> &[SpriteVertex] {
        let start = (first * QUAD_VERTICES) as usize;
        &self.vertices[start..start + (count * QUAD_VERTICES) as usize]
    }

    /// The whole buffer, slot 0 first.
    #[inline]
    pub fn vertices(&self) -> &[SpriteVertex] {
        &self.vertices
    }

    /// Number of quad writes since creation.
    #[inline]
    pub fn writes(&self) -> u64 {
        self.writes
    }

    #[inline]
    pub fn is_dirty(&self, slot: u32) -> bool {
        self.dirty.contains(&slot)
    }

    /// Dirty slots in ascending order; clears the set.
    pub fn take_dirty(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_of(v: f32) -> [SpriteVertex; 6] {
        [SpriteVertex {
            rotation: v,
            ..SpriteVertex::default()
        }; 6]
    }

    #[test]
    fn vertex_is_ten_floats() {
        assert_eq!(std::mem::size_of::<SpriteVertex>(), 40);
        assert_eq!(QUAD_BYTES, 240);
        assert_eq!(VertexBuffer::byte_offset(3), 720);
    }

    #[test]
    fn write_goes_to_slot_range() {
        let mut vb = VertexBuffer::new(4);
        vb.write_quad(2, &quad_of(7.0));
        assert!(vb.quad(2).iter().all(|v| v.rotation == 7.0));
        assert!(vb.quad(1).iter().all(|v| v.rotation == 0.0));
        assert!(vb.quad(3).iter().all(|v| v.rotation == 0.0));
        assert_eq!(vb.writes(), 1);
    }

    #[test]
    fn dirty_slots_are_sorted_and_deduplicated() {
        let mut vb = VertexBuffer::new(8);
        vb.write_quad(5, &quad_of(1.0));
        vb.write_quad(1, &quad_of(1.0));
        vb.write_quad(5, &quad_of(2.0));
        assert_eq!(vb.take_dirty(), vec![1, 5]);
        assert!(vb.take_dirty().is_empty());
        assert_eq!(vb.writes(), 3);
    }

    #[test]
    fn byte_size_matches_capacity() {
        assert_eq!(VertexBuffer::new(500).byte_size(), 500 * 240);
    }
}
