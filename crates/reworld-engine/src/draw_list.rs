use crate::thing::ThingId;

/// Render and dispatch order of live entities.
///
/// Entries are appended on creation. Removal leaves a tombstone in place so
/// that index-based iteration stays valid while hooks run; tombstones are
/// squeezed out by `compact` once per frame, after dispatch.
///
/// Invariant: a live id appears at most once.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    entries: Vec<Option<ThingId>>,
    tombstones: usize,
}

impl DrawList {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: ThingId) {
        debug_assert!(!self.entries.contains(&Some(id)), "{id:?} already listed");
        self.entries.push(Some(id));
    }

    /// Replaces `id`'s entry with a tombstone. Returns whether it was listed.
    pub fn tombstone(&mut self, id: ThingId) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| **e == Some(id)) else {
            return false;
        };
        *entry = None;
        self.tombstones += 1;
        true
    }

    /// Entry at `index`; `None` for a tombstone or past the end.
    #[inline]
    pub fn get(&self, index: usize) -> Option<ThingId> {
        self.entries.get(index).copied().flatten()
    }

    /// Length including tombstones.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Drops tombstones, keeping survivors in their relative order.
    pub fn compact(&mut self) {
        if self.tombstones == 0 {
            return;
        }
        self.entries.retain(Option::is_some);
        self.tombstones = 0;
    }

    /// Live ids in order, skipping tombstones.
    pub fn iter(&self) -> impl Iterator<Item = ThingId> + '_ {
        self.entries.iter().filter_map(|e| *e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(slot: u32) -> ThingId {
        ThingId { slot, generation: 0 }
    }

    fn list_of(slots: &[u32]) -> DrawList {
        let mut list = DrawList::new();
        for &s in slots {
            list.push(id(s));
        }
        list
    }

    #[test]
    fn tombstone_keeps_indices_stable_until_compact() {
        let mut list = list_of(&[0, 1, 2, 3]);
        assert!(list.tombstone(id(1)));
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(1), None);
        assert_eq!(list.get(2), Some(id(2)));
    }

    #[test]
    fn compact_preserves_survivor_order() {
        let mut list = list_of(&[4, 0, 7, 2, 9]);
        list.tombstone(id(0));
        list.tombstone(id(9));
        list.compact();
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![id(4), id(7), id(2)]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.tombstones(), 0);
    }

    #[test]
    fn tombstone_of_unknown_id_is_reported() {
        let mut list = list_of(&[0]);
        assert!(!list.tombstone(id(5)));
        assert!(!list.tombstone(ThingId { slot: 0, generation: 1 }));
        assert_eq!(list.tombstones(), 0);
    }

    #[test]
    fn reused_slot_goes_to_the_end() {
        let mut list = list_of(&[0, 1, 2]);
        list.tombstone(id(0));
        list.push(ThingId { slot: 0, generation: 1 });
        list.compact();
        let slots: Vec<u32> = list.iter().map(ThingId::slot).collect();
        assert_eq!(slots, vec![1, 2, 0]);
    }
}
