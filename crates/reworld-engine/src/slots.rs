use crate::error::{EngineError, Result};

/// Fixed-capacity allocator of entity slots.
///
/// A slot index addresses one quad in the shared vertex buffer. Allocation is
/// first-fit from index 0, so a given creation order always produces the same
/// buffer layout.
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    occupied: Vec<bool>,
    live: u32,
}

impl SlotAllocator {
    pub fn new(capacity: u32) -> Self {
        Self {
            occupied: vec![false; capacity as usize],
            live: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.occupied.len() as u32
    }

    /// Number of slots currently handed out.
    #[inline]
    pub fn live(&self) -> u32 {
        self.live
    }

    #[inline]
    pub fn is_occupied(&self, index: u32) -> bool {
        self.occupied.get(index as usize).copied().unwrap_or(false)
    }

    /// Claims the lowest free slot.
    pub fn acquire(&mut self) -> Result<u32> {
        let Some(index) = self.occupied.iter().position(|taken| !taken) else {
            log::error!("slot pool exhausted ({} slots)", self.capacity());
            return Err(EngineError::Exhausted {
                capacity: self.capacity(),
            });
        };

        self.occupied[index] = true;
        self.live += 1;
        Ok(index as u32)
    }

    /// Returns `index` to the pool.
    ///
    /// Fails for a free or out-of-range slot.
    pub fn release(&mut self, index: u32) -> Result<()> {
        match self.occupied.get_mut(index as usize) {
            Some(taken) if *taken => {
                *taken = false;
                self.live -= 1;
                Ok(())
            }
            _ => Err(EngineError::SlotNotAllocated { index }),
        }
    }
}
