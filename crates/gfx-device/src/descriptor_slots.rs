use crate::gfx_error::DescriptorError;

/// Slot bookkeeping for one descriptor heap.
///
/// Slots are handed out by bumping `used_index`; released slots go on a
/// free-list and are reused last-in first-out before the bump pointer moves
/// again.
#[derive(Debug, Clone)]
pub struct DescriptorSlots {
    capacity: u32,
    used_index: u32,
    free_slots: Vec<u32>,
}

impl DescriptorSlots {
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            used_index: 0,
            free_slots: Vec::new(),
        }
    }

    /// Number of slots currently handed out.
    pub fn live_count(&self) -> u32 {
        self.used_index - self.free_slots.len() as u32
    }

    pub fn allocate(&mut self) -> Result<u32, DescriptorError> {
        if let Some(index) = self.free_slots.pop() {
            return Ok(index);
        }
        if self.used_index >= self.capacity {
            return Err(DescriptorError::HeapExhausted {
                capacity: self.capacity,
            });
        }
        let index = self.used_index;
        self.used_index += 1;
        Ok(index)
    }

    pub fn release(&mut self, index: u32) -> Result<(), DescriptorError> {
        if index >= self.used_index {
            return Err(DescriptorError::NotAllocated { index });
        }
        if self.free_slots.contains(&index) {
            return Err(DescriptorError::DoubleFree { index });
        }
        self.free_slots.push(index);
        Ok(())
    }
}

/// Byte offset of `index` from the heap start.
pub fn slot_offset(index: u32, increment: u32) -> usize {
    index as usize * increment as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bumps_until_capacity() {
        let mut slots = DescriptorSlots::new(3);
        assert_eq!(slots.allocate(), Ok(0));
        assert_eq!(slots.allocate(), Ok(1));
        assert_eq!(slots.allocate(), Ok(2));
        assert_eq!(
            slots.allocate(),
            Err(DescriptorError::HeapExhausted { capacity: 3 })
        );
        assert_eq!(slots.live_count(), 3);
    }

    #[test]
    fn freed_slots_are_reused_most_recent_first() {
        let mut slots = DescriptorSlots::new(8);
        for _ in 0..4 {
            slots.allocate().unwrap();
        }
        slots.release(1).unwrap();
        slots.release(3).unwrap();
        assert_eq!(slots.live_count(), 2);
        assert_eq!(slots.allocate(), Ok(3));
        assert_eq!(slots.allocate(), Ok(1));
        assert_eq!(slots.allocate(), Ok(4));
    }

    #[test]
    fn exhausted_heap_still_serves_freed_slots() {
        let mut slots = DescriptorSlots::new(2);
        slots.allocate().unwrap();
        slots.allocate().unwrap();
        slots.release(0).unwrap();
        assert_eq!(slots.allocate(), Ok(0));
        assert!(slots.allocate().is_err());
    }

    #[test]
    fn rejects_bad_releases() {
        let mut slots = DescriptorSlots::new(4);
        slots.allocate().unwrap();
        assert_eq!(
            slots.release(2),
            Err(DescriptorError::NotAllocated { index: 2 })
        );
        slots.release(0).unwrap();
        assert_eq!(slots.release(0), Err(DescriptorError::DoubleFree { index: 0 }));
    }

    #[test]
    fn offsets_scale_with_increment() {
        assert_eq!(slot_offset(0, 32), 0);
        assert_eq!(slot_offset(5, 32), 160);
    }
}
