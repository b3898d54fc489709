//! Per-callable storage slot allocation.

/// Hands out slot indices for one callable.
///
/// Slots start at 0 (`this`), increase by one per allocation and are never
/// reused. Lowering keeps allocating from the same counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotAllocator {
    next: u32,
}

impl SlotAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> u32 {
        let slot = self.next;
        self.next += 1;
        slot
    }

    /// Number of slots allocated so far.
    pub fn count(&self) -> u32 {
        self.next
    }
}
