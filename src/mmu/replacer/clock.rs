//! CLOCK (Second Chance) replacement policy.
//!
//! Resident pages sit in a ring of slots, each with a reference bit. A hit
//! sets the bit. To evict, the hand sweeps the ring: a set bit is cleared
//! and the page survives the pass, the first clear bit names the victim.
//! The incoming page takes the victim's slot and the hand moves past it.

use std::collections::HashMap;

use tracing::trace;

use super::{Policy, Replacer};
use crate::common::{MmuConfig, PageNumber};

#[derive(Debug, Clone, Copy)]
struct ClockSlot {
    page: PageNumber,
    referenced: bool,
}

/// Second-chance eviction over a ring of reference bits.
#[derive(Debug, Default)]
pub struct ClockReplacer {
    /// Ring of slots; `None` marks a slot freed by `evict`.
    ring: Vec<Option<ClockSlot>>,

    /// Page -> index into `ring`.
    slots: HashMap<PageNumber, usize>,

    hand: usize,
}

impl ClockReplacer {
    /// Create an empty ring, reserving room for `capacity` slots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: Vec::with_capacity(capacity),
            slots: HashMap::with_capacity(capacity),
            hand: 0,
        }
    }

    /// Current position of the hand.
    pub fn hand(&self) -> usize {
        self.hand
    }

    /// Reference bit of `page`, if tracked.
    pub fn is_referenced(&self, page: PageNumber) -> Option<bool> {
        let &index = self.slots.get(&page)?;
        self.ring[index].map(|slot| slot.referenced)
    }

    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.ring.len();
    }

    /// A freed slot to reuse, preferring the one under the hand.
    fn vacant_slot(&self) -> Option<usize> {
        if matches!(self.ring.get(self.hand), Some(None)) {
            return Some(self.hand);
        }
        self.ring.iter().position(Option::is_none)
    }
}

impl Replacer for ClockReplacer {
    fn from_config(config: &MmuConfig) -> Self {
        Self::with_capacity(config.max_frames)
    }

    fn policy(&self) -> Policy {
        Policy::Clock
    }

    fn record_access(&mut self, page: PageNumber) {
        if let Some(&index) = self.slots.get(&page) {
            if let Some(slot) = self.ring[index].as_mut() {
                slot.referenced = true;
            }
        }
    }

    fn insert(&mut self, page: PageNumber) {
        if self.slots.contains_key(&page) {
            self.record_access(page);
            return;
        }

        let slot = Some(ClockSlot {
            page,
            referenced: true,
        });

        match self.vacant_slot() {
            Some(index) => {
                self.ring[index] = slot;
                self.slots.insert(page, index);
                self.hand = index;
                self.advance();
            }
            None => {
                self.slots.insert(page, self.ring.len());
                self.ring.push(slot);
            }
        }
    }

    fn evict(&mut self) -> Option<PageNumber> {
        if self.slots.is_empty() {
            return None;
        }

        // At least one slot is occupied, so this ends within two passes.
        loop {
            let index = self.hand;
            let Some(slot) = self.ring[index].as_mut() else {
                self.advance();
                continue;
            };

            if slot.referenced {
                slot.referenced = false;
                trace!(page = slot.page.0, index, "clock second chance");
                self.advance();
                continue;
            }

            let victim = slot.page;
            self.ring[index] = None;
            self.slots.remove(&victim);
            trace!(page = victim.0, index, "clock victim");
            return Some(victim);
        }
    }

    fn contains(&self, page: PageNumber) -> bool {
        self.slots.contains_key(&page)
    }

    fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(n: u32) -> PageNumber {
        PageNumber::new(n)
    }

    #[test]
    fn test_clock_full_sweep_evicts_at_start() {
        let mut replacer = ClockReplacer::with_capacity(3);
        replacer.insert(p(1));
        replacer.insert(p(2));
        replacer.insert(p(3));

        // Every bit is set, so one pass clears them all and the hand
        // comes back around to slot 0
        assert_eq!(replacer.evict(), Some(p(1)));
        assert_eq!(replacer.is_referenced(p(2)), Some(false));
        assert_eq!(replacer.is_referenced(p(3)), Some(false));
    }

    #[test]
    fn test_clock_second_chance() {
        let mut replacer = ClockReplacer::with_capacity(3);
        replacer.insert(p(1));
        replacer.insert(p(2));
        replacer.insert(p(3));
        assert_eq!(replacer.evict(), Some(p(1)));

        // 4 takes slot 0, hand moves to slot 1
        replacer.insert(p(4));
        assert_eq!(replacer.hand(), 1);

        // 2 is referenced again, so 3 goes first
        replacer.record_access(p(2));
        assert_eq!(replacer.evict(), Some(p(3)));
        assert_eq!(replacer.is_referenced(p(2)), Some(false));
    }

    #[test]
    fn test_clock_reuses_freed_slot() {
        let mut replacer = ClockReplacer::with_capacity(2);
        replacer.insert(p(1));
        replacer.insert(p(2));

        let victim = replacer.evict().unwrap();
        replacer.insert(p(3));

        assert_eq!(replacer.ring.len(), 2);
        assert_eq!(replacer.len(), 2);
        assert!(!replacer.contains(victim));
        assert!(replacer.contains(p(3)));
    }

    #[test]
    fn test_clock_evict_until_empty() {
        let mut replacer = ClockReplacer::with_capacity(4);
        for n in 0..4 {
            replacer.insert(p(n));
        }
        for _ in 0..4 {
            assert!(replacer.evict().is_some());
        }
        assert_eq!(replacer.evict(), None);
        assert!(replacer.is_empty());
    }
}
