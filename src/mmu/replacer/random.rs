//! Random replacement policy.
//!
//! Pages live in a dense vector so a victim is one uniform index draw.
//! Removal is `swap_remove` plus a fix-up of the moved page's slot.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use super::{Policy, Replacer};
use crate::common::{MmuConfig, PageNumber};

/// Uniform random eviction.
///
/// The victim sequence depends only on the seed and on the order of
/// `insert`/`evict` calls, so a seeded replay is fully reproducible.
#[derive(Debug)]
pub struct RandomReplacer {
    /// Tracked pages, in no meaningful order.
    pages: Vec<PageNumber>,

    /// Page -> index into `pages`.
    slots: HashMap<PageNumber, usize>,

    rng: StdRng,
}

impl RandomReplacer {
    /// Create a replacer with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Create a replacer seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            pages: Vec::new(),
            slots: HashMap::new(),
            rng,
        }
    }
}

impl Replacer for RandomReplacer {
    fn from_config(config: &MmuConfig) -> Self {
        match config.seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::from_entropy(),
        }
    }

    fn policy(&self) -> Policy {
        Policy::Random
    }

    /// Random replacement ignores recency.
    fn record_access(&mut self, _page: PageNumber) {}

    fn insert(&mut self, page: PageNumber) {
        if self.slots.contains_key(&page) {
            return;
        }
        self.slots.insert(page, self.pages.len());
        self.pages.push(page);
    }

    fn evict(&mut self) -> Option<PageNumber> {
        if self.pages.is_empty() {
            return None;
        }

        let index = self.rng.gen_range(0..self.pages.len());
        let victim = self.pages.swap_remove(index);
        self.slots.remove(&victim);

        // The former last page now sits where the victim was
        if let Some(&moved) = self.pages.get(index) {
            self.slots.insert(moved, index);
        }

        trace!(page = victim.0, index, "random victim");
        Some(victim)
    }

    fn contains(&self, page: PageNumber) -> bool {
        self.slots.contains_key(&page)
    }

    fn len(&self) -> usize {
        self.pages.len()
    }
}
