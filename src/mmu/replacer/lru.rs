//! LRU (Least Recently Used) replacement policy.
//!
//! Every access stamps the page with the next value of a logical clock.
//! A second index ordered by stamp makes the oldest page available without
//! scanning, so eviction is O(log n) and ties cannot happen.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use super::{Policy, Replacer};
use crate::common::{MmuConfig, PageNumber};

/// Least-recently-used eviction.
///
/// # Invariant
/// `last_access` and `by_age` always describe the same set of pages, and
/// `by_age[last_access[p]] == p` for every tracked page `p`.
#[derive(Debug, Default)]
pub struct LruReplacer {
    /// Logical clock, bumped once per recorded access.
    clock: u64,

    /// Page -> stamp of its most recent access.
    last_access: HashMap<PageNumber, u64>,

    /// Stamp -> page, oldest first.
    by_age: BTreeMap<u64, PageNumber>,
}

impl LruReplacer {
    /// Create an empty LRU replacer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp of the most recent access to `page`, if tracked.
    pub fn last_access(&self, page: PageNumber) -> Option<u64> {
        self.last_access.get(&page).copied()
    }

    /// The page that would be evicted next, without evicting it.
    pub fn peek_victim(&self) -> Option<PageNumber> {
        self.by_age.first_key_value().map(|(_, &page)| page)
    }

    fn touch(&mut self, page: PageNumber) {
        self.clock += 1;
        let stamp = self.clock;

        if let Some(previous) = self.last_access.insert(page, stamp) {
            self.by_age.remove(&previous);
        }
        self.by_age.insert(stamp, page);
    }
}

impl Replacer for LruReplacer {
    fn from_config(_config: &MmuConfig) -> Self {
        Self::new()
    }

    fn policy(&self) -> Policy {
        Policy::Lru
    }

    fn record_access(&mut self, page: PageNumber) {
        self.touch(page);
    }

    fn insert(&mut self, page: PageNumber) {
        self.touch(page);
    }

    fn evict(&mut self) -> Option<PageNumber> {
        let (stamp, victim) = self.by_age.pop_first()?;
        self.last_access.remove(&victim);
        trace!(page = victim.0, stamp, "lru victim");
        Some(victim)
    }

    fn contains(&self, page: PageNumber) -> bool {
        self.last_access.contains_key(&page)
    }

    fn len(&self) -> usize {
        self.last_access.len()
    }
}
