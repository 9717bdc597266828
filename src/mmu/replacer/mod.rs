//! Victim selection policies (replacers).
//!
//! A [`Replacer`] tracks the ordering state a policy needs over the
//! resident pages and picks the page to evict when every frame is taken.
//! The engine in [`crate::mmu::Mmu`] owns the resident and dirty sets; the
//! replacer only decides *which* page goes.
//!
//! Implements:
//! - [`LruReplacer`] - Least Recently Used, logical-clock ordered
//! - [`RandomReplacer`] - Uniform random victim, seedable
//! - [`ClockReplacer`] - Second chance over a ring of reference bits

mod clock;
mod lru;
mod random;

use std::fmt;
use std::str::FromStr;

use crate::common::{Error, MmuConfig, PageNumber};

pub use clock::ClockReplacer;
pub use lru::LruReplacer;
pub use random::RandomReplacer;

/// Interface every eviction policy implements.
///
/// The engine calls exactly one of `record_access` (hit) or `insert`
/// (newly resident page) per access, and calls `evict` only when the
/// resident set is full.
pub trait Replacer {
    /// Build an empty replacer for an engine with this configuration.
    fn from_config(config: &MmuConfig) -> Self
    where
        Self: Sized;

    /// Which policy this replacer implements.
    fn policy(&self) -> Policy;

    /// Record a hit on a page that is already tracked.
    fn record_access(&mut self, page: PageNumber);

    /// Start tracking a page that just became resident.
    fn insert(&mut self, page: PageNumber);

    /// Select a victim, stop tracking it and return it.
    ///
    /// Returns `None` only when nothing is tracked.
    fn evict(&mut self) -> Option<PageNumber>;

    /// Whether `page` is currently tracked.
    fn contains(&self, page: PageNumber) -> bool;

    /// Number of tracked pages.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The available replacement policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Policy {
    Lru,
    Random,
    Clock,
}

impl Policy {
    /// Every policy, in reporting order.
    pub const ALL: [Policy; 3] = [Policy::Lru, Policy::Random, Policy::Clock];

    /// Short name used on the command line and in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Policy::Lru => "lru",
            Policy::Random => "rand",
            Policy::Clock => "clock",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Policy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(Policy::Lru),
            "rand" | "random" => Ok(Policy::Random),
            "clock" => Ok(Policy::Clock),
            _ => Err(Error::UnknownPolicy(s.to_string())),
        }
    }
}
