//! Memory management unit simulation.
//!
//! The MMU keeps a bounded set of resident pages, chooses victims when the
//! frames run out and charges the disk traffic each access implies.
//!
//! # Components
//! - [`Mmu`] - The engine, generic over its replacement policy
//! - [`MemoryManagementUnit`] - The contract drivers program against
//! - [`AccessOutcome`] - How an access was resolved
//! - [`MmuStats`] - Fault and disk traffic counters
//! - [`replacer`] - Eviction policy implementations

mod access;
mod engine;
pub mod replacer;
mod stats;

pub use access::{AccessKind, AccessOutcome};
pub use engine::{build_mmu, ClockMmu, LruMmu, MemoryManagementUnit, Mmu, RandomMmu};
pub use replacer::{Policy, Replacer};
pub use stats::MmuStats;
