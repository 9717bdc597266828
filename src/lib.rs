//! memsim - A page replacement simulator with swappable MMU eviction policies.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             memsim                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │          Experiment Layer (experiment/)                  │   │
//! │  │     Sweep: policies × frame sizes on worker threads      │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               Trace Layer (trace/)                       │   │
//! │  │        TraceReader → replay → RunReport                  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │          MMU (mmu/)  [Runtime Swappable]                │   │
//! │  │   ┌─────────────────────────────────────────────────┐   │   │
//! │  │   │     Replacement Policies: LRU | RAND | CLOCK    │   │   │
//! │  │   └─────────────────────────────────────────────────┘   │   │
//! │  │     Mmu<R> + resident/dirty sets + MmuStats             │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageNumber, Error, config)
//! - [`mmu`] - The replacement engine and its policies
//! - [`trace`] - Trace parsing and replay
//! - [`experiment`] - Policy and frame-size sweeps, JSON results
//!
//! # Quick Start
//! ```
//! use memsim::{build_mmu, MemoryManagementUnit, MmuConfig, PageNumber, Policy};
//!
//! let mut mmu = build_mmu(Policy::Lru, MmuConfig::new(2)).unwrap();
//! mmu.read(PageNumber::new(1));
//! mmu.read(PageNumber::new(2));
//! mmu.read(PageNumber::new(1));
//! mmu.read(PageNumber::new(3)); // evicts page 2
//!
//! assert!(mmu.is_resident(PageNumber::new(1)));
//! assert!(!mmu.is_resident(PageNumber::new(2)));
//! assert_eq!(mmu.total_page_faults(), 3);
//! ```

pub mod common;
pub mod experiment;
pub mod mmu;
pub mod trace;

// Re-export commonly used items at crate root for convenience
pub use common::config::{PAGE_OFFSET, PAGE_SIZE};
pub use common::{Error, MmuConfig, PageNumber, Result};

pub use mmu::{
    build_mmu, AccessKind, AccessOutcome, ClockMmu, LruMmu, MemoryManagementUnit, Mmu, MmuStats,
    Policy, RandomMmu, Replacer,
};
