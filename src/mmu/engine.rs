//! MMU engine - the page replacement core.
//!
//! The [`Mmu`] provides:
//! - A bounded resident set of logical pages
//! - Dirty page tracking with write-back on eviction
//! - Fault and disk traffic accounting
//! - Pluggable eviction policies via [`Replacer`]

use std::collections::HashSet;

use tracing::debug;

use super::access::{AccessKind, AccessOutcome};
use super::replacer::{ClockReplacer, LruReplacer, Policy, RandomReplacer, Replacer};
use super::MmuStats;
use crate::common::{MmuConfig, PageNumber, Result};

/// The contract every MMU exposes to a trace driver.
///
/// Object safe, so drivers can pick a policy at runtime and hold a
/// `Box<dyn MemoryManagementUnit>` (see [`build_mmu`]).
pub trait MemoryManagementUnit {
    /// Read from `page`, fetching it from disk on a miss.
    fn read(&mut self, page: PageNumber) -> AccessOutcome;

    /// Write to `page`, leaving it dirty.
    fn write(&mut self, page: PageNumber) -> AccessOutcome;

    fn debug_on(&mut self);

    fn debug_off(&mut self);

    fn is_debug(&self) -> bool;

    fn total_disk_reads(&self) -> u64;

    fn total_disk_writes(&self) -> u64;

    fn total_page_faults(&self) -> u64;

    /// Snapshot of every counter.
    fn stats(&self) -> MmuStats;

    fn policy(&self) -> Policy;

    fn max_frames(&self) -> usize;

    /// Number of pages currently holding a frame.
    fn resident_count(&self) -> usize;

    fn is_resident(&self, page: PageNumber) -> bool;

    fn is_dirty(&self, page: PageNumber) -> bool;
}

/// An MMU with a fixed number of frames and a replacement policy `R`.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────┐
/// │                          Mmu<R>                          │
/// │  ┌──────────────┐  ┌──────────────┐  ┌───────────────┐   │
/// │  │   resident   │  │    dirty     │  │   replacer    │   │
/// │  │HashSet<Page> │⊇ │HashSet<Page> │  │ LRU|Rand|Clock│   │
/// │  └──────────────┘  └──────────────┘  └───────────────┘   │
/// │  ┌──────────────────────────────────────────────────┐    │
/// │  │ stats: faults / disk reads / disk writes / ...   │    │
/// │  └──────────────────────────────────────────────────┘    │
/// └──────────────────────────────────────────────────────────┘
/// ```
///
/// # Invariants
/// - `resident.len() <= max_frames`
/// - `dirty ⊆ resident`
/// - the replacer tracks exactly the resident pages
///
/// # Usage
/// ```
/// use memsim::{LruMmu, MemoryManagementUnit, PageNumber};
///
/// let mut mmu = LruMmu::new(1);
/// mmu.write(PageNumber::new(1));
/// mmu.read(PageNumber::new(2)); // evicts dirty page 1
///
/// assert_eq!(mmu.total_page_faults(), 2);
/// assert_eq!(mmu.total_disk_reads(), 1);
/// assert_eq!(mmu.total_disk_writes(), 1);
/// ```
#[derive(Debug)]
pub struct Mmu<R: Replacer> {
    /// Pages currently holding a frame.
    resident: HashSet<PageNumber>,

    /// Resident pages written since they were loaded.
    dirty: HashSet<PageNumber>,

    /// Victim selection policy.
    replacer: R,

    stats: MmuStats,

    /// Number of frames (immutable after construction).
    max_frames: usize,

    debug: bool,
}

/// LRU engine.
pub type LruMmu = Mmu<LruReplacer>;

/// Random replacement engine.
pub type RandomMmu = Mmu<RandomReplacer>;

/// CLOCK engine.
pub type ClockMmu = Mmu<ClockReplacer>;

impl<R: Replacer> Mmu<R> {
    /// Create an MMU with `max_frames` frames and default settings.
    ///
    /// # Panics
    /// Panics if `max_frames` is 0.
    pub fn new(max_frames: usize) -> Self {
        assert!(max_frames > 0, "max_frames must be > 0");
        Self::build(MmuConfig::new(max_frames))
    }

    /// Create an MMU from a full configuration.
    ///
    /// # Errors
    /// - `Error::InvalidFrameCount` if `config.max_frames` is 0
    pub fn with_config(config: MmuConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: MmuConfig) -> Self {
        Self {
            resident: HashSet::with_capacity(config.max_frames),
            dirty: HashSet::new(),
            replacer: R::from_config(&config),
            stats: MmuStats::default(),
            max_frames: config.max_frames,
            debug: config.debug,
        }
    }

    /// Resident pages in ascending order.
    pub fn resident_pages(&self) -> Vec<PageNumber> {
        let mut pages: Vec<_> = self.resident.iter().copied().collect();
        pages.sort_unstable();
        pages
    }

    /// Dirty pages in ascending order.
    pub fn dirty_pages(&self) -> Vec<PageNumber> {
        let mut pages: Vec<_> = self.dirty.iter().copied().collect();
        pages.sort_unstable();
        pages
    }

    /// Borrow the replacer, e.g. to inspect policy state.
    pub fn replacer(&self) -> &R {
        &self.replacer
    }

    /// Panic if any structural invariant is broken.
    pub fn assert_invariants(&self) {
        assert!(
            self.resident.len() <= self.max_frames,
            "{} pages resident in {} frames",
            self.resident.len(),
            self.max_frames
        );
        assert!(
            self.dirty.is_subset(&self.resident),
            "dirty pages {:?} not resident",
            self.dirty.difference(&self.resident).collect::<Vec<_>>()
        );
        assert_eq!(
            self.replacer.len(),
            self.resident.len(),
            "replacer tracks a different page count than the resident set"
        );
        for &page in &self.resident {
            assert!(self.replacer.contains(page), "{} untracked by replacer", page);
        }
    }

    // ========================================================================
    // Internal: Access classification
    // ========================================================================

    fn access(&mut self, kind: AccessKind, page: PageNumber) -> AccessOutcome {
        let outcome = self.resolve(page);
        if kind == AccessKind::Write {
            self.dirty.insert(page);
        }
        self.stats.record(kind, outcome);

        if self.debug {
            debug!(policy = %self.replacer.policy(), %kind, page = page.0, %outcome, "access");
        }
        outcome
    }

    /// Make `page` resident, evicting if every frame is taken.
    fn resolve(&mut self, page: PageNumber) -> AccessOutcome {
        if self.resident.contains(&page) {
            self.replacer.record_access(page);
            return AccessOutcome::Hit;
        }

        let outcome = if self.resident.len() < self.max_frames {
            AccessOutcome::Fault { evicted: None }
        } else {
            let victim = self.evict_victim();
            if self.dirty.remove(&victim) {
                AccessOutcome::DirtyEviction { victim }
            } else {
                AccessOutcome::Fault {
                    evicted: Some(victim),
                }
            }
        };

        self.resident.insert(page);
        self.replacer.insert(page);
        outcome
    }

    /// Ask the replacer for a victim and drop it from the resident set.
    fn evict_victim(&mut self) -> PageNumber {
        let Some(victim) = self.replacer.evict() else {
            panic!(
                "{} replacer found no victim with {}/{} frames resident",
                self.replacer.policy(),
                self.resident.len(),
                self.max_frames
            );
        };

        assert!(
            self.resident.remove(&victim),
            "{} replacer evicted non-resident {}",
            self.replacer.policy(),
            victim
        );
        self.stats.evictions += 1;
        victim
    }
}

impl<R: Replacer> MemoryManagementUnit for Mmu<R> {
    fn read(&mut self, page: PageNumber) -> AccessOutcome {
        self.access(AccessKind::Read, page)
    }

    fn write(&mut self, page: PageNumber) -> AccessOutcome {
        self.access(AccessKind::Write, page)
    }

    fn debug_on(&mut self) {
        self.debug = true;
    }

    fn debug_off(&mut self) {
        self.debug = false;
    }

    fn is_debug(&self) -> bool {
        self.debug
    }

    fn total_disk_reads(&self) -> u64 {
        self.stats.disk_reads
    }

    fn total_disk_writes(&self) -> u64 {
        self.stats.disk_writes
    }

    fn total_page_faults(&self) -> u64 {
        self.stats.page_faults
    }

    fn stats(&self) -> MmuStats {
        self.stats
    }

    fn policy(&self) -> Policy {
        self.replacer.policy()
    }

    fn max_frames(&self) -> usize {
        self.max_frames
    }

    fn resident_count(&self) -> usize {
        self.resident.len()
    }

    fn is_resident(&self, page: PageNumber) -> bool {
        self.resident.contains(&page)
    }

    fn is_dirty(&self, page: PageNumber) -> bool {
        self.dirty.contains(&page)
    }
}

/// Build an engine for `policy`, chosen at runtime.
///
/// # Errors
/// - `Error::InvalidFrameCount` if `config.max_frames` is 0
pub fn build_mmu(policy: Policy, config: MmuConfig) -> Result<Box<dyn MemoryManagementUnit>> {
    Ok(match policy {
        Policy::Lru => Box::new(LruMmu::with_config(config)?),
        Policy::Random => Box::new(RandomMmu::with_config(config)?),
        Policy::Clock => Box::new(ClockMmu::with_config(config)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    use std::io;
    use std::sync::Arc;

    use parking_lot::Mutex;
    use tracing_subscriber::fmt::MakeWriter;

    fn p(n: u32) -> PageNumber {
        PageNumber::new(n)
    }

    #[test]
    fn test_hit_costs_nothing() {
        let mut mmu = LruMmu::new(4);

        assert_eq!(mmu.read(p(1)), AccessOutcome::Fault { evicted: None });
        let before = mmu.stats();

        for _ in 0..10 {
            assert_eq!(mmu.read(p(1)), AccessOutcome::Hit);
        }

        let after = mmu.stats();
        assert_eq!(after.page_faults, before.page_faults);
        assert_eq!(after.disk_reads, before.disk_reads);
        assert_eq!(after.disk_writes, before.disk_writes);
        assert_eq!(after.hits, 10);
    }

    #[test]
    fn test_distinct_pages_within_capacity() {
        let mut mmu = LruMmu::new(5);
        for n in 0..5 {
            mmu.read(p(n));
        }

        assert_eq!(mmu.total_page_faults(), 5);
        assert_eq!(mmu.total_disk_reads(), 5);
        assert_eq!(mmu.stats().evictions, 0);
        assert_eq!(mmu.resident_count(), 5);
    }

    #[test]
    fn test_lru_eviction_order() {
        let mut mmu = LruMmu::new(2);
        mmu.read(p(1));
        mmu.read(p(2));
        mmu.read(p(1));

        assert_eq!(mmu.read(p(3)), AccessOutcome::Fault { evicted: Some(p(2)) });
        assert!(mmu.is_resident(p(1)));
        assert!(!mmu.is_resident(p(2)));
    }

    #[test]
    fn test_dirty_write_back() {
        let mut mmu = LruMmu::new(1);
        mmu.write(p(1));
        assert!(mmu.is_dirty(p(1)));

        assert_eq!(mmu.read(p(2)), AccessOutcome::DirtyEviction { victim: p(1) });
        assert!(!mmu.is_dirty(p(1)));
        assert_eq!(mmu.total_disk_writes(), 1);
        assert_eq!(mmu.total_disk_reads(), 1);
        assert_eq!(mmu.total_page_faults(), 2);
    }

    #[test]
    fn test_write_hit_stays_dirty() {
        let mut mmu = LruMmu::new(2);
        mmu.write(p(1));
        mmu.read(p(1));
        mmu.write(p(1));

        assert!(mmu.is_dirty(p(1)));
        assert_eq!(mmu.total_page_faults(), 1);
        assert_eq!(mmu.total_disk_reads(), 0);
        assert_eq!(mmu.dirty_pages(), vec![p(1)]);
    }

    #[test]
    fn test_write_miss_evicting_dirty() {
        let mut mmu = LruMmu::new(1);
        mmu.write(p(1));

        assert_eq!(mmu.write(p(2)), AccessOutcome::DirtyEviction { victim: p(1) });
        assert_eq!(mmu.total_page_faults(), 2);
        assert_eq!(mmu.total_disk_writes(), 1);
        assert_eq!(mmu.total_disk_reads(), 0);
        assert!(mmu.is_dirty(p(2)));
    }

    #[test]
    fn test_clean_eviction_no_write() {
        let mut mmu = LruMmu::new(1);
        mmu.read(p(1));
        mmu.read(p(2));

        assert_eq!(mmu.total_disk_writes(), 0);
        assert_eq!(mmu.stats().evictions, 1);
    }

    #[test]
    fn test_debug_toggle() {
        let mut mmu = RandomMmu::with_config(MmuConfig::new(2).with_seed(1)).unwrap();
        assert!(!mmu.is_debug());

        mmu.debug_on();
        assert!(mmu.is_debug());
        mmu.read(p(1));

        mmu.debug_off();
        assert!(!mmu.is_debug());
        assert_eq!(mmu.total_page_faults(), 1);
    }

    /// Shared buffer the test subscriber writes formatted events into.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_access_logged_only_while_debug_on() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .finish();

        let mut mmu = LruMmu::new(4);
        tracing::subscriber::with_default(subscriber, || {
            mmu.read(p(1));
            mmu.debug_on();
            mmu.read(p(2));
            mmu.debug_off();
            mmu.read(p(3));
        });

        let access_lines: Vec<_> = logs
            .lines()
            .into_iter()
            .filter(|line| line.contains("access"))
            .collect();
        assert_eq!(access_lines.len(), 1, "{:?}", access_lines);
        assert!(access_lines[0].contains("page=2"));
        assert!(access_lines[0].contains("outcome=Miss"));
        assert_eq!(mmu.total_page_faults(), 3);
    }

    #[test]
    fn test_with_config_rejects_zero_frames() {
        assert!(matches!(
            LruMmu::with_config(MmuConfig::new(0)),
            Err(Error::InvalidFrameCount(0))
        ));
    }

    #[test]
    #[should_panic(expected = "max_frames must be > 0")]
    fn test_new_zero_frames_panics() {
        let _ = ClockMmu::new(0);
    }

    #[test]
    fn test_build_mmu_policies() {
        for policy in Policy::ALL {
            let mut mmu = build_mmu(policy, MmuConfig::new(3).with_seed(5)).unwrap();
            assert_eq!(mmu.policy(), policy);
            assert_eq!(mmu.max_frames(), 3);

            for n in 0..10 {
                mmu.read(p(n));
            }
            assert_eq!(mmu.resident_count(), 3);
            assert_eq!(mmu.total_page_faults(), 10);
        }
    }

    #[test]
    fn test_invariants_hold_across_policies() {
        let mut lru = LruMmu::new(3);
        let mut rand = RandomMmu::with_config(MmuConfig::new(3).with_seed(11)).unwrap();
        let mut clock = ClockMmu::new(3);

        for n in 0..50u32 {
            let page = p(n % 7);
            if n % 3 == 0 {
                lru.write(page);
                rand.write(page);
                clock.write(page);
            } else {
                lru.read(page);
                rand.read(page);
                clock.read(page);
            }
            lru.assert_invariants();
            rand.assert_invariants();
            clock.assert_invariants();
        }
    }

    /// Replacer that forgets everything, to check the eviction guard.
    struct ForgetfulReplacer;

    impl Replacer for ForgetfulReplacer {
        fn from_config(_config: &MmuConfig) -> Self {
            ForgetfulReplacer
        }
        fn policy(&self) -> Policy {
            Policy::Lru
        }
        fn record_access(&mut self, _page: PageNumber) {}
        fn insert(&mut self, _page: PageNumber) {}
        fn evict(&mut self) -> Option<PageNumber> {
            None
        }
        fn contains(&self, _page: PageNumber) -> bool {
            false
        }
        fn len(&self) -> usize {
            0
        }
    }

    #[test]
    #[should_panic(expected = "found no victim")]
    fn test_missing_victim_is_fatal() {
        let mut mmu: Mmu<ForgetfulReplacer> = Mmu::new(1);
        mmu.read(p(1));
        mmu.read(p(2));
    }
}
