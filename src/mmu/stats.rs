//! MMU statistics tracking.

use std::fmt;

use super::access::{AccessKind, AccessOutcome};

/// Counters kept by one MMU engine.
///
/// Every counter only ever increases. Engines are single-threaded, so
/// these are plain integers updated through `&mut self`.
///
/// # Example
/// ```
/// use memsim::MmuStats;
///
/// let stats = MmuStats::default();
/// assert_eq!(stats.page_faults, 0);
/// assert_eq!(stats.fault_rate(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MmuStats {
    /// Accesses that found their page resident.
    pub hits: u64,

    /// Accesses that found their page absent.
    pub page_faults: u64,

    /// Pages fetched from disk.
    pub disk_reads: u64,

    /// Dirty pages flushed to disk before their frame was reused.
    pub disk_writes: u64,

    /// Pages removed from the resident set to make room.
    pub evictions: u64,
}

impl MmuStats {
    /// Apply the counter rule for one access.
    ///
    /// A read miss always fetches the page. A write miss allocates the
    /// frame without fetching. A dirty victim costs one write either way.
    pub(crate) fn record(&mut self, kind: AccessKind, outcome: AccessOutcome) {
        match outcome {
            AccessOutcome::Hit => {
                self.hits += 1;
                return;
            }
            AccessOutcome::Fault { .. } => {}
            AccessOutcome::DirtyEviction { .. } => self.disk_writes += 1,
        }

        self.page_faults += 1;
        if kind == AccessKind::Read {
            self.disk_reads += 1;
        }
    }

    /// Total accesses seen.
    pub fn accesses(&self) -> u64 {
        self.hits + self.page_faults
    }

    /// Fraction of accesses that faulted (0.0 to 1.0, and 0.0 before any access).
    pub fn fault_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.page_faults as f64 / total as f64
        }
    }

    /// Fraction of accesses that hit (0.0 to 1.0, and 0.0 before any access).
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for MmuStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ faults: {}, reads: {}, writes: {}, evictions: {}, hit_rate: {:.2}% }}",
            self.page_faults,
            self.disk_reads,
            self.disk_writes,
            self.evictions,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PageNumber;

    #[test]
    fn test_stats_new() {
        let stats = MmuStats::default();
        assert_eq!(stats.accesses(), 0);
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.fault_rate(), 0.0);
    }

    #[test]
    fn test_read_counters() {
        let mut stats = MmuStats::default();

        stats.record(AccessKind::Read, AccessOutcome::Hit);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.disk_reads, 0);

        stats.record(AccessKind::Read, AccessOutcome::Fault { evicted: None });
        assert_eq!((stats.page_faults, stats.disk_reads, stats.disk_writes), (1, 1, 0));

        stats.record(
            AccessKind::Read,
            AccessOutcome::DirtyEviction {
                victim: PageNumber::new(1),
            },
        );
        assert_eq!((stats.page_faults, stats.disk_reads, stats.disk_writes), (2, 2, 1));
    }

    #[test]
    fn test_write_miss_skips_fetch() {
        let mut stats = MmuStats::default();

        stats.record(AccessKind::Write, AccessOutcome::Fault { evicted: None });
        stats.record(
            AccessKind::Write,
            AccessOutcome::Fault {
                evicted: Some(PageNumber::new(4)),
            },
        );
        assert_eq!((stats.page_faults, stats.disk_reads, stats.disk_writes), (2, 0, 0));

        stats.record(
            AccessKind::Write,
            AccessOutcome::DirtyEviction {
                victim: PageNumber::new(4),
            },
        );
        assert_eq!((stats.page_faults, stats.disk_reads, stats.disk_writes), (3, 0, 1));
    }

    #[test]
    fn test_rates() {
        let stats = MmuStats {
            hits: 7,
            page_faults: 3,
            ..MmuStats::default()
        };
        assert_eq!(stats.hit_rate(), 0.7);
        assert!((stats.fault_rate() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_stats_display() {
        let stats = MmuStats {
            hits: 80,
            page_faults: 20,
            disk_reads: 15,
            disk_writes: 4,
            evictions: 5,
        };
        let display = format!("{}", stats);

        assert!(display.contains("faults: 20"));
        assert!(display.contains("writes: 4"));
        assert!(display.contains("80.00%"));
    }
}
