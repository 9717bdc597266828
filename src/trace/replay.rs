//! Replaying traces through an MMU.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use tracing::info;

use super::reader::{TraceEvent, TraceReader};
use crate::common::{MmuConfig, Result};
use crate::mmu::{build_mmu, MemoryManagementUnit, MmuStats, Policy};

/// Outcome of replaying one trace through one engine.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Label of the trace, usually its file stem.
    pub trace: String,
    pub policy: Policy,
    pub frames: usize,
    /// Number of events replayed.
    pub events: u64,
    /// Final counters.
    pub stats: MmuStats,
    pub elapsed: Duration,
}

impl RunReport {
    /// Collect the final state of `mmu` after `events` accesses.
    pub fn collect<M>(trace: impl Into<String>, mmu: &M, events: u64, elapsed: Duration) -> Self
    where
        M: MemoryManagementUnit + ?Sized,
    {
        Self {
            trace: trace.into(),
            policy: mmu.policy(),
            frames: mmu.max_frames(),
            events,
            stats: mmu.stats(),
            elapsed,
        }
    }

    /// Page faults per replayed event (0.0 for an empty trace).
    pub fn fault_rate(&self) -> f64 {
        if self.events == 0 {
            0.0
        } else {
            self.stats.page_faults as f64 / self.events as f64
        }
    }

    /// Hits per replayed event (0.0 for an empty trace, like `fault_rate`).
    pub fn hit_rate(&self) -> f64 {
        if self.events == 0 {
            0.0
        } else {
            self.stats.hits as f64 / self.events as f64
        }
    }

    /// Disk reads plus disk writes.
    pub fn disk_operations(&self) -> u64 {
        self.stats.disk_reads + self.stats.disk_writes
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total memory frames:  {}", self.frames)?;
        writeln!(f, "events in trace:      {}", self.events)?;
        writeln!(f, "total disk reads:     {}", self.stats.disk_reads)?;
        writeln!(f, "total disk writes:    {}", self.stats.disk_writes)?;
        write!(f, "page fault rate:      {:.4}", self.fault_rate())
    }
}

/// Replay a stream of parsed events, stopping at the first parse error.
///
/// Returns the number of events applied.
pub fn replay<M, I>(mmu: &mut M, events: I) -> Result<u64>
where
    M: MemoryManagementUnit + ?Sized,
    I: IntoIterator<Item = Result<TraceEvent>>,
{
    let mut count = 0;
    for event in events {
        event?.apply(mmu);
        count += 1;
    }
    Ok(count)
}

/// Replay events that are already in memory.
pub fn replay_events<M>(mmu: &mut M, events: &[TraceEvent]) -> u64
where
    M: MemoryManagementUnit + ?Sized,
{
    for event in events {
        event.apply(mmu);
    }
    events.len() as u64
}

/// Stream a trace file through a fresh engine for `policy`.
///
/// # Errors
/// - `Error::InvalidFrameCount` for a zero-frame config
/// - I/O and parse errors from the trace
pub fn run_trace<P: AsRef<Path>>(path: P, policy: Policy, config: MmuConfig) -> Result<RunReport> {
    let path = path.as_ref();
    let mut mmu = build_mmu(policy, config)?;
    let reader = TraceReader::open(path)?;

    let start = Instant::now();
    let events = replay(&mut *mmu, reader)?;
    let elapsed = start.elapsed();

    let label = trace_label(path);
    info!(trace = %label, %policy, frames = config.max_frames, events, "trace replayed");
    Ok(RunReport::collect(label, &*mmu, events, elapsed))
}

/// File stem of a trace path, falling back to the full path.
pub fn trace_label(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Error, PageNumber};
    use crate::mmu::LruMmu;

    #[test]
    fn test_replay_counts_events() {
        let input = "1000 R\n2000 R\n1000 W\n3000 R\n";
        let mut mmu = LruMmu::new(2);

        let events = replay(&mut mmu, TraceReader::new(input.as_bytes())).unwrap();

        assert_eq!(events, 4);
        assert_eq!(mmu.total_page_faults(), 3);
        assert!(mmu.is_dirty(PageNumber::new(1)));
    }

    #[test]
    fn test_replay_stops_on_parse_error() {
        let input = "1000 R\nnot-a-line\n2000 R\n";
        let mut mmu = LruMmu::new(2);

        let result = replay(&mut mmu, TraceReader::new(input.as_bytes()));

        assert!(matches!(result, Err(Error::TraceParse { line: 2, .. })));
        assert_eq!(mmu.total_page_faults(), 1);
    }

    #[test]
    fn test_report_rates_and_display() {
        let mut mmu = LruMmu::new(1);
        let events = [
            TraceEvent::write(PageNumber::new(1)),
            TraceEvent::read(PageNumber::new(1)),
            TraceEvent::read(PageNumber::new(2)),
            TraceEvent::read(PageNumber::new(2)),
        ];
        let count = replay_events(&mut mmu, &events);
        let report = RunReport::collect("unit", &mmu, count, Duration::ZERO);

        assert_eq!(report.events, 4);
        assert_eq!(report.fault_rate(), 0.5);
        assert_eq!(report.hit_rate(), 0.5);
        assert_eq!(report.hit_rate(), report.stats.hit_rate());
        assert_eq!(report.disk_operations(), 2);

        let text = report.to_string();
        assert!(text.contains("total memory frames:  1"));
        assert!(text.contains("total disk writes:    1"));
        assert!(text.contains("page fault rate:      0.5000"));
    }

    #[test]
    fn test_empty_report() {
        let mmu = LruMmu::new(4);
        let report = RunReport::collect("empty", &mmu, 0, Duration::ZERO);
        assert_eq!(report.fault_rate(), 0.0);
        assert_eq!(report.hit_rate(), 0.0);
        assert_eq!(report.hit_rate(), report.stats.hit_rate());
    }

    #[test]
    fn test_trace_label() {
        assert_eq!(trace_label(Path::new("traces/gcc.trace")), "gcc");
    }
}
