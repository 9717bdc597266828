//! Experiment sweeps: traces against a grid of policies and frame counts.
//!
//! Each run gets its own engine, so runs are independent and can be spread
//! over worker threads. Workers pull jobs from a shared queue and push
//! reports into a shared list; nothing else is shared.
//!
//! Finished runs can be saved as JSON with [`write_results`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::thread;
use std::time::Instant;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::common::config::DEFAULT_SEED;
use crate::common::{Error, MmuConfig, Result};
use crate::mmu::{build_mmu, Policy};
use crate::trace::{load_trace, replay_events, trace_label, RunReport, TraceEvent};

/// Which frame counts a sweep covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSizes {
    /// `min, min + step, ...` up to and including `max`.
    Linear { min: usize, max: usize, step: usize },

    /// `2^min_exp ..= 2^max_exp`.
    PowersOfTwo { min_exp: u32, max_exp: u32 },

    /// An explicit list.
    List(Vec<usize>),
}

impl FrameSizes {
    /// Expand into the concrete frame counts.
    ///
    /// # Errors
    /// - `Error::InvalidFrameSizes` for a zero `step`, or an exponent whose
    ///   power of two does not fit in `usize`
    pub fn sizes(&self) -> Result<Vec<usize>> {
        match self {
            FrameSizes::Linear { min, max, step } => {
                if *step == 0 {
                    return Err(Error::InvalidFrameSizes("step must be > 0".to_string()));
                }
                Ok((*min..=*max).step_by(*step).collect())
            }
            FrameSizes::PowersOfTwo { min_exp, max_exp } => (*min_exp..=*max_exp)
                .map(|exp| {
                    1usize.checked_shl(exp).ok_or_else(|| {
                        Error::InvalidFrameSizes(format!("2^{} frames does not fit", exp))
                    })
                })
                .collect(),
            FrameSizes::List(sizes) => Ok(sizes.clone()),
        }
    }
}

/// A grid of runs over one or more traces.
///
/// # Example
/// ```
/// use memsim::experiment::{FrameSizes, Sweep};
/// use memsim::trace::TraceEvent;
/// use memsim::{PageNumber, Policy};
///
/// let events: Vec<_> = (0..64u32).map(|n| TraceEvent::read(PageNumber::new(n % 10))).collect();
/// let sweep = Sweep::new(vec![Policy::Lru, Policy::Clock], FrameSizes::List(vec![2, 4]));
/// let reports = sweep.run("toy", &events).unwrap();
/// assert_eq!(reports.len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Sweep {
    pub policies: Vec<Policy>,
    pub frame_sizes: FrameSizes,

    /// Seed handed to every run, so randomized policies are reproducible.
    pub seed: u64,

    /// Upper bound on worker threads.
    pub workers: usize,
}

impl Sweep {
    pub fn new(policies: Vec<Policy>, frame_sizes: FrameSizes) -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            policies,
            frame_sizes,
            seed: DEFAULT_SEED,
            workers,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Every `(policy, frames)` pair, in report order.
    pub fn jobs(&self) -> Result<Vec<(Policy, usize)>> {
        let sizes = self.frame_sizes.sizes()?;
        Ok(self
            .policies
            .iter()
            .flat_map(|&policy| sizes.iter().map(move |&frames| (policy, frames)))
            .collect())
    }

    /// Load a trace file and sweep it.
    pub fn run_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<RunReport>> {
        let path = path.as_ref();
        let events = load_trace(path)?;
        self.run(&trace_label(path), &events)
    }

    /// Sweep several trace files, in the order given.
    ///
    /// A trace that cannot be read is logged and skipped; a trace that
    /// reads but fails to parse aborts the sweep.
    ///
    /// # Errors
    /// - `Error::EmptySweep` if no trace could be read
    /// - any error from [`Sweep::run`] or from parsing a trace
    pub fn run_files<I, P>(&self, paths: I) -> Result<Vec<RunReport>>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut reports = Vec::new();
        let mut swept = 0;

        for path in paths {
            let path = path.as_ref();
            let events = match load_trace(path) {
                Ok(events) => events,
                Err(Error::Io(e)) => {
                    warn!(trace = %path.display(), error = %e, "skipping unreadable trace");
                    continue;
                }
                Err(e) => return Err(e),
            };

            reports.extend(self.run(&trace_label(path), &events)?);
            swept += 1;
        }

        if swept == 0 {
            return Err(Error::EmptySweep);
        }
        Ok(reports)
    }

    /// Run every job against `events`.
    ///
    /// Reports come back sorted by policy, then frame count.
    ///
    /// # Errors
    /// - `Error::EmptySweep` if there are no policies or no frame sizes
    /// - `Error::InvalidFrameCount` if any frame count is 0
    /// - `Error::InvalidFrameSizes` if the frame sizes cannot be expanded
    pub fn run(&self, label: &str, events: &[TraceEvent]) -> Result<Vec<RunReport>> {
        let mut jobs = self.jobs()?;
        if jobs.is_empty() {
            return Err(Error::EmptySweep);
        }
        if let Some(&(_, frames)) = jobs.iter().find(|(_, frames)| *frames == 0) {
            return Err(Error::InvalidFrameCount(frames));
        }

        let total = jobs.len();
        let workers = self.workers.clamp(1, total);
        info!(trace = label, runs = total, workers, "starting sweep");

        // Workers pop from the back
        jobs.reverse();
        let queue = Mutex::new(jobs);
        let reports = Mutex::new(Vec::with_capacity(total));
        let (queue_ref, reports_ref) = (&queue, &reports);

        thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(move |_| {
                    s.spawn(move || -> Result<()> {
                        loop {
                            let Some((policy, frames)) = queue_ref.lock().pop() else {
                                return Ok(());
                            };
                            let report = self.run_one(label, events, policy, frames)?;
                            reports_ref.lock().push(report);
                        }
                    })
                })
                .collect();

            handles.into_iter().try_for_each(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
        })?;

        let mut reports = reports.into_inner();
        reports.sort_by(|a, b| (a.policy, a.frames).cmp(&(b.policy, b.frames)));
        Ok(reports)
    }

    fn run_one(
        &self,
        label: &str,
        events: &[TraceEvent],
        policy: Policy,
        frames: usize,
    ) -> Result<RunReport> {
        let mut mmu = build_mmu(policy, MmuConfig::new(frames).with_seed(self.seed))?;

        let start = Instant::now();
        let count = replay_events(&mut *mmu, events);
        let report = RunReport::collect(label, &*mmu, count, start.elapsed());

        debug!(
            %policy,
            frames,
            faults = report.stats.page_faults,
            fault_rate = report.fault_rate(),
            "run finished"
        );
        Ok(report)
    }
}

/// One saved run, in the results file layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub trace_file: String,
    pub frames: usize,
    pub algorithm: String,
    pub events: u64,
    pub disk_reads: u64,
    pub disk_writes: u64,
    pub page_faults: u64,
    pub fault_rate: f64,
    pub hit_rate: f64,
    /// Wall time of the replay, in seconds.
    pub execution_time: f64,
}

impl From<&RunReport> for RunRecord {
    fn from(report: &RunReport) -> Self {
        Self {
            trace_file: report.trace.clone(),
            frames: report.frames,
            algorithm: report.policy.name().to_string(),
            events: report.events,
            disk_reads: report.stats.disk_reads,
            disk_writes: report.stats.disk_writes,
            page_faults: report.stats.page_faults,
            fault_rate: report.fault_rate(),
            hit_rate: report.hit_rate(),
            execution_time: report.elapsed.as_secs_f64(),
        }
    }
}

/// Save `reports` to `path` as a pretty-printed JSON array of [`RunRecord`]s.
///
/// Overwrites an existing file.
pub fn write_results<P: AsRef<Path>>(path: P, reports: &[RunReport]) -> Result<()> {
    let records: Vec<RunRecord> = reports.iter().map(RunRecord::from).collect();

    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.flush()?;

    info!(path = %path.as_ref().display(), runs = records.len(), "results saved");
    Ok(())
}

/// Load a results file written by [`write_results`].
pub fn read_results<P: AsRef<Path>>(path: P) -> Result<Vec<RunRecord>> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
