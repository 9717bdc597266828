use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use memsim::experiment::{write_results, FrameSizes, Sweep};
use memsim::trace::{run_trace, RunReport};
use memsim::{MmuConfig, Policy};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Replay memory traces through a simulated MMU.
#[derive(Debug, Parser)]
#[command(name = "memsim", version, about)]
struct Cli {
    /// Log every access and each replacement decision
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay one trace with one policy and frame count
    Run {
        /// Trace file, one `<hex address> <R|W>` per line
        trace: PathBuf,

        /// Number of physical frames
        frames: usize,

        /// Replacement policy: lru, rand or clock
        policy: Policy,

        /// Seed for the random policy
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Replay traces across policies and frame counts
    Sweep(SweepArgs),
}

#[derive(Debug, Args)]
struct SweepArgs {
    /// Trace files; unreadable ones are skipped with a warning
    #[arg(required = true, num_args = 1..)]
    traces: Vec<PathBuf>,

    /// Policies to compare
    #[arg(long, value_delimiter = ',', default_value = "rand,lru,clock")]
    policies: Vec<Policy>,

    /// Smallest frame count (or exponent with --pow2)
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// Largest frame count (or exponent with --pow2)
    #[arg(long, default_value_t = 10)]
    max: usize,

    /// Frame count increment
    #[arg(long, default_value_t = 1, conflicts_with = "pow2")]
    step: usize,

    /// Treat --min/--max as powers of two
    #[arg(long)]
    pow2: bool,

    /// Explicit frame counts, overriding --min/--max
    #[arg(long, value_delimiter = ',')]
    frames: Vec<usize>,

    #[arg(long, default_value_t = memsim::common::config::DEFAULT_SEED)]
    seed: u64,

    /// Worker threads (defaults to available parallelism)
    #[arg(long)]
    workers: Option<usize>,

    /// Save every run to this JSON file
    #[arg(long)]
    results: Option<PathBuf>,
}

impl SweepArgs {
    fn frame_sizes(&self) -> CliResult<FrameSizes> {
        let sizes = if !self.frames.is_empty() {
            FrameSizes::List(self.frames.clone())
        } else if self.pow2 {
            FrameSizes::PowersOfTwo {
                min_exp: u32::try_from(self.min)?,
                max_exp: u32::try_from(self.max)?,
            }
        } else {
            FrameSizes::Linear {
                min: self.min,
                max: self.max,
                step: self.step,
            }
        };
        Ok(sizes)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let default = if debug { "memsim=debug" } else { "memsim=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(cli: Cli) -> CliResult<()> {
    match cli.command {
        Command::Run {
            trace,
            frames,
            policy,
            seed,
        } => {
            let mut config = MmuConfig::new(frames).with_debug(cli.debug);
            config.seed = seed;

            let report = run_trace(&trace, policy, config)?;
            println!("{report}");
        }
        Command::Sweep(args) => {
            let mut sweep =
                Sweep::new(args.policies.clone(), args.frame_sizes()?).with_seed(args.seed);
            if let Some(workers) = args.workers {
                sweep = sweep.with_workers(workers);
            }

            let reports = sweep.run_files(&args.traces)?;
            print_summary(&reports);

            if let Some(path) = &args.results {
                write_results(path, &reports)?;
                println!("Results saved to {}", path.display());
            }
        }
    }
    Ok(())
}

/// One table per trace; reports arrive grouped by trace.
fn print_summary(reports: &[RunReport]) {
    for (i, report) in reports.iter().enumerate() {
        let new_trace = i == 0 || reports[i - 1].trace != report.trace;
        if new_trace {
            if i > 0 {
                println!();
            }
            println!("=== {} ({} events) ===", report.trace, report.events);
            println!(
                "{:<6} {:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
                "policy", "frames", "faults", "reads", "writes", "fault%", "time(ms)"
            );
        }
        println!(
            "{:<6} {:>8} {:>10} {:>10} {:>10} {:>9.2}% {:>10.3}",
            report.policy.to_string(),
            report.frames,
            report.stats.page_faults,
            report.stats.disk_reads,
            report.stats.disk_writes,
            report.fault_rate() * 100.0,
            report.elapsed.as_secs_f64() * 1000.0
        );
    }
}
