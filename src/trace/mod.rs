//! Trace files and replay.
//!
//! A trace is a text file with one memory access per line:
//! ```text
//! 0041f7a0 R
//! 13f5e2c0 W
//! ```
//! The first field is a virtual byte address in hex, the second is `R` or
//! `W`. This module handles:
//! - [`TraceReader`] - Streaming parser over any `BufRead`
//! - [`replay`] - Driving an MMU with a trace and reporting the result

mod reader;
mod replay;

pub use reader::{load_trace, parse_line, TraceEvent, TraceReader};
pub use replay::{replay, replay_events, run_trace, trace_label, RunReport};
