//! Error types for memsim.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All recoverable errors in memsim.
///
/// The replacement engine itself never fails on a valid page number; these
/// cover construction, trace loading and the driver surfaces.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading a trace file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An engine needs at least one frame.
    #[error("Invalid frame count: {0} (must be > 0)")]
    InvalidFrameCount(usize),

    /// A trace address maps to a page number outside the `u32` range.
    #[error("Invalid page for address {0:#x}")]
    InvalidPage(u64),

    /// A trace line could not be parsed.
    #[error("Trace line {line}: {reason}")]
    TraceParse { line: usize, reason: String },

    /// Policy name not recognised.
    #[error("Unknown replacement policy: {0}")]
    UnknownPolicy(String),

    /// A sweep's frame size range cannot be expanded.
    #[error("Invalid frame sizes: {0}")]
    InvalidFrameSizes(String),

    /// A sweep was configured with no policies, no frame sizes or no
    /// readable traces.
    #[error("Sweep has nothing to run")]
    EmptySweep,

    /// Results file could not be encoded or decoded.
    #[error("Results encoding error: {0}")]
    Json(#[from] serde_json::Error),
}
