//! Configuration constants and engine configuration for memsim.

use crate::common::{Error, Result};

/// Number of low address bits that address a byte within a page.
///
/// Traces carry virtual byte addresses; the page number is
/// `address >> PAGE_OFFSET`.
pub const PAGE_OFFSET: u32 = 12;

/// Size of a page in bytes (4KB).
pub const PAGE_SIZE: usize = 1 << PAGE_OFFSET;

/// Seed used by sweeps when the caller does not pick one.
pub const DEFAULT_SEED: u64 = 0x5EED;

/// Construction parameters for an MMU engine.
///
/// # Example
/// ```
/// use memsim::MmuConfig;
///
/// let config = MmuConfig::new(64).with_debug(true).with_seed(7);
/// assert_eq!(config.max_frames, 64);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmuConfig {
    /// Number of physical frames; the resident set never grows past this.
    pub max_frames: usize,

    /// Emit a tracing event for every access.
    pub debug: bool,

    /// Seed for randomized policies. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl MmuConfig {
    /// Create a config with `max_frames` frames, debug off, no fixed seed.
    pub fn new(max_frames: usize) -> Self {
        Self {
            max_frames,
            debug: false,
            seed: None,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that the configuration describes a usable engine.
    ///
    /// # Errors
    /// - `Error::InvalidFrameCount` if `max_frames` is 0
    pub fn validate(&self) -> Result<()> {
        if self.max_frames == 0 {
            return Err(Error::InvalidFrameCount(self.max_frames));
        }
        Ok(())
    }
}
