//! Common types and utilities shared across memsim.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`MmuConfig`]
//! - Error types
//! - The [`PageNumber`] identifier

pub mod config;
pub mod error;
mod page_number;

pub use config::MmuConfig;
pub use error::{Error, Result};
pub use page_number::PageNumber;
