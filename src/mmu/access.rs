//! Access classification shared by every policy.

use std::fmt;

use crate::common::PageNumber;

/// Whether an access reads or writes its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessKind::Read => f.write_str("read"),
            AccessKind::Write => f.write_str("write"),
        }
    }
}

/// How the engine resolved one access.
///
/// `read` and `write` classify the same way and differ only in how they
/// charge the outcome (see [`crate::MmuStats`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// The page was resident.
    Hit,

    /// The page was loaded into a free frame (`evicted == None`) or into
    /// the frame of a clean victim.
    Fault { evicted: Option<PageNumber> },

    /// The page was loaded into the frame of a dirty victim, which was
    /// flushed first.
    DirtyEviction { victim: PageNumber },
}

impl AccessOutcome {
    #[inline]
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::Hit)
    }

    /// The page that lost its frame, if any.
    pub fn victim(&self) -> Option<PageNumber> {
        match *self {
            AccessOutcome::Hit => None,
            AccessOutcome::Fault { evicted } => evicted,
            AccessOutcome::DirtyEviction { victim } => Some(victim),
        }
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessOutcome::Hit => write!(f, "Hit"),
            AccessOutcome::Fault { evicted: None } => write!(f, "Miss"),
            AccessOutcome::Fault {
                evicted: Some(victim),
            } => write!(f, "Miss, evicted {}", victim),
            AccessOutcome::DirtyEviction { victim } => {
                write!(f, "Miss, evicted {} (dirty)", victim)
            }
        }
    }
}
