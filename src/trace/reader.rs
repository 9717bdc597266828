//! Trace parsing.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use crate::common::{Error, PageNumber, Result};
use crate::mmu::{AccessKind, AccessOutcome, MemoryManagementUnit};

/// One access from a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEvent {
    pub kind: AccessKind,
    pub page: PageNumber,
}

impl TraceEvent {
    pub fn read(page: PageNumber) -> Self {
        Self {
            kind: AccessKind::Read,
            page,
        }
    }

    pub fn write(page: PageNumber) -> Self {
        Self {
            kind: AccessKind::Write,
            page,
        }
    }

    /// Issue this access against `mmu`.
    pub fn apply<M>(&self, mmu: &mut M) -> AccessOutcome
    where
        M: MemoryManagementUnit + ?Sized,
    {
        match self.kind {
            AccessKind::Read => mmu.read(self.page),
            AccessKind::Write => mmu.write(self.page),
        }
    }
}

/// Parse one trace line. Blank lines yield `Ok(None)`.
///
/// `line_no` is 1-based and only used in error messages.
///
/// # Errors
/// - `Error::TraceParse` for a malformed line
/// - `Error::InvalidPage` if the address is beyond the page number range
pub fn parse_line(line: &str, line_no: usize) -> Result<Option<TraceEvent>> {
    let mut fields = line.split_whitespace();

    let Some(address) = fields.next() else {
        return Ok(None);
    };
    let parse_err = |reason: String| Error::TraceParse {
        line: line_no,
        reason,
    };

    let op = fields
        .next()
        .ok_or_else(|| parse_err("missing operation".to_string()))?;
    if let Some(extra) = fields.next() {
        return Err(parse_err(format!("unexpected field '{}'", extra)));
    }

    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    let address = u64::from_str_radix(digits, 16)
        .map_err(|e| parse_err(format!("bad address '{}': {}", address, e)))?;

    let kind = match op {
        "R" | "r" => AccessKind::Read,
        "W" | "w" => AccessKind::Write,
        other => return Err(parse_err(format!("unknown operation '{}'", other))),
    };

    Ok(Some(TraceEvent {
        kind,
        page: PageNumber::from_address(address)?,
    }))
}

/// Streaming trace parser.
///
/// Yields one `Result<TraceEvent>` per non-blank line.
///
/// # Example
/// ```
/// use memsim::trace::TraceReader;
///
/// let input = "00001000 R\n\n00002fff W\n";
/// let events: Vec<_> = TraceReader::new(input.as_bytes())
///     .collect::<memsim::Result<_>>()
///     .unwrap();
/// assert_eq!(events.len(), 2);
/// ```
pub struct TraceReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl TraceReader<BufReader<File>> {
    /// Open a trace file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e.into())),
            };
            self.line_no += 1;

            match parse_line(&line, self.line_no) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Read a whole trace file into memory.
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<TraceEvent>> {
    TraceReader::open(path)?.collect()
}
