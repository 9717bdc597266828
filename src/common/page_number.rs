//! Logical page number type.

use std::fmt;

use crate::common::config::PAGE_OFFSET;
use crate::common::{Error, Result};

/// Identifies a logical page of virtual memory.
///
/// Using `u32` gives 2^32 pages of 4KB each, which covers a 44-bit
/// virtual address space and every 32-bit or 48-bit trace we replay
/// once shifted by [`PAGE_OFFSET`] (the latter checked).
///
/// # Example
/// ```
/// use memsim::PageNumber;
///
/// let page = PageNumber::from_address(0x0041_f7a0).unwrap();
/// assert_eq!(page, PageNumber::new(0x41f));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageNumber(pub u32);

impl PageNumber {
    /// Create a new PageNumber.
    #[inline]
    pub fn new(number: u32) -> Self {
        PageNumber(number)
    }

    /// Page containing the virtual byte address `address`.
    ///
    /// # Errors
    /// - `Error::InvalidPage` if the page number does not fit in `u32`
    pub fn from_address(address: u64) -> Result<Self> {
        u32::try_from(address >> PAGE_OFFSET)
            .map(PageNumber)
            .map_err(|_| Error::InvalidPage(address))
    }
}

impl From<u32> for PageNumber {
    fn from(number: u32) -> Self {
        PageNumber(number)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.0)
    }
}
