//! Memory operations: bounded read/write and pattern scanning
//!
//! Both operate through the [`MemorySource`] seam so the scanner can be
//! exercised against in-memory sources as well as live processes.

pub mod accessor;
pub mod scanner;

pub use accessor::MemoryAccessor;
pub use scanner::{parse_hex_pattern, Matches, PatternScanner, ScanOptions};

use crate::core::types::Address;
use crate::process::ProcessHandle;

/// Something a bounded read can be issued against.
///
/// The contract is the short-read contract of the whole crate: up to
/// `buf.len()` bytes are copied from `address` and the transferred count
/// is returned; 0 means the range is unreadable or exhausted. Never an
/// error.
pub trait MemorySource {
    fn read_at(&self, address: Address, buf: &mut [u8]) -> usize;
}

impl MemorySource for ProcessHandle {
    fn read_at(&self, address: Address, buf: &mut [u8]) -> usize {
        self.read_memory(address, buf)
    }
}
