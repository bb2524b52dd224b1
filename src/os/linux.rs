//! Linux procfs backend
//!
//! A target process's memory is addressed through `/proc/<pid>/mem`:
//! positioned reads and writes on that file are single OS-mediated copies
//! into the target's address space, with the file offset acting as the
//! remote address.

use crate::core::types::{MemoryError, MemoryResult, ProcessId};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;

/// Opens the memory pseudo-file of a process for read-write access.
///
/// Fails if the target does not exist, the caller lacks ptrace permission
/// over it, or the descriptor table is exhausted. None of these are
/// transient, so there is no retry.
pub fn open_mem(pid: ProcessId) -> MemoryResult<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(format!("/proc/{}/mem", pid))
        .map_err(|e| MemoryError::open_failed(pid, e.to_string()))
}

/// Reads up to `buf.len()` bytes from the target at `address`.
///
/// Returns the number of bytes transferred. An unmapped or unreadable
/// range yields 0 (the kernel reports `EIO` for such offsets); a range
/// crossing into an unmapped page yields a short count.
pub fn read_mem(mem: &File, address: usize, buf: &mut [u8]) -> usize {
    mem.read_at(buf, address as u64).unwrap_or(0)
}

/// Writes `data` to the target at `address`, returning the bytes moved.
///
/// Same short-transfer contract as [`read_mem`]. Note that the kernel
/// forces writes through the mem file, so a page mapped read-only in the
/// target is not a reliable write barrier on Linux; only unmapped ranges
/// dependably yield 0.
pub fn write_mem(mem: &File, address: usize, data: &[u8]) -> usize {
    mem.write_at(data, address as u64).unwrap_or(0)
}

/// Best-effort start time of a process, in clock ticks since boot.
///
/// Field 22 of `/proc/<pid>/stat`. Used to detect pid reuse: two
/// processes with the same pid and the same start time are the same
/// process generation.
pub fn process_start_time(pid: ProcessId) -> Option<u64> {
    let stat = std::fs::read_to_string(format!("/proc/{}/stat", pid)).ok()?;

    // The comm field is parenthesized and may contain spaces, so split
    // after the closing paren: the remainder starts at field 3 (state).
    let rest = stat.rsplit_once(')')?.1;
    rest.split_whitespace().nth(19)?.parse().ok()
}
