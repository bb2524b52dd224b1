//! Map reader: enumerates a target process's memory regions
//!
//! Enumeration is deliberately independent of any open [`ProcessHandle`]:
//! each snapshot opens its own short-lived query channel (the procfs maps
//! file on Linux, a query-access handle on Windows) and releases it before
//! returning. The result is a point-in-time view; the target may remap at
//! any moment afterwards.
//!
//! [`ProcessHandle`]: crate::process::ProcessHandle

use crate::core::types::{MemoryError, MemoryRegion, MemoryResult, ProcessId, ProcessMap, Protection};
use std::path::PathBuf;
use tracing::debug;

/// Produces a full snapshot of the target's memory layout.
///
/// Regions come back in OS enumeration order, which is ascending start
/// address on both platform families. Fails with
/// [`MemoryError::MapReadFailed`] if the target cannot be queried (it
/// exited, or permission was denied); no partial result is returned.
pub fn read_maps(pid: ProcessId) -> MemoryResult<ProcessMap> {
    read_maps_capped(pid, None)
}

/// Like [`read_maps`], but stops enumerating once `max_regions` have been
/// collected. A capped snapshot carries
/// [`truncated() == true`](ProcessMap::truncated) so the caller always
/// knows it is looking at a prefix of the layout.
pub fn read_maps_capped(pid: ProcessId, max_regions: Option<usize>) -> MemoryResult<ProcessMap> {
    let map = read_maps_impl(pid, max_regions)?;
    debug!(
        pid,
        regions = map.len(),
        truncated = map.truncated(),
        "read memory map snapshot"
    );
    Ok(map)
}

/// Parses one `/proc/<pid>/maps` line:
/// `<start>-<end> <perms> <offset> <dev> <inode> [<path>]`.
///
/// Returns `None` when the line does not yield at least start, end and
/// permissions; the enumeration skips such lines rather than failing.
/// A missing path means an anonymous mapping.
pub fn parse_maps_line(line: &str) -> Option<MemoryRegion> {
    let mut parts = line.split_whitespace();

    let mut range = parts.next()?.splitn(2, '-');
    let start = usize::from_str_radix(range.next()?, 16).ok()?;
    let end = usize::from_str_radix(range.next()?, 16).ok()?;

    let protection = Protection::from_procfs(parts.next()?)?;

    // offset, device and inode are not part of the region model
    let _offset = parts.next();
    let _dev = parts.next();
    let _inode = parts.next();

    let rest: Vec<&str> = parts.collect();
    let path = if rest.is_empty() {
        None
    } else {
        Some(PathBuf::from(rest.join(" ")))
    };

    MemoryRegion::new(start.into(), end.into(), protection, path)
}

#[cfg(target_os = "linux")]
fn read_maps_impl(pid: ProcessId, max_regions: Option<usize>) -> MemoryResult<ProcessMap> {
    use std::io::{BufRead, BufReader};
    use tracing::warn;

    let file = std::fs::File::open(format!("/proc/{}/maps", pid))
        .map_err(|e| MemoryError::map_read_failed(pid, e.to_string()))?;

    let mut regions = Vec::new();
    let mut truncated = false;

    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| MemoryError::map_read_failed(pid, e.to_string()))?;

        if max_regions.is_some_and(|cap| regions.len() >= cap) {
            truncated = true;
            break;
        }

        match parse_maps_line(&line) {
            Some(region) => regions.push(region),
            None => warn!(pid, line = %line, "skipping unparsable maps line"),
        }
    }

    Ok(ProcessMap::new(regions, truncated))
}

#[cfg(windows)]
fn read_maps_impl(pid: ProcessId, max_regions: Option<usize>) -> MemoryResult<ProcessMap> {
    use crate::os::windows;

    const MEM_COMMIT: u32 = 0x1000;
    const MEM_MAPPED: u32 = 0x40000;

    let handle = windows::open_process_query(pid).map_err(|e| match e {
        MemoryError::OpenFailed { reason, .. } => MemoryError::map_read_failed(pid, reason),
        other => other,
    })?;

    let mut regions = Vec::new();
    let mut truncated = false;
    let mut address = 0usize;

    // Walk the address space region by region; the query failing past the
    // last mapping is the normal termination signal.
    while let Some(mbi) = windows::virtual_query(&handle, address) {
        let base = mbi.BaseAddress as usize;
        let size = mbi.RegionSize;
        if size == 0 {
            break;
        }
        let Some(end) = base.checked_add(size) else {
            break;
        };

        if mbi.State == MEM_COMMIT {
            if max_regions.is_some_and(|cap| regions.len() >= cap) {
                truncated = true;
                break;
            }

            let protection =
                Protection::from_windows_protect(mbi.Protect).with_shared(mbi.Type == MEM_MAPPED);
            let path = windows::mapped_file_name(&handle, base);

            if let Some(region) = MemoryRegion::new(base.into(), end.into(), protection, path) {
                regions.push(region);
            }
        }

        address = end;
    }

    Ok(ProcessMap::new(regions, truncated))
}
