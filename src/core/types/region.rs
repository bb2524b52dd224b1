//! Platform-neutral memory region model

use super::address::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Normalized capability view of a region's page protection.
///
/// On POSIX systems protection arrives as a short string such as `r-xp`,
/// on Windows as a `PAGE_*` bitmask. Both collapse into this one shape so
/// callers never branch on platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Protection {
    pub read: bool,
    pub write: bool,
    pub exec: bool,
    /// Shared mapping (`s` in procfs, `MEM_MAPPED` backed pages on Windows)
    pub shared: bool,
}

impl Protection {
    /// Parses a procfs permission string such as `"r-xp"` or `"rw-s"`.
    ///
    /// Returns `None` if the string is shorter than the four permission
    /// characters procfs guarantees.
    pub fn from_procfs(perms: &str) -> Option<Self> {
        let mut chars = perms.chars();
        let read = chars.next()? == 'r';
        let write = chars.next()? == 'w';
        let exec = chars.next()? == 'x';
        let shared = chars.next()? == 's';

        Some(Protection {
            read,
            write,
            exec,
            shared,
        })
    }

    /// Normalizes a Windows `PAGE_*` protection constant.
    ///
    /// `shared` is not encoded in the protection word on Windows; the map
    /// reader fills it in from the region type.
    pub fn from_windows_protect(protect: u32) -> Self {
        const PAGE_NOACCESS: u32 = 0x01;
        const PAGE_GUARD: u32 = 0x100;
        const PAGE_READWRITE: u32 = 0x04;
        const PAGE_WRITECOPY: u32 = 0x08;
        const PAGE_EXECUTE: u32 = 0x10;
        const PAGE_EXECUTE_READ: u32 = 0x20;
        const PAGE_EXECUTE_READWRITE: u32 = 0x40;
        const PAGE_EXECUTE_WRITECOPY: u32 = 0x80;

        let guarded = protect & PAGE_GUARD != 0;
        let base = protect & 0xFF;

        Protection {
            read: !guarded && base != PAGE_NOACCESS && base != PAGE_EXECUTE,
            write: base
                & (PAGE_READWRITE
                    | PAGE_WRITECOPY
                    | PAGE_EXECUTE_READWRITE
                    | PAGE_EXECUTE_WRITECOPY)
                != 0,
            exec: base
                & (PAGE_EXECUTE
                    | PAGE_EXECUTE_READ
                    | PAGE_EXECUTE_READWRITE
                    | PAGE_EXECUTE_WRITECOPY)
                != 0,
            shared: false,
        }
    }

    /// Marks the protection as belonging to a shared mapping
    pub fn with_shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }
}

impl fmt::Display for Protection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}{}",
            if self.read { 'r' } else { '-' },
            if self.write { 'w' } else { '-' },
            if self.exec { 'x' } else { '-' },
            if self.shared { 's' } else { 'p' },
        )
    }
}

/// One contiguous mapped range of a target process's address space.
///
/// Regions are created in bulk by [`read_maps`](crate::process::read_maps)
/// and immutable afterwards. A region describes a point-in-time snapshot:
/// the target may remap or unmap at any moment, so later accesses through
/// these addresses can fail transiently without the snapshot being wrong.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    start: Address,
    end: Address,
    protection: Protection,
    path: Option<PathBuf>,
}

impl MemoryRegion {
    /// Creates a region. `start` must be strictly below `end`.
    pub fn new(
        start: Address,
        end: Address,
        protection: Protection,
        path: Option<PathBuf>,
    ) -> Option<Self> {
        if start >= end {
            return None;
        }

        Some(MemoryRegion {
            start,
            end,
            protection,
            path,
        })
    }

    /// Start address of the region (inclusive)
    pub fn start(&self) -> Address {
        self.start
    }

    /// End address of the region (exclusive)
    pub fn end(&self) -> Address {
        self.end
    }

    /// Size of the region in bytes
    pub fn size(&self) -> usize {
        self.end.as_usize() - self.start.as_usize()
    }

    /// Normalized page protection
    pub fn protection(&self) -> Protection {
        self.protection
    }

    /// Backing file or module path; `None` for anonymous mappings
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if an address falls within this region
    pub fn contains(&self, address: Address) -> bool {
        address >= self.start && address < self.end
    }

    pub fn is_readable(&self) -> bool {
        self.protection.read
    }

    pub fn is_writable(&self) -> bool {
        self.protection.write
    }

    pub fn is_executable(&self) -> bool {
        self.protection.exec
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} {}", self.start, self.end, self.protection)?;
        if let Some(path) = self.path() {
            write!(f, " {}", path.display())?;
        }
        Ok(())
    }
}

/// One enumeration snapshot of a target process's memory layout.
///
/// Regions are ordered as the OS returned them, which is ascending start
/// address on both platform families. If an enumeration cap was configured
/// and reached, `truncated` is set instead of silently dropping regions.
#[derive(Debug, Clone, Default)]
pub struct ProcessMap {
    regions: Vec<MemoryRegion>,
    truncated: bool,
}

impl ProcessMap {
    pub fn new(regions: Vec<MemoryRegion>, truncated: bool) -> Self {
        ProcessMap { regions, truncated }
    }

    /// All regions in enumeration order
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MemoryRegion> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Whether enumeration stopped early because a region cap was reached
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Find the region containing an address, if any
    pub fn region_containing(&self, address: Address) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.contains(address))
    }

    /// Iterator over regions whose protection includes read
    pub fn readable(&self) -> impl Iterator<Item = &MemoryRegion> {
        self.regions.iter().filter(|r| r.is_readable())
    }
}

impl<'a> IntoIterator for &'a ProcessMap {
    type Item = &'a MemoryRegion;
    type IntoIter = std::slice::Iter<'a, MemoryRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.iter()
    }
}

impl IntoIterator for ProcessMap {
    type Item = MemoryRegion;
    type IntoIter = std::vec::IntoIter<MemoryRegion>;

    fn into_iter(self) -> Self::IntoIter {
        self.regions.into_iter()
    }
}
