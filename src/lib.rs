//! memprobe: inspect and mutate the memory of another running process.
//!
//! The crate exposes four primitive operations behind one cross-platform
//! contract:
//!
//! - **open** a [`ProcessHandle`] to a target process
//! - **enumerate** its memory regions into a [`ProcessMap`] snapshot
//!   ([`read_maps`])
//! - **read/write** raw byte ranges at absolute addresses
//!   ([`MemoryAccessor`])
//! - **scan** readable regions for a literal byte pattern
//!   ([`PatternScanner`])
//!
//! On Linux these ride on the `/proc/<pid>/{mem,maps}` pseudo-files, on
//! Windows on the `OpenProcess`/`VirtualQueryEx`/`ReadProcessMemory`
//! family. Callers only ever see the platform-neutral surface.
//!
//! Everything is synchronous and single-owner: one `ProcessHandle` per
//! logical session, no internal locking, no cancellation. Reads and
//! writes follow a best-effort short-transfer contract — check the
//! returned counts, never assume a full transfer — and every region
//! snapshot can be stale the instant after it is taken, since the target
//! keeps running.

pub mod config;
pub mod core;
pub mod memory;
pub mod os;
pub mod process;

// Re-export the public surface
pub use crate::config::{load_config, Config, ConfigError, ConfigResult};
pub use crate::core::types::{
    Address, MemoryError, MemoryRegion, MemoryResult, ProcessId, ProcessMap, Protection,
};
pub use crate::memory::{
    parse_hex_pattern, Matches, MemoryAccessor, MemorySource, PatternScanner, ScanOptions,
};
pub use crate::process::{read_maps, read_maps_capped, ProcessHandle};
