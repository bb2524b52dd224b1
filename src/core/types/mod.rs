//! Core type definitions for memprobe
//!
//! Fundamental types shared across the crate: the remote address wrapper,
//! the platform-neutral region model and the error taxonomy.

mod address;
mod error;
mod region;

// Re-export all public types
pub use address::Address;
pub use error::{MemoryError, MemoryResult};
pub use region::{MemoryRegion, ProcessMap, Protection};

// Common type aliases
pub type ProcessId = u32;
pub type Size = usize;
