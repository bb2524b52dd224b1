//! Core module containing the fundamental types for memprobe
//!
//! Provides the building blocks used throughout the crate: remote address
//! handling, the region model and error types.

pub mod types;

// Re-export commonly used types for convenience
pub use types::{
    Address, MemoryError, MemoryRegion, MemoryResult, ProcessId, ProcessMap, Protection,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
