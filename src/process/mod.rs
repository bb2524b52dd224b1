//! Target process access
//!
//! Safe abstractions for addressing another process's memory: the RAII
//! [`ProcessHandle`] and the map reader producing [`ProcessMap`] snapshots.
//!
//! [`ProcessMap`]: crate::core::types::ProcessMap

pub mod handle;
pub mod maps;

pub use handle::ProcessHandle;
pub use maps::{parse_maps_line, read_maps, read_maps_capped};
