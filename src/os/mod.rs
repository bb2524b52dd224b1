//! Platform backends
//!
//! Thin safe wrappers around the OS facilities the rest of the crate is
//! built on: the `/proc/<pid>` pseudo-files on Linux and the
//! query/copy process APIs on Windows. Everything above this module is
//! platform-neutral.

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(windows)]
pub mod windows;

#[cfg(not(any(target_os = "linux", windows)))]
compile_error!("memprobe supports Linux and Windows targets");
