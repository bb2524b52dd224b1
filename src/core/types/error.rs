//! Custom error types for memprobe

use std::fmt;
use thiserror::Error;

/// Main error type for process memory operations
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Failed to open process {pid}: {reason}")]
    OpenFailed { pid: u32, reason: String },

    #[error("Failed to read memory map of process {pid}: {reason}")]
    MapReadFailed { pid: u32, reason: String },

    #[error("Partial transfer at {address}: expected {expected} bytes, moved {actual}")]
    PartialTransfer {
        address: String,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid memory address: {0}")]
    InvalidAddress(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for memory operations
pub type MemoryResult<T> = Result<T, MemoryError>;

impl MemoryError {
    /// Creates an open failed error for a process
    pub fn open_failed(pid: u32, reason: impl Into<String>) -> Self {
        MemoryError::OpenFailed {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates a map read failed error
    pub fn map_read_failed(pid: u32, reason: impl Into<String>) -> Self {
        MemoryError::MapReadFailed {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates a partial transfer error
    pub fn partial_transfer(address: impl fmt::Display, expected: usize, actual: usize) -> Self {
        MemoryError::PartialTransfer {
            address: address.to_string(),
            expected,
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_display() {
        let err = MemoryError::open_failed(1234, "permission denied");
        assert_eq!(
            err.to_string(),
            "Failed to open process 1234: permission denied"
        );

        let err = MemoryError::map_read_failed(99, "no such process");
        assert_eq!(
            err.to_string(),
            "Failed to read memory map of process 99: no such process"
        );

        let err = MemoryError::partial_transfer("0x1000", 8, 3);
        assert_eq!(
            err.to_string(),
            "Partial transfer at 0x1000: expected 8 bytes, moved 3"
        );
    }

    #[test]
    fn test_helper_methods() {
        let err = MemoryError::open_failed(42, "gone");
        match err {
            MemoryError::OpenFailed { pid, reason } => {
                assert_eq!(pid, 42);
                assert_eq!(reason, "gone");
            }
            _ => panic!("Wrong error type"),
        }

        let err = MemoryError::partial_transfer("0xABCD", 16, 0);
        match err {
            MemoryError::PartialTransfer {
                address,
                expected,
                actual,
            } => {
                assert_eq!(address, "0xABCD");
                assert_eq!(expected, 16);
                assert_eq!(actual, 0);
            }
            _ => panic!("Wrong error type"),
        }
    }

    #[test]
    fn test_from_io_error() {
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "test");
        let mem_err: MemoryError = io_err.into();
        assert!(matches!(mem_err, MemoryError::Io(_)));
    }

    #[test]
    fn test_memory_result_type() {
        fn ok_fn() -> MemoryResult<u32> {
            Ok(42)
        }

        fn err_fn() -> MemoryResult<u32> {
            Err(MemoryError::InvalidPattern("empty".to_string()))
        }

        assert_eq!(ok_fn().unwrap(), 42);
        assert!(err_fn().is_err());
    }
}
