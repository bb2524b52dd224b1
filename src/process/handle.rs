//! Process handle with RAII semantics

use crate::core::types::{Address, MemoryResult, ProcessId};
use crate::os;
use tracing::debug;

/// Exclusive owner of the OS resource used to address a target process's
/// memory: a read-write descriptor on `/proc/<pid>/mem` on Linux, a kernel
/// handle with query/read/write access on Windows.
///
/// The resource is released when the handle is dropped; release is
/// idempotent and never double-frees. Use-after-close cannot be expressed:
/// dropping the handle consumes it.
///
/// The pid is captured at open time and not re-validated per operation. If
/// the target exits and the OS reuses the pid, subsequent operations
/// silently address the new process — an inherent race in the pid-based
/// model. [`ProcessHandle::verify_identity`] lets callers re-check the
/// process generation when they care.
pub struct ProcessHandle {
    pid: ProcessId,
    #[cfg(target_os = "linux")]
    mem: std::fs::File,
    #[cfg(windows)]
    handle: os::windows::Handle,
    start_time: Option<u64>,
}

impl ProcessHandle {
    /// Opens a handle to the target process.
    ///
    /// Fails with [`MemoryError::OpenFailed`](crate::MemoryError::OpenFailed)
    /// if the target does not exist, the caller lacks privilege over it, or
    /// the OS resource limit is exhausted. These are not transient, so
    /// there is no retry.
    pub fn open(pid: ProcessId) -> MemoryResult<Self> {
        #[cfg(target_os = "linux")]
        {
            let mem = os::linux::open_mem(pid)?;
            let start_time = os::linux::process_start_time(pid);
            debug!(pid, ?start_time, "opened process memory file");
            Ok(ProcessHandle {
                pid,
                mem,
                start_time,
            })
        }

        #[cfg(windows)]
        {
            let handle = os::windows::open_process(pid)?;
            let start_time = os::windows::process_creation_time(&handle);
            debug!(pid, ?start_time, "opened process handle");
            Ok(ProcessHandle {
                pid,
                handle,
                start_time,
            })
        }
    }

    /// The pid this handle was opened for
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Reads up to `buf.len()` bytes from the target at `address`.
    ///
    /// Best-effort short-read contract: returns the number of bytes
    /// actually transferred, which may be anything from 0 (unmapped or
    /// unreadable range) to `buf.len()`. Callers must check the count,
    /// never assume a full transfer. A single unbuffered OS copy; no
    /// retry, no atomicity across page boundaries.
    pub fn read_memory(&self, address: Address, buf: &mut [u8]) -> usize {
        #[cfg(target_os = "linux")]
        {
            os::linux::read_mem(&self.mem, address.as_usize(), buf)
        }

        #[cfg(windows)]
        {
            os::windows::read_process_memory(&self.handle, address.as_usize(), buf)
        }
    }

    /// Writes `data` to the target at `address`, returning the bytes moved.
    ///
    /// Same short-transfer contract as [`read_memory`](Self::read_memory):
    /// an unmapped destination yields 0, a partially mapped range yields a
    /// short count. On Linux the kernel forces writes through the mem
    /// file, so a read-only mapping in the target is not a dependable
    /// write barrier; on Windows a read-only page makes the copy fail.
    pub fn write_memory(&self, address: Address, data: &[u8]) -> usize {
        #[cfg(target_os = "linux")]
        {
            os::linux::write_mem(&self.mem, address.as_usize(), data)
        }

        #[cfg(windows)]
        {
            os::windows::write_process_memory(&self.handle, address.as_usize(), data)
        }
    }

    /// Re-checks that the pid still names the process this handle was
    /// opened for, by comparing the target's start time against the one
    /// captured at open.
    ///
    /// Returns false if the process is gone or the pid now belongs to a
    /// different process generation. Returns true when the identity
    /// matches, and also when no start time could be captured at open
    /// (nothing to compare against).
    pub fn verify_identity(&self) -> bool {
        let Some(opened) = self.start_time else {
            return true;
        };

        #[cfg(target_os = "linux")]
        let current = os::linux::process_start_time(self.pid);

        #[cfg(windows)]
        let current = os::windows::process_creation_time(&self.handle);

        current == Some(opened)
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        debug!(pid = self.pid, "closing process handle");
        // The underlying descriptor/handle is released by its own Drop
    }
}

impl std::fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pid", &self.pid)
            .field("start_time", &self.start_time)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MemoryError;

    #[test]
    fn test_open_missing_process() {
        let result = ProcessHandle::open(0);
        assert!(matches!(
            result,
            Err(MemoryError::OpenFailed { pid: 0, .. })
        ));
    }

    #[test]
    fn test_open_self() {
        let handle = ProcessHandle::open(std::process::id()).unwrap();
        assert_eq!(handle.pid(), std::process::id());
    }

    #[test]
    fn test_open_close_does_not_leak() {
        // Repeated open/drop must not exhaust descriptors or handles
        for _ in 0..256 {
            let handle = ProcessHandle::open(std::process::id()).unwrap();
            drop(handle);
        }
    }

    #[test]
    fn test_read_own_memory() {
        let handle = ProcessHandle::open(std::process::id()).unwrap();

        let value: u32 = 0xCAFEBABE;
        let addr = Address::new(&value as *const u32 as usize);

        let mut buf = [0u8; 4];
        assert_eq!(handle.read_memory(addr, &mut buf), 4);
        assert_eq!(u32::from_le_bytes(buf), value);
    }

    #[test]
    fn test_short_read_on_unmapped() {
        let handle = ProcessHandle::open(std::process::id()).unwrap();
        let mut buf = [0u8; 32];
        assert_eq!(handle.read_memory(Address::null(), &mut buf), 0);
    }

    #[test]
    fn test_write_round_trip() {
        let handle = ProcessHandle::open(std::process::id()).unwrap();

        let mut target = [0u8; 4];
        let addr = Address::new(target.as_mut_ptr() as usize);

        assert_eq!(handle.write_memory(addr, &[0xDE, 0xAD, 0xBE, 0xEF]), 4);

        let mut readback = [0u8; 4];
        assert_eq!(handle.read_memory(addr, &mut readback), 4);
        assert_eq!(readback, [0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn test_write_unmapped_is_zero() {
        let handle = ProcessHandle::open(std::process::id()).unwrap();
        assert_eq!(handle.write_memory(Address::null(), b"AB"), 0);
    }

    #[test]
    fn test_verify_identity_self() {
        let handle = ProcessHandle::open(std::process::id()).unwrap();
        assert!(handle.verify_identity());
    }
}
