//! Windows kernel-API backend
//!
//! Safe wrappers around the process query/copy calls, plus an RAII owner
//! for the raw `HANDLE`.

use crate::core::types::{MemoryError, MemoryResult, ProcessId};
use std::mem;
use std::path::PathBuf;
use std::ptr;
use winapi::shared::minwindef::{FALSE, FILETIME, LPVOID, MAX_PATH};
use winapi::um::handleapi::CloseHandle;
use winapi::um::memoryapi::{ReadProcessMemory, VirtualQueryEx, WriteProcessMemory};
use winapi::um::processthreadsapi::{GetProcessTimes, OpenProcess};
use winapi::um::psapi::GetMappedFileNameA;
use winapi::um::winnt::{HANDLE, MEMORY_BASIC_INFORMATION};

const PROCESS_QUERY_INFORMATION: u32 = 0x0400;
const PROCESS_VM_READ: u32 = 0x0010;
const PROCESS_VM_WRITE: u32 = 0x0020;
const PROCESS_VM_OPERATION: u32 = 0x0008;

/// Owned process handle with automatic cleanup.
pub struct Handle {
    raw: HANDLE,
}

impl Handle {
    /// Raw handle for FFI calls. Valid as long as `self` is alive.
    pub fn raw(&self) -> HANDLE {
        self.raw
    }
}

impl Drop for Handle {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            // Close failures (e.g. an already-invalidated handle) are
            // not actionable here.
            let ok = unsafe { CloseHandle(self.raw) };
            if ok == FALSE {
                tracing::debug!("CloseHandle failed for process handle");
            }
            self.raw = ptr::null_mut();
        }
    }
}

// HANDLEs are process-local kernel object references
unsafe impl Send for Handle {}

/// Opens a process with query + read + write capability.
pub fn open_process(pid: ProcessId) -> MemoryResult<Handle> {
    let access =
        PROCESS_QUERY_INFORMATION | PROCESS_VM_READ | PROCESS_VM_WRITE | PROCESS_VM_OPERATION;
    let raw = unsafe { OpenProcess(access, FALSE, pid) };
    if raw.is_null() {
        Err(MemoryError::open_failed(
            pid,
            std::io::Error::last_os_error().to_string(),
        ))
    } else {
        Ok(Handle { raw })
    }
}

/// Opens a process with query + read capability only, for map enumeration.
pub fn open_process_query(pid: ProcessId) -> MemoryResult<Handle> {
    let raw = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, FALSE, pid) };
    if raw.is_null() {
        Err(MemoryError::open_failed(
            pid,
            std::io::Error::last_os_error().to_string(),
        ))
    } else {
        Ok(Handle { raw })
    }
}

/// Copies up to `buf.len()` bytes out of the target at `address`.
///
/// Returns the bytes transferred; a failed or partially failed copy
/// reports whatever the kernel moved before faulting, which may be 0.
pub fn read_process_memory(handle: &Handle, address: usize, buf: &mut [u8]) -> usize {
    let mut bytes_read = 0;
    unsafe {
        ReadProcessMemory(
            handle.raw(),
            address as LPVOID,
            buf.as_mut_ptr() as LPVOID,
            buf.len(),
            &mut bytes_read,
        );
    }
    bytes_read
}

/// Copies `data` into the target at `address`, same short contract as reads.
pub fn write_process_memory(handle: &Handle, address: usize, data: &[u8]) -> usize {
    let mut bytes_written = 0;
    unsafe {
        WriteProcessMemory(
            handle.raw(),
            address as LPVOID,
            data.as_ptr() as LPVOID,
            data.len(),
            &mut bytes_written,
        );
    }
    bytes_written
}

/// Queries the region containing or following `address`.
///
/// `None` means the query failed, which past the last mapping is the
/// normal end-of-address-space signal.
pub fn virtual_query(handle: &Handle, address: usize) -> Option<MEMORY_BASIC_INFORMATION> {
    let mut mbi: MEMORY_BASIC_INFORMATION = unsafe { mem::zeroed() };
    let len = unsafe {
        VirtualQueryEx(
            handle.raw(),
            address as LPVOID,
            &mut mbi,
            mem::size_of::<MEMORY_BASIC_INFORMATION>(),
        )
    };
    if len == mem::size_of::<MEMORY_BASIC_INFORMATION>() {
        Some(mbi)
    } else {
        None
    }
}

/// Best-effort resolution of the file backing a mapped region.
pub fn mapped_file_name(handle: &Handle, base_address: usize) -> Option<PathBuf> {
    let mut buf = [0u8; MAX_PATH as usize];
    let len = unsafe {
        GetMappedFileNameA(
            handle.raw(),
            base_address as LPVOID,
            buf.as_mut_ptr() as *mut i8,
            buf.len() as u32,
        )
    };
    if len == 0 {
        return None;
    }
    let name = String::from_utf8_lossy(&buf[..len as usize]).into_owned();
    Some(PathBuf::from(name))
}

/// Best-effort creation time of the process, as a FILETIME tick count.
///
/// Used to detect pid reuse, mirroring the procfs start-time check.
pub fn process_creation_time(handle: &Handle) -> Option<u64> {
    let mut creation: FILETIME = unsafe { mem::zeroed() };
    let mut exit: FILETIME = unsafe { mem::zeroed() };
    let mut kernel: FILETIME = unsafe { mem::zeroed() };
    let mut user: FILETIME = unsafe { mem::zeroed() };

    let ok = unsafe {
        GetProcessTimes(
            handle.raw(),
            &mut creation,
            &mut exit,
            &mut kernel,
            &mut user,
        )
    };
    if ok == FALSE {
        return None;
    }
    Some(((creation.dwHighDateTime as u64) << 32) | creation.dwLowDateTime as u64)
}
