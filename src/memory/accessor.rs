//! Bounded read/write of raw bytes through a process handle

use crate::core::types::{Address, MemoryError, MemoryResult};
use crate::process::ProcessHandle;
use std::mem;

/// Memory accessor for a target process.
///
/// The byte-level operations follow the short-transfer contract of
/// [`ProcessHandle`]: they report how many bytes actually moved and never
/// signal an error for a short or empty transfer. The typed convenience
/// layer on top does treat a short transfer as an error, because half a
/// value is not a value.
pub struct MemoryAccessor<'a> {
    handle: &'a ProcessHandle,
}

impl<'a> MemoryAccessor<'a> {
    /// Create a new accessor borrowing the handle
    pub fn new(handle: &'a ProcessHandle) -> Self {
        MemoryAccessor { handle }
    }

    /// Read into a caller-supplied buffer, returning the bytes transferred
    pub fn read_into(&self, address: Address, buf: &mut [u8]) -> usize {
        self.handle.read_memory(address, buf)
    }

    /// Read up to `len` bytes, returning whatever was transferable.
    ///
    /// The returned vector is truncated to the transferred count, so a
    /// partially readable range yields a short vector and an unreadable
    /// one yields an empty vector.
    pub fn read_bytes(&self, address: Address, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        let n = self.handle.read_memory(address, &mut buf);
        buf.truncate(n);
        buf
    }

    /// Write bytes, returning how many actually landed
    pub fn write_bytes(&self, address: Address, data: &[u8]) -> usize {
        self.handle.write_memory(address, data)
    }

    /// Read one plain-data value from the target.
    ///
    /// Fails with `PartialTransfer` if fewer than `size_of::<T>()` bytes
    /// could be read.
    pub fn read<T: Copy>(&self, address: Address) -> MemoryResult<T> {
        let size = mem::size_of::<T>();
        let mut buf = vec![0u8; size];

        let n = self.handle.read_memory(address, &mut buf);
        if n < size {
            return Err(MemoryError::partial_transfer(address, size, n));
        }

        // The buffer holds exactly size_of::<T>() initialized bytes and
        // may be unaligned for T.
        Ok(unsafe { std::ptr::read_unaligned(buf.as_ptr() as *const T) })
    }

    /// Write one plain-data value into the target.
    ///
    /// Fails with `PartialTransfer` if the value did not land whole.
    pub fn write<T: Copy>(&self, address: Address, value: T) -> MemoryResult<()> {
        let size = mem::size_of::<T>();
        let data = unsafe { std::slice::from_raw_parts(&value as *const T as *const u8, size) };

        let n = self.handle.write_memory(address, data);
        if n < size {
            return Err(MemoryError::partial_transfer(address, size, n));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn self_handle() -> ProcessHandle {
        ProcessHandle::open(std::process::id()).expect("failed to open current process")
    }

    #[test]
    fn test_read_bytes_round_trip() {
        let handle = self_handle();
        let accessor = MemoryAccessor::new(&handle);

        let data = *b"memprobe";
        let addr = Address::new(data.as_ptr() as usize);

        assert_eq!(accessor.read_bytes(addr, 8), b"memprobe");
    }

    #[test]
    fn test_read_bytes_unmapped_is_empty() {
        let handle = self_handle();
        let accessor = MemoryAccessor::new(&handle);
        assert!(accessor.read_bytes(Address::null(), 64).is_empty());
    }

    #[test]
    fn test_typed_round_trip() {
        let handle = self_handle();
        let accessor = MemoryAccessor::new(&handle);

        let mut slot: u64 = 0;
        let addr = Address::new(&mut slot as *mut u64 as usize);

        accessor.write(addr, 0xFEEDFACE_u32 as u64).unwrap();
        assert_eq!(accessor.read::<u64>(addr).unwrap(), 0xFEEDFACE);
    }

    #[test]
    fn test_typed_read_unmapped_is_partial_transfer() {
        let handle = self_handle();
        let accessor = MemoryAccessor::new(&handle);

        let result = accessor.read::<u32>(Address::null());
        assert!(matches!(
            result,
            Err(MemoryError::PartialTransfer { expected: 4, actual: 0, .. })
        ));
    }

    #[test]
    fn test_typed_write_unmapped_is_partial_transfer() {
        let handle = self_handle();
        let accessor = MemoryAccessor::new(&handle);

        let result = accessor.write(Address::null(), 0xABu8);
        assert!(matches!(result, Err(MemoryError::PartialTransfer { .. })));
    }

    #[test]
    fn test_write_bytes_then_read_into() {
        let handle = self_handle();
        let accessor = MemoryAccessor::new(&handle);

        let mut target = [0u8; 4];
        let addr = Address::new(target.as_mut_ptr() as usize);

        assert_eq!(accessor.write_bytes(addr, &[1, 2, 3, 4]), 4);

        let mut readback = [0u8; 4];
        assert_eq!(accessor.read_into(addr, &mut readback), 4);
        assert_eq!(readback, [1, 2, 3, 4]);
    }
}
