//! Page-aligned IO buffer for O_DIRECT operations
//!
//! Unbuffered IO requires the user buffer to be aligned to the logical block size
//! of the device. Allocating on a page boundary satisfies every device in practice,
//! so the run allocates exactly one buffer this way and reuses it for every operation.

use crate::Result;
use anyhow::Context;
use rand::rngs::OsRng;
use rand::RngCore;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ptr;

/// Fallback when sysconf cannot report a page size
const DEFAULT_PAGE_SIZE: usize = 4096;

/// Fill pattern for the write buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillPattern {
    /// All zeros
    Zeros,
    /// Bytes drawn from the operating system entropy source
    Random,
}

/// Query the system page size
pub fn page_size() -> usize {
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        DEFAULT_PAGE_SIZE
    }
}

/// Memory-aligned buffer suitable for O_DIRECT operations
///
/// The allocation is zero-initialized, owned exclusively and released on drop.
pub struct AlignedBuffer {
    ptr: *mut u8,
    size: usize,
    alignment: usize,
    layout: Layout,
}

impl AlignedBuffer {
    /// Allocate a zeroed buffer of `size` bytes aligned to `alignment`
    ///
    /// # Errors
    ///
    /// Returns an error if `alignment` is not a power of two, if `size` is zero,
    /// or if the allocator cannot satisfy the request.
    pub fn new(size: usize, alignment: usize) -> Result<Self> {
        if !alignment.is_power_of_two() {
            anyhow::bail!("Alignment must be a power of 2, got {}", alignment);
        }
        if size == 0 {
            anyhow::bail!("Buffer size must be greater than 0");
        }

        let layout = Layout::from_size_align(size, alignment).with_context(|| {
            format!("Invalid buffer layout: size={}, alignment={}", size, alignment)
        })?;

        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            anyhow::bail!(
                "Failed to allocate aligned buffer: {} bytes aligned to {}",
                size,
                alignment
            );
        }

        Ok(AlignedBuffer {
            ptr,
            size,
            alignment,
            layout,
        })
    }

    /// Allocate a zeroed buffer aligned to the system page size
    pub fn page_aligned(size: usize) -> Result<Self> {
        Self::new(size, page_size())
    }

    /// Get the buffer as a slice
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr, self.size) }
    }

    /// Get the buffer as a mutable slice
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.size) }
    }

    /// Get the size of the buffer in bytes
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the alignment of the buffer
    #[inline(always)]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Verify that the buffer is properly aligned
    #[inline(always)]
    pub fn is_aligned(&self) -> bool {
        (self.ptr as usize) % self.alignment == 0
    }

    /// Fill the buffer with a pattern, drawing random bytes from the OS entropy source
    ///
    /// Returns the pattern that was actually written (see [`fill_with`](Self::fill_with)).
    pub fn fill(&mut self, pattern: FillPattern) -> FillPattern {
        self.fill_with(&mut OsRng, pattern)
    }

    /// Fill the buffer with a pattern, drawing random bytes from `rng`
    ///
    /// If `rng` fails, the buffer is zero-filled instead and a warning is logged.
    pub fn fill_with<R: RngCore + ?Sized>(
        &mut self,
        rng: &mut R,
        pattern: FillPattern,
    ) -> FillPattern {
        match pattern {
            FillPattern::Zeros => {
                self.zero();
                FillPattern::Zeros
            }
            FillPattern::Random => match rng.try_fill_bytes(self.as_mut_slice()) {
                Ok(()) => FillPattern::Random,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "entropy source unavailable, writing zeros instead of random data"
                    );
                    self.zero();
                    FillPattern::Zeros
                }
            },
        }
    }

    /// Check whether every byte of the buffer is zero
    pub fn is_zeroed(&self) -> bool {
        self.as_slice().iter().all(|&b| b == 0)
    }

    fn zero(&mut self) {
        unsafe { ptr::write_bytes(self.ptr, 0, self.size) };
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        unsafe {
            dealloc(self.ptr, self.layout);
        }
    }
}

// AlignedBuffer is Send because it owns its memory
unsafe impl Send for AlignedBuffer {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    #[test]
    fn test_page_size_is_power_of_two() {
        let size = page_size();
        assert!(size >= 512);
        assert!(size.is_power_of_two());
    }

    #[test]
    fn test_page_aligned_buffer() {
        let buffer = AlignedBuffer::page_aligned(4096).unwrap();
        assert_eq!(buffer.size(), 4096);
        assert_eq!(buffer.alignment(), page_size());
        assert!(buffer.is_aligned());
    }

    #[test]
    fn test_unaligned_size_still_page_aligned() {
        // Transfer size does not have to be a page multiple for the allocation itself
        let buffer = AlignedBuffer::page_aligned(1000).unwrap();
        assert_eq!(buffer.size(), 1000);
        assert!(buffer.is_aligned());
    }

    #[test]
    fn test_invalid_alignment() {
        assert!(AlignedBuffer::new(4096, 513).is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(AlignedBuffer::new(0, 4096).is_err());
    }

    #[test]
    fn test_new_buffer_is_zeroed() {
        let buffer = AlignedBuffer::new(8192, 4096).unwrap();
        assert!(buffer.is_zeroed());
    }

    #[test]
    fn test_fill_zeros() {
        let mut buffer = AlignedBuffer::new(4096, 512).unwrap();
        buffer.as_mut_slice()[17] = 0xAB;
        assert_eq!(buffer.fill(FillPattern::Zeros), FillPattern::Zeros);
        assert!(buffer.is_zeroed());
    }

    #[test]
    fn test_fill_random() {
        let mut buffer = AlignedBuffer::new(4096, 512).unwrap();
        let mut rng = StepRng::new(1, 1);
        assert_eq!(buffer.fill_with(&mut rng, FillPattern::Random), FillPattern::Random);
        assert!(!buffer.is_zeroed());
    }

    #[test]
    fn test_fill_random_falls_back_to_zeros() {
        let mut buffer = AlignedBuffer::new(4096, 512).unwrap();
        buffer.as_mut_slice()[100] = 0x5A;

        let used = buffer.fill_with(&mut BrokenRng, FillPattern::Random);
        assert_eq!(used, FillPattern::Zeros);
        assert!(buffer.is_zeroed());
    }

    #[test]
    fn test_fill_zeros_never_touches_rng() {
        let mut buffer = AlignedBuffer::new(4096, 512).unwrap();
        assert_eq!(buffer.fill_with(&mut BrokenRng, FillPattern::Zeros), FillPattern::Zeros);
        assert!(buffer.is_zeroed());
    }

    /// Entropy source that always fails
    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            Err(rand::Error::new(std::io::Error::from_raw_os_error(libc::ENOSYS)))
        }
    }
}
