//! Device abstraction
//!
//! A device is the single destination of every IO operation in a run. The
//! `Device` trait exposes exactly the three primitives the IO driver needs:
//! one read, one write, and a rewind to the start of the device. Each call maps
//! to a single system call on the current file offset.
//!
//! # Example
//!
//! ```no_run
//! use blklat::target::{Device, OpenFlags};
//! use blklat::target::block::BlockDevice;
//! use std::path::Path;
//!
//! // Note: Requires permission to open the device read-write
//! let mut device = BlockDevice::open(Path::new("/dev/sdb"), OpenFlags::default())?;
//! println!("{} bytes", device.size());
//! device.rewind()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::io;
use std::path::Path;

/// Device trait for IO targets
///
/// Implementations operate on an implicit file offset that advances with each
/// successful transfer, matching sequential access on a raw block device.
pub trait Device {
    /// Path the device was opened from (used in error context)
    fn path(&self) -> &Path;

    /// Issue one read into `buf` at the current offset
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Issue one write from `buf` at the current offset
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Reposition the offset to the start of the device
    fn rewind(&mut self) -> io::Result<()>;
}

/// Flags used when opening a device
///
/// The defaults are the mode a latency run requires: unbuffered and synchronized.
/// Tests turn both off to run against regular files on filesystems without
/// O_DIRECT support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags {
    /// Use O_DIRECT (bypass page cache)
    pub direct: bool,

    /// Use O_SYNC (synchronous writes)
    pub sync: bool,
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self {
            direct: true,
            sync: true,
        }
    }
}

impl OpenFlags {
    /// Flags for ordinary buffered access
    pub fn buffered() -> Self {
        Self {
            direct: false,
            sync: false,
        }
    }

    /// Custom open(2) flags in addition to O_RDWR
    pub fn custom_flags(&self) -> libc::c_int {
        let mut flags = libc::O_LARGEFILE;
        if self.direct {
            flags |= libc::O_DIRECT;
        }
        if self.sync {
            flags |= libc::O_SYNC;
        }
        flags
    }
}

pub mod block;
pub mod mock;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags_are_direct_and_sync() {
        let flags = OpenFlags::default();
        assert!(flags.direct);
        assert!(flags.sync);

        let custom = flags.custom_flags();
        assert_eq!(custom & libc::O_DIRECT, libc::O_DIRECT);
        assert_eq!(custom & libc::O_SYNC, libc::O_SYNC);
    }

    #[test]
    fn test_buffered_flags() {
        let custom = OpenFlags::buffered().custom_flags();
        assert_eq!(custom & libc::O_DIRECT, 0);
        assert_eq!(custom, libc::O_LARGEFILE);
    }
}
