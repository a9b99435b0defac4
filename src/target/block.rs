//! Block device implementation
//!
//! Opens a raw block device (e.g., /dev/sda, /dev/nvme0n1) read-write with
//! O_DIRECT, O_SYNC and O_LARGEFILE. The device size is discovered by seeking to
//! the end, after which the offset is returned to the start.
//!
//! # Requirements
//!
//! - Root or appropriate permissions to open the device read-write
//! - Transfer buffers aligned to the logical block size (see `util::buffer`)

use super::{Device, OpenFlags};
use crate::Result;
use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Open block device
///
/// The file handle is owned exclusively and closed when the device is dropped.
#[derive(Debug)]
pub struct BlockDevice {
    /// Path to the block device (e.g., /dev/sda)
    path: PathBuf,

    file: File,

    /// Device size in bytes (probed at open)
    device_size: u64,
}

impl BlockDevice {
    /// Open a device and probe its size
    ///
    /// # Errors
    ///
    /// Returns an error naming the device path if open(2) fails or if either
    /// repositioning seek (to end, then back to start) fails.
    pub fn open(path: &Path, flags: OpenFlags) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.read(true).write(true);
        options.custom_flags(flags.custom_flags());

        let mut file = options
            .open(path)
            .with_context(|| format!("Error opening block device \"{}\"", path.display()))?;

        let device_size = file.seek(SeekFrom::End(0)).with_context(|| {
            format!(
                "Error repositioning offset to eof: path={}",
                path.display()
            )
        })?;

        file.seek(SeekFrom::Start(0)).with_context(|| {
            format!(
                "Error repositioning offset to start: path={}",
                path.display()
            )
        })?;

        tracing::debug!(
            path = %path.display(),
            size = device_size,
            direct = flags.direct,
            sync = flags.sync,
            "device opened"
        );

        Ok(Self {
            path: path.to_path_buf(),
            file,
            device_size,
        })
    }

    /// Device size in bytes
    pub fn size(&self) -> u64 {
        self.device_size
    }
}

impl Device for BlockDevice {
    fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(0)).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Raw block devices need root; regular files opened buffered exercise the same paths

    #[test]
    fn test_open_probes_size_and_rewinds() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("device.img");
        std::fs::write(&path, vec![7u8; 8192]).unwrap();

        let mut device = BlockDevice::open(&path, OpenFlags::buffered()).unwrap();
        assert_eq!(device.size(), 8192);
        assert_eq!(device.path(), path.as_path());

        // Offset must be back at the start after probing
        let mut buf = [0u8; 16];
        assert_eq!(device.read(&mut buf).unwrap(), 16);
        assert_eq!(buf, [7u8; 16]);
    }

    #[test]
    fn test_open_missing_device_names_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing");

        let err = BlockDevice::open(&path, OpenFlags::default()).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Error opening block device"));
        assert!(message.contains("missing"));
    }

    #[test]
    fn test_sequential_offset_and_rewind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("device.img");
        let data: Vec<u8> = (0..64u8).collect();
        std::fs::write(&path, &data).unwrap();

        let mut device = BlockDevice::open(&path, OpenFlags::buffered()).unwrap();
        let mut buf = [0u8; 32];

        device.read(&mut buf).unwrap();
        assert_eq!(buf[0], 0);
        device.read(&mut buf).unwrap();
        assert_eq!(buf[0], 32);

        // End of device
        assert_eq!(device.read(&mut buf).unwrap(), 0);

        device.rewind().unwrap();
        device.read(&mut buf).unwrap();
        assert_eq!(buf[0], 0);
    }

    #[test]
    fn test_write_advances_offset() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("device.img");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let mut device = BlockDevice::open(&path, OpenFlags::buffered()).unwrap();
        assert_eq!(device.write(&[1u8; 32]).unwrap(), 32);
        assert_eq!(device.write(&[2u8; 32]).unwrap(), 32);
        drop(device);

        let written = std::fs::read(&path).unwrap();
        assert_eq!(&written[..32], &[1u8; 32]);
        assert_eq!(&written[32..], &[2u8; 32]);
    }
}
