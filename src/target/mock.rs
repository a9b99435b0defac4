//! Mock device for testing
//!
//! Simulates device results without touching any real storage, making driver and
//! main-loop tests fast and deterministic. Each operation consumes the next
//! scripted result; once the script runs out every operation transfers the full
//! requested length.
//!
//! # Example
//!
//! ```
//! use blklat::target::Device;
//! use blklat::target::mock::{MockDevice, MockResult};
//!
//! let mut device = MockDevice::new();
//! device.push(MockResult::Short(512));
//!
//! let mut buf = vec![0u8; 4096];
//! assert_eq!(device.read(&mut buf).unwrap(), 512);
//! assert_eq!(device.read(&mut buf).unwrap(), 4096);
//! assert_eq!(device.reads(), 2);
//! ```

use super::Device;
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Scripted outcome of one mock operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockResult {
    /// Transfer the full requested length
    Full,
    /// Transfer this many bytes (clamped to the request)
    Short(usize),
    /// Transfer nothing (end of device)
    Eof,
    /// Fail with this errno
    Fail(i32),
}

/// Mock device with scripted results and operation counters
#[derive(Debug)]
pub struct MockDevice {
    path: PathBuf,
    script: VecDeque<MockResult>,
    latency: Duration,
    rewind_error: Option<i32>,
    reads: usize,
    writes: usize,
    rewinds: usize,
    writes_all_zero: bool,
}

impl MockDevice {
    /// Create a mock device where every operation succeeds in full
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("/dev/mock0"),
            script: VecDeque::new(),
            latency: Duration::ZERO,
            rewind_error: None,
            reads: 0,
            writes: 0,
            rewinds: 0,
            writes_all_zero: true,
        }
    }

    /// Queue the result of the next unscripted operation
    pub fn push(&mut self, result: MockResult) {
        self.script.push_back(result);
    }

    /// Sleep this long inside every operation to simulate device latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make every rewind fail with this errno
    pub fn fail_rewind(&mut self, errno: i32) {
        self.rewind_error = Some(errno);
    }

    /// Number of reads issued
    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Number of writes issued
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Number of rewinds issued (successful or not)
    pub fn rewinds(&self) -> usize {
        self.rewinds
    }

    /// True if every buffer passed to `write` contained only zeros
    pub fn writes_all_zero(&self) -> bool {
        self.writes_all_zero
    }

    /// Operations not yet consumed from the script
    pub fn remaining_script(&self) -> usize {
        self.script.len()
    }

    fn complete(&mut self, requested: usize) -> io::Result<usize> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }

        match self.script.pop_front().unwrap_or(MockResult::Full) {
            MockResult::Full => Ok(requested),
            MockResult::Short(n) => Ok(n.min(requested)),
            MockResult::Eof => Ok(0),
            MockResult::Fail(errno) => Err(io::Error::from_raw_os_error(errno)),
        }
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for MockDevice {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        self.complete(buf.len())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes += 1;
        if buf.iter().any(|&b| b != 0) {
            self.writes_all_zero = false;
        }
        self.complete(buf.len())
    }

    fn rewind(&mut self) -> io::Result<()> {
        self.rewinds += 1;
        match self.rewind_error {
            Some(errno) => Err(io::Error::from_raw_os_error(errno)),
            None => Ok(()),
        }
    }
}
