//! IO driver
//!
//! The driver performs exactly one synchronous, fixed-size operation per call at
//! the device's current offset, times it, and settles the result against the
//! interval accumulator:
//!
//! - **Full transfer**: latency added to the accumulator
//! - **Short transfer**: ignored, the loop simply continues
//! - **Error or end of device**: ignored, and the offset is rewound to 0
//!
//! A rewind that itself fails is the only fatal condition the driver reports.
//!
//! # Example
//!
//! ```
//! use blklat::engine::{Disposition, OperationType};
//! use blklat::engine::sync::SyncEngine;
//! use blklat::stats::Accumulator;
//! use blklat::target::mock::MockDevice;
//! use blklat::util::buffer::AlignedBuffer;
//!
//! let mut device = MockDevice::new();
//! let mut buffer = AlignedBuffer::page_aligned(4096)?;
//! let mut acc = Accumulator::new();
//!
//! let mut engine = SyncEngine::new(OperationType::Read);
//! let disposition = engine.execute(&mut device, &mut buffer, &mut acc)?;
//! assert_eq!(disposition, Disposition::Recorded);
//! assert_eq!(acc.count(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// Read from the device into the buffer
    Read,
    /// Write the buffer to the device
    Write,
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationType::Read => write!(f, "read"),
            OperationType::Write => write!(f, "write"),
        }
    }
}

/// Completed IO operation
///
/// Carries the raw result of the system call along with its measured latency.
#[derive(Debug)]
pub struct IOCompletion {
    /// Type of operation that completed
    pub op_type: OperationType,

    /// Bytes requested (the configured transfer size)
    pub requested: usize,

    /// Bytes transferred, or the OS error
    pub result: io::Result<usize>,

    /// Wall time spent inside the call, in microseconds
    pub latency_us: u64,
}

impl IOCompletion {
    /// True if the whole requested length was transferred
    #[inline(always)]
    pub fn is_full(&self) -> bool {
        matches!(self.result, Ok(n) if n == self.requested)
    }

    /// True if the call failed or transferred nothing
    ///
    /// Zero bytes means the offset reached the end of the device, which needs the
    /// same recovery as an error.
    #[inline(always)]
    pub fn is_failed(&self) -> bool {
        matches!(self.result, Err(_) | Ok(0))
    }
}

/// What the driver did with a completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Full transfer, latency recorded
    Recorded,
    /// Partial transfer, nothing recorded
    Short,
    /// Failed transfer, offset rewound to the start of the device
    Rewound,
}

/// Fatal IO driver errors
#[derive(Debug, Error)]
pub enum DriverError {
    /// Repositioning to the start of the device failed after a failed operation
    #[error(
        "Error offsetting to the start of the device \"{}\" after failed {}",
        .path.display(),
        .op
    )]
    Rewind {
        path: PathBuf,
        op: OperationType,
        #[source]
        source: io::Error,
    },
}

pub mod sync;
