//! Synchronous IO engine
//!
//! Performs one blocking read(2) or write(2) per call at the device's current
//! offset. There is no explicit seek between operations: the offset advances with
//! each transfer, so a run sweeps the device sequentially and wraps back to the
//! start whenever an operation fails at the end of the device.
//!
//! The hot path never allocates. Latency is taken with `FastInstant` immediately
//! around the system call.

use super::{DriverError, Disposition, IOCompletion, OperationType};
use crate::stats::Accumulator;
use crate::target::Device;
use crate::util::buffer::AlignedBuffer;
use crate::util::time::FastInstant;

/// Issue exactly one operation of `op_type` for the full buffer size and time it
#[inline(always)]
pub fn perform_one_operation<D: Device + ?Sized>(
    device: &mut D,
    buffer: &mut AlignedBuffer,
    op_type: OperationType,
) -> IOCompletion {
    let requested = buffer.size();

    let start = FastInstant::now();
    let result = match op_type {
        OperationType::Read => device.read(buffer.as_mut_slice()),
        OperationType::Write => device.write(buffer.as_slice()),
    };
    let end = FastInstant::now();

    IOCompletion {
        op_type,
        requested,
        result,
        latency_us: end.micros_since(start),
    }
}

/// Apply a completion to the accumulator, rewinding the device after a failure
///
/// # Errors
///
/// Returns `DriverError::Rewind` if the operation failed and the device could not
/// be repositioned to offset 0.
pub fn settle<D: Device + ?Sized>(
    completion: &IOCompletion,
    device: &mut D,
    accumulator: &mut Accumulator,
) -> Result<Disposition, DriverError> {
    if completion.is_full() {
        accumulator.record(completion.latency_us);
        return Ok(Disposition::Recorded);
    }

    if !completion.is_failed() {
        return Ok(Disposition::Short);
    }

    if let Err(e) = &completion.result {
        tracing::debug!(op = %completion.op_type, error = %e, "operation failed, rewinding");
    } else {
        tracing::debug!(op = %completion.op_type, "end of device, rewinding");
    }

    device.rewind().map_err(|source| DriverError::Rewind {
        path: device.path().to_path_buf(),
        op: completion.op_type,
        source,
    })?;

    Ok(Disposition::Rewound)
}

/// Per-run counters of how completions were settled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCounters {
    pub recorded: u64,
    pub short: u64,
    pub rewound: u64,
}

/// Synchronous IO engine bound to one operation type
///
/// Only one operation is ever in flight (queue depth = 1).
#[derive(Debug)]
pub struct SyncEngine {
    op_type: OperationType,
    counters: EngineCounters,
}

impl SyncEngine {
    /// Create an engine that issues `op_type` operations
    pub fn new(op_type: OperationType) -> Self {
        Self {
            op_type,
            counters: EngineCounters::default(),
        }
    }

    /// Perform, time and settle one operation
    #[inline]
    pub fn execute<D: Device + ?Sized>(
        &mut self,
        device: &mut D,
        buffer: &mut AlignedBuffer,
        accumulator: &mut Accumulator,
    ) -> Result<Disposition, DriverError> {
        let completion = perform_one_operation(device, buffer, self.op_type);
        let disposition = settle(&completion, device, accumulator)?;

        match disposition {
            Disposition::Recorded => self.counters.recorded += 1,
            Disposition::Short => self.counters.short += 1,
            Disposition::Rewound => self.counters.rewound += 1,
        }

        Ok(disposition)
    }

    pub fn counters(&self) -> EngineCounters {
        self.counters
    }
}
