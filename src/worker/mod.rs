//! Latency worker
//!
//! The worker owns every resource of a run and drives the main loop as a small
//! state machine:
//!
//! ```text
//!            fire flag set                  budget left
//!  Running ─────────────────▶ DrainingReport ───────────▶ Running
//!     │                              │
//!     │ rewind failed                │ budget exhausted
//!     ▼                              ▼
//!  TerminatedError              TerminatedOk
//! ```
//!
//! The fire flag is only checked at the top of an iteration, between
//! operations, so reporting lags by at most one operation duration.
//!
//! # Example
//!
//! ```no_run
//! use blklat::config::Config;
//! use blklat::worker;
//!
//! let mut config = Config::new("/dev/sdb");
//! config.iterations = Some(10);
//!
//! let summary = worker::run(&config)?;
//! println!("{} reports", summary.reports);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod ticker;

use crate::config::Config;
use crate::engine::sync::{EngineCounters, SyncEngine};
use crate::engine::OperationType;
use crate::output::Reporter;
use crate::stats::{Accumulator, IterationBudget};
use crate::target::block::BlockDevice;
use crate::target::{Device, OpenFlags};
use crate::util::buffer::{AlignedBuffer, FillPattern};
use crate::Result;
use anyhow::Context;
use std::io::Write;
use ticker::IntervalTimer;

/// Main loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Issuing operations
    Running,
    /// Fire flag observed; the next step emits a report
    DrainingReport,
    /// Iteration budget used up
    TerminatedOk,
    /// Fatal IO or output failure
    TerminatedError,
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::TerminatedOk | RunState::TerminatedError)
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Report lines emitted
    pub reports: u64,
    /// How operations were settled over the whole run
    pub counters: EngineCounters,
}

/// Worker that runs the measurement loop against one device
pub struct Worker<D: Device, W: Write> {
    device: D,
    buffer: AlignedBuffer,
    engine: SyncEngine,
    accumulator: Accumulator,
    budget: IterationBudget,
    timer: IntervalTimer,
    reporter: Reporter<W>,
    state: RunState,
}

impl<D: Device, W: Write> Worker<D, W> {
    /// Assemble a worker from already-acquired resources
    ///
    /// The buffer must already hold its final content; the worker never modifies
    /// it in write mode.
    pub fn new(
        device: D,
        buffer: AlignedBuffer,
        op_type: OperationType,
        budget: IterationBudget,
        timer: IntervalTimer,
        reporter: Reporter<W>,
    ) -> Self {
        Self {
            device,
            buffer,
            engine: SyncEngine::new(op_type),
            accumulator: Accumulator::new(),
            budget,
            timer,
            reporter,
            state: RunState::Running,
        }
    }

    /// Advance the state machine by one transition
    ///
    /// In `Running` this either observes the fire flag or performs exactly one
    /// operation. Terminal states are sticky.
    pub fn step(&mut self) -> Result<RunState> {
        match self.state {
            RunState::Running => {
                if self.timer.take_fired() {
                    self.state = RunState::DrainingReport;
                    return Ok(self.state);
                }

                if let Err(e) =
                    self.engine
                        .execute(&mut self.device, &mut self.buffer, &mut self.accumulator)
                {
                    self.state = RunState::TerminatedError;
                    return Err(e.into());
                }
            }
            RunState::DrainingReport => {
                if let Err(e) = self.reporter.fire(&mut self.accumulator, &mut self.budget) {
                    self.state = RunState::TerminatedError;
                    return Err(e).context("Error writing interval report");
                }

                self.state = if self.budget.is_exhausted() {
                    RunState::TerminatedOk
                } else {
                    RunState::Running
                };
            }
            RunState::TerminatedOk | RunState::TerminatedError => {}
        }

        Ok(self.state)
    }

    /// Run until the iteration budget is exhausted or a fatal error occurs
    pub fn run(&mut self) -> Result<RunSummary> {
        while !self.step()?.is_terminal() {}

        let summary = self.summary();
        tracing::debug!(
            reports = summary.reports,
            recorded = summary.counters.recorded,
            short = summary.counters.short,
            rewound = summary.counters.rewound,
            "run complete"
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            reports: self.reporter.reports(),
            counters: self.engine.counters(),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn budget(&self) -> IterationBudget {
        self.budget
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Release the worker's resources, returning the device and report writer
    pub fn into_parts(self) -> (D, W) {
        (self.device, self.reporter.into_inner())
    }
}

/// Allocate and prepare the IO buffer for a run
///
/// Called after the device is open. In write mode the buffer is filled once here
/// and never touched again.
pub fn prepare_buffer(config: &Config) -> Result<AlignedBuffer> {
    let mut buffer = AlignedBuffer::page_aligned(config.block_size).with_context(|| {
        format!(
            "Error allocating aligned buffer, {} bytes long",
            config.block_size
        )
    })?;

    if let Some(pattern) = config.fill_pattern() {
        if pattern == FillPattern::Random {
            tracing::info!(bytes = config.block_size, "reading random bytes for write buffer");
        }
        buffer.fill(pattern);
    }

    Ok(buffer)
}

/// Run a configured measurement against an already-open device
///
/// Report lines go to `out`. The timer starts only after the buffer is ready.
pub fn run_on<D: Device, W: Write>(config: &Config, device: D, out: W) -> Result<RunSummary> {
    let budget = config.budget()?;
    let buffer = prepare_buffer(config)?;
    let timer =
        IntervalTimer::start(config.report_interval).context("Error starting interval timer")?;
    let reporter = Reporter::new(out, config.output);

    let mut worker = Worker::new(device, buffer, config.op_type, budget, timer, reporter);
    worker.run()
}

/// Open the configured block device and run until the budget is exhausted
///
/// Report lines go to stdout.
pub fn run(config: &Config) -> Result<RunSummary> {
    let device = BlockDevice::open(&config.device, OpenFlags::default())?;
    run_on(config, device, std::io::stdout().lock())
}
