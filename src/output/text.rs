//! Interval report lines
//!
//! Two formats, both one line per interval and flushed immediately:
//!
//! ```text
//! simple:   <mean_us>
//! verbose:  <epoch_seconds>: <mean_us> us (<total_us>/<count>)
//! ```

use crate::config::OutputMode;
use crate::stats::{Accumulator, IntervalSample, IterationBudget};
use crate::util::time::epoch_seconds;
use std::io::{self, Write};

/// Write one simple-format report line
pub fn write_simple<W: Write>(out: &mut W, sample: &IntervalSample) -> io::Result<()> {
    writeln!(out, "{}", sample.mean_us())
}

/// Write one verbose-format report line
pub fn write_verbose<W: Write>(
    out: &mut W,
    epoch_secs: i64,
    sample: &IntervalSample,
) -> io::Result<()> {
    writeln!(
        out,
        "{}: {} us ({}/{})",
        epoch_secs,
        sample.mean_us(),
        sample.total_us,
        sample.count
    )
}

/// Interval reporter
///
/// Drains the accumulator, prints the interval line and charges the iteration
/// budget. It never touches the device.
pub struct Reporter<W: Write> {
    out: W,
    mode: OutputMode,
    reports: u64,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self {
            out,
            mode,
            reports: 0,
        }
    }

    /// Drain `accumulator`, emit one line, flush, and consume one unit of `budget`
    ///
    /// The accumulator is reset before the line is written, so it is empty on
    /// return even if the write fails.
    pub fn fire(
        &mut self,
        accumulator: &mut Accumulator,
        budget: &mut IterationBudget,
    ) -> io::Result<IntervalSample> {
        let sample = accumulator.drain();

        match self.mode {
            OutputMode::Simple => write_simple(&mut self.out, &sample)?,
            OutputMode::Verbose => write_verbose(&mut self.out, epoch_seconds(), &sample)?,
        }
        self.out.flush()?;

        self.reports += 1;
        budget.consume();

        Ok(sample)
    }

    /// Number of lines emitted so far
    pub fn reports(&self) -> u64 {
        self.reports
    }

    /// Consume the reporter and return its writer
    pub fn into_inner(self) -> W {
        self.out
    }
}
