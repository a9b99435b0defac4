//! Interval statistics
//!
//! The accumulator holds the running latency total and operation count for the
//! current reporting interval. Only the main loop touches it: the IO driver adds
//! full-size operations, the reporter drains it with a single swap so there is
//! never a half-reset state to observe.
//!
//! # Example
//!
//! ```
//! use blklat::stats::Accumulator;
//!
//! let mut acc = Accumulator::new();
//! acc.record(120);
//! acc.record(80);
//!
//! let sample = acc.drain();
//! assert_eq!(sample.mean_us(), 100);
//! assert!(acc.is_empty());
//! ```

use std::num::NonZeroU64;

/// Running latency total for the current interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accumulator {
    total_us: u64,
    count: u64,
}

impl Accumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one full-size operation that took `latency_us` microseconds
    #[inline(always)]
    pub fn record(&mut self, latency_us: u64) {
        self.total_us = self.total_us.saturating_add(latency_us);
        self.count += 1;
    }

    /// Take the current totals and reset to zero in one step
    #[inline]
    pub fn drain(&mut self) -> IntervalSample {
        let taken = std::mem::take(self);
        IntervalSample {
            total_us: taken.total_us,
            count: taken.count,
        }
    }

    /// Total latency recorded this interval, in microseconds
    pub fn total_us(&self) -> u64 {
        self.total_us
    }

    /// Operations recorded this interval
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.total_us == 0
    }
}

/// Drained totals of one reporting interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntervalSample {
    /// Sum of operation latencies in microseconds
    pub total_us: u64,
    /// Number of full-size operations
    pub count: u64,
}

impl IntervalSample {
    /// Mean latency in whole microseconds, 0 when no operation completed
    pub fn mean_us(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            self.total_us / self.count
        }
    }
}

/// Number of reports left before the run stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationBudget {
    /// Report forever
    Unbounded,
    /// Stop after this many more reports
    Remaining(NonZeroU64),
    /// Budget used up; the loop must terminate
    Exhausted,
}

impl IterationBudget {
    /// Budget from an optional iteration count
    ///
    /// `Some(0)` has no meaningful budget and yields `None`; the configuration
    /// layer rejects it before a budget is ever built.
    pub fn from_iterations(iterations: Option<u64>) -> Option<Self> {
        match iterations {
            None => Some(Self::Unbounded),
            Some(n) => NonZeroU64::new(n).map(Self::Remaining),
        }
    }

    /// Consume one report from the budget
    pub fn consume(&mut self) {
        if let Self::Remaining(n) = *self {
            *self = match NonZeroU64::new(n.get() - 1) {
                Some(left) => Self::Remaining(left),
                None => Self::Exhausted,
            };
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}

impl std::fmt::Display for IterationBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unbounded => write!(f, "unbounded"),
            Self::Remaining(n) => write!(f, "{} remaining", n),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}
