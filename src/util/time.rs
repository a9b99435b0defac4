//! Timing utilities for latency measurement
//!
//! Latency is measured with direct `clock_gettime` calls on the raw monotonic
//! clock, which is not slewed by NTP and never steps backwards. Report
//! timestamps use wall-clock time since they are meant for humans and scrapers.

use std::time::Duration;

/// Raw monotonic clock where available, plain monotonic elsewhere
#[cfg(any(target_os = "linux", target_os = "android"))]
const LATENCY_CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC_RAW;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const LATENCY_CLOCK: libc::clockid_t = libc::CLOCK_MONOTONIC;

/// Fast timestamp using direct clock_gettime
///
/// Resolution: nanosecond. Subtraction saturates, so a reading that is not
/// monotonic yields a zero duration instead of a negative one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FastInstant {
    nanos: u64,
}

impl FastInstant {
    /// Get the current time from the latency clock
    #[inline(always)]
    pub fn now() -> Self {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        unsafe {
            libc::clock_gettime(LATENCY_CLOCK, &mut ts);
        }

        Self::from_nanos((ts.tv_sec as u64) * 1_000_000_000 + (ts.tv_nsec as u64))
    }

    /// Build an instant from a raw nanosecond reading
    #[inline(always)]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self { nanos }
    }

    /// Calculate duration since another FastInstant
    #[inline(always)]
    pub fn duration_since(&self, earlier: FastInstant) -> Duration {
        Duration::from_nanos(self.nanos.saturating_sub(earlier.nanos))
    }

    /// Whole microseconds since another FastInstant
    #[inline(always)]
    pub fn micros_since(&self, earlier: FastInstant) -> u64 {
        self.nanos.saturating_sub(earlier.nanos) / 1_000
    }
}

/// Current wall-clock time in whole seconds since the Unix epoch
pub fn epoch_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}
