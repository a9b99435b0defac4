//! Interval timer
//!
//! A background thread sleeps to absolute deadlines (`start + k * period`) and
//! posts each deadline into a single-slot crossbeam channel, which acts as the
//! fire flag. A tick that finds the slot still full is dropped, so a slow
//! operation delays one report without shifting the schedule or queueing a
//! burst of reports. The main loop checks and clears the flag with a
//! non-blocking receive between operations, so the timer can never interrupt
//! an operation in flight.

use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use std::io;
use std::thread;
use std::time::{Duration, Instant};

/// Shortest period the timer thread will run with
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Fire flag fed by a periodic timer
#[derive(Debug)]
pub struct IntervalTimer {
    ticks: Receiver<Instant>,
    period: Duration,
}

impl IntervalTimer {
    /// Start a timer that fires every `period`, first firing one period from now
    ///
    /// The timer thread exits at its next deadline after the timer is dropped.
    pub fn start(period: Duration) -> io::Result<Self> {
        let period = period.max(MIN_PERIOD);
        let (tx, rx) = channel::bounded(1);
        let first = Instant::now() + period;

        thread::Builder::new()
            .name("blklat-ticker".to_string())
            .spawn(move || run_schedule(tx, first, period))?;

        Ok(Self {
            ticks: rx,
            period,
        })
    }

    /// Build a timer fed by an arbitrary channel
    ///
    /// Useful to fire the timer by hand: send an `Instant` on the paired sender.
    pub fn from_receiver(ticks: Receiver<Instant>, period: Duration) -> Self {
        Self { ticks, period }
    }

    /// Check the fire flag and clear it
    #[inline(always)]
    pub fn take_fired(&self) -> bool {
        self.ticks.try_recv().is_ok()
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Post `first`, `first + period`, ... into `tx` until the receiver goes away
fn run_schedule(tx: Sender<Instant>, first: Instant, period: Duration) {
    let mut deadline = first;

    loop {
        let now = Instant::now();
        if deadline > now {
            thread::sleep(deadline - now);
        }

        match tx.try_send(deadline) {
            Ok(()) | Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => return,
        }

        deadline = next_deadline(deadline, period, Instant::now());
    }
}

/// First deadline on the `previous + k * period` grid that lies after `now`
///
/// Whole periods missed while the thread was descheduled are skipped.
fn next_deadline(previous: Instant, period: Duration, now: Instant) -> Instant {
    let mut next = previous + period;
    if next <= now {
        let behind = now.duration_since(next).as_nanos();
        let skipped = behind / period.as_nanos() + 1;
        next += period * u32::try_from(skipped).unwrap_or(u32::MAX);
    }
    next
}
