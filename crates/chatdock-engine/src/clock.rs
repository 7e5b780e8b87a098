//! Time source for message timestamps.
//!
//! The session never reads the wall clock directly; it asks a [`Clock`].
//! Production code uses [`SystemClock`], tests use [`FixedClock`] or
//! [`SteppingClock`] to get exact, repeatable timestamps.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use std::sync::Mutex;

/// A source of "now".
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Returns `start`, then advances by `step` on every call.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    /// Create a clock starting at `start` that advances by `step` per reading.
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        // A poisoned lock only means another reader panicked mid-step;
        // the stored instant is still valid.
        let mut next = self
            .next
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let current = *next;
        *next = current + self.step;
        current
    }
}

/// Format a timestamp as `HH:MM` in the local time zone.
pub fn format_clock_time(ts: DateTime<Utc>) -> String {
    format_clock_time_in(ts, &Local)
}

/// Format a timestamp as `HH:MM` in the given time zone.
pub fn format_clock_time_in<Tz: TimeZone>(ts: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format("%H:%M").to_string()
}
