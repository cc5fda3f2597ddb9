//! Wall-clock access, injectable so timestamps are testable.

use chrono::{DateTime, Local};

pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Reads the system clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Milliseconds since the Unix epoch, with sub-millisecond precision.
pub fn epoch_millis(at: &DateTime<Local>) -> f64 {
    at.timestamp_micros() as f64 / 1000.0
}
