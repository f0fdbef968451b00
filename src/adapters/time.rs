//! Host clock adapter.
//!
//! Wall clock from `chrono::Utc::now()`, monotonic uptime from
//! `std::time::Instant`. On the device the same port is backed by the
//! RTC and the high-resolution timer.

use chrono::{DateTime, Utc};

use crate::app::ports::ClockPort;

pub struct SystemClock {
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    /// Milliseconds since construction (monotonic).
    fn uptime_ms(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}
