//! Wall-clock time adapter.

use chrono::{DateTime, Utc};

use crate::app::ports::ClockPort;

/// [`ClockPort`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
