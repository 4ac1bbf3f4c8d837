//! State shared between the monitor tick and the scheduler runner.
//!
//! Each field has exactly one writer:
//!
//! | Field         | Writer                       | Readers                     |
//! |---------------|------------------------------|-----------------------------|
//! | `reading`     | monitor tick                 | telemetry, AQI poll (level) |
//! | `outdoor_aqi` | AQI poll job                 | `outdoor_aqi()` callers     |
//! | `baseline`    | startup restore, commit      | `baseline()` callers        |
//!
//! A single small mutex guards the lot; readers copy values out and never
//! hold the lock across I/O.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::air_quality::{AirQualityLevel, classify};
use crate::baseline::Baseline;
use crate::readings::{OutdoorAqi, SensorReading};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub reading: Option<SensorReading>,
    pub outdoor_aqi: Option<OutdoorAqi>,
    pub baseline: Option<Baseline>,
}

impl Snapshot {
    /// Classification of the latest reading (`Unknown` before the first).
    pub fn level(&self) -> AirQualityLevel {
        classify(
            self.reading.map(|r| r.eco2),
            self.reading.map(|r| r.tvoc),
        )
    }
}

#[derive(Debug, Default)]
pub struct SharedState {
    inner: Mutex<Snapshot>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    // A writer panicking mid-assignment cannot leave a torn `Copy` value,
    // so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish_reading(&self, reading: SensorReading) {
        self.lock().reading = Some(reading);
    }

    pub fn latest_reading(&self) -> Option<SensorReading> {
        self.lock().reading
    }

    pub fn set_outdoor_aqi(&self, aqi: OutdoorAqi) {
        self.lock().outdoor_aqi = Some(aqi);
    }

    pub fn outdoor_aqi(&self) -> Option<OutdoorAqi> {
        self.lock().outdoor_aqi.clone()
    }

    pub fn set_baseline(&self, baseline: Baseline) {
        self.lock().baseline = Some(baseline);
    }

    pub fn baseline(&self) -> Option<Baseline> {
        self.lock().baseline
    }

    pub fn snapshot(&self) -> Snapshot {
        self.lock().clone()
    }
}
