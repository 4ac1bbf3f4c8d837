//! Outbound application events.
//!
//! The monitor core and the scheduled jobs emit these through the
//! [`EventSink`](super::ports::EventSink) port.  The stock adapter writes
//! them to the log; a chat or MQTT adapter would implement the same trait.

use chrono::TimeDelta;

use crate::air_quality::{Advice, AirQualityLevel};
use crate::baseline::{Baseline, LogEntry};
use crate::error::Error;
use crate::readings::{OutdoorAqi, SensorReading};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Startup finished.  `restored` is the baseline applied to the sensor.
    Started {
        restored: Option<Baseline>,
        maturation: TimeDelta,
    },

    /// The warm-up gate opened (`ready`) or timed out.
    WarmupFinished { waited_secs: u64, ready: bool },

    /// Fresh reading, once per tick.
    Reading {
        reading: SensorReading,
        level: AirQualityLevel,
    },

    /// The alert screen switched on or off.
    ScreenChanged { on: bool, level: AirQualityLevel },

    /// Periodic low-trust baseline observation.
    BaselineCandidate(LogEntry),

    /// A valid baseline was persisted.
    BaselineCommitted(Baseline),

    /// Persisting or logging failed; retried next cycle.
    PersistFailed(Error),

    /// The outdoor AQI poll succeeded.
    OutdoorAqiUpdated { aqi: OutdoorAqi, advice: Advice },

    /// Readings were pushed to the telemetry feed.
    TelemetrySent { eco2: u32, tvoc: u32 },
}
