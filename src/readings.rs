//! Point-in-time sensor data.
//!
//! Every value here is captured once and then superseded, never merged:
//! the orchestrator produces a fresh [`SensorReading`] and
//! [`ProximityReading`] each tick and the scheduler jobs only ever see
//! copies of the latest one.

use chrono::{DateTime, Utc};

/// Raw gas measurement as returned by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GasSample {
    /// Equivalent CO2 (ppm).  Sits at [`ECO2_FLOOR`] while the sensor warms up.
    pub eco2: u32,
    /// Total volatile organic compounds (ppb).
    pub tvoc: u32,
}

/// Floor value the SGP30 reports for eCO2 until its algorithm has converged.
pub const ECO2_FLOOR: u32 = 400;

impl GasSample {
    /// The sensor has left its warm-up floor.
    pub fn is_warm(&self) -> bool {
        self.eco2 > ECO2_FLOOR && self.tvoc > 0
    }
}

/// A gas sample stamped with the tick that captured it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub eco2: u32,
    pub tvoc: u32,
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    pub fn new(sample: GasSample, timestamp: DateTime<Utc>) -> Self {
        Self {
            eco2: sample.eco2,
            tvoc: sample.tvoc,
            timestamp,
        }
    }
}

/// Light and proximity from the LTR-559.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ProximityReading {
    pub lux: f32,
    pub proximity: u32,
}

/// Outdoor air-quality index as reported by IQAir.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutdoorAqi {
    /// US EPA AQI.
    pub aqi: u32,
    /// Observation timestamp as reported by the service.
    pub observed: String,
}
