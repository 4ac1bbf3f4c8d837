//! Port traits: the boundary between the monitor core and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ MonitorService / scheduled jobs
//! ```
//!
//! Drivers, files and HTTP clients implement these traits; the core only
//! ever sees the traits, so every decision can be exercised with mocks.
//!
//! ## Contracts
//!
//! - **BaselinePort** implementations MUST replace the stored record
//!   atomically (write a temporary file, then rename).  A torn write must
//!   never be loadable.
//! - **HistoryLog** is append-only; failures are reported but never fatal.
//! - Sensor reads have no timeout: a hung bus stalls the tick.

use chrono::{DateTime, Utc};

use crate::baseline::{Baseline, BaselineValues};
use crate::error::{PersistError, SensorError, ServiceError};
use crate::fsm::frame::Frame;
use crate::readings::{GasSample, OutdoorAqi, ProximityReading};

// ───────────────────────────────────────────────────────────────
// Sensor ports (driven adapters: hardware → core)
// ───────────────────────────────────────────────────────────────

/// SGP30-style eCO2/TVOC sensor.
pub trait GasSensorPort {
    /// Start the IAQ algorithm.  Called once at startup.
    fn init(&mut self) -> Result<(), SensorError>;

    /// Latest measurement.  Reports eCO2 = 400 until warmed up.
    fn read_gas(&mut self) -> Result<GasSample, SensorError>;

    /// The baseline the sensor is currently using.
    fn baseline(&mut self) -> Result<BaselineValues, SensorError>;

    /// Replace the sensor's baseline (restore after a restart).
    fn set_baseline(&mut self, values: BaselineValues) -> Result<(), SensorError>;
}

/// LTR-559-style light/proximity sensor.
pub trait ProximityPort {
    fn read_proximity(&mut self) -> Result<ProximityReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: core → hardware)
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    fn set_backlight(&mut self, on: bool);

    /// Draw a full frame.  Blocks until the panel has been written.
    fn render(&mut self, frame: &Frame);
}

// ───────────────────────────────────────────────────────────────
// Persistence ports
// ───────────────────────────────────────────────────────────────

/// Storage for the single persisted baseline record.
pub trait BaselinePort {
    /// `Ok(None)` when nothing (or only a partial record) is stored.
    fn load(&self) -> Result<Option<Baseline>, PersistError>;

    /// Atomically replace the stored record.
    fn save(&mut self, baseline: &Baseline) -> Result<(), PersistError>;
}

/// Which append-only log a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Baseline,
    Results,
}

pub trait HistoryLog {
    fn append(&mut self, target: LogTarget, line: &str) -> Result<(), PersistError>;
}

// ───────────────────────────────────────────────────────────────
// Outbound services
// ───────────────────────────────────────────────────────────────

/// Outdoor air-quality index provider.
pub trait AqiSource {
    fn fetch(&mut self) -> Result<OutdoorAqi, ServiceError>;
}

/// Remote feed for the latest readings.
pub trait TelemetryPort {
    fn push(&mut self, eco2: u32, tvoc: u32) -> Result<(), ServiceError>;
}

// ───────────────────────────────────────────────────────────────
// Time and events
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    fn now(&self) -> DateTime<Utc>;
}

/// The core emits structured [`AppEvent`](super::events::AppEvent)s here;
/// adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

/// Convenience bound for an adapter that owns every peripheral.
pub trait MonitorHardware: GasSensorPort + ProximityPort + DisplayPort {}

impl<T: GasSensorPort + ProximityPort + DisplayPort> MonitorHardware for T {}
