//! Background jobs driven by the scheduler [`Runner`](crate::scheduler::Runner).
//!
//! Each job owns its outbound adapter and an `Arc` to the shared state.
//! Failures are returned to the scheduler, which logs them and re-arms the
//! job; the shared state is left untouched on failure.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::air_quality::advise;
use crate::error::Error;
use crate::scheduler::Job;

use super::events::AppEvent;
use super::ports::{AqiSource, EventSink, TelemetryPort};
use super::shared::SharedState;

pub const AQI_POLL_LABEL: &str = "aqi-poll";
pub const TELEMETRY_LABEL: &str = "telemetry";

// ───────────────────────────────────────────────────────────────
// Outdoor AQI poll
// ───────────────────────────────────────────────────────────────

pub struct AqiPollJob<S, E> {
    source: S,
    shared: Arc<SharedState>,
    sink: E,
}

impl<S, E> AqiPollJob<S, E> {
    pub fn new(source: S, shared: Arc<SharedState>, sink: E) -> Self {
        Self { source, shared, sink }
    }
}

impl<S, E> Job for AqiPollJob<S, E>
where
    S: AqiSource + Send,
    E: EventSink + Send,
{
    fn label(&self) -> &'static str {
        AQI_POLL_LABEL
    }

    fn run(&mut self, _ctx: &mut (), _now: DateTime<Utc>) -> Result<(), Error> {
        let aqi = self.source.fetch()?;
        info!("Outdoor air quality: AQI {} | {}", aqi.aqi, aqi.observed);
        self.shared.set_outdoor_aqi(aqi.clone());

        let advice = advise(self.shared.snapshot().level(), aqi.aqi);
        self.sink.emit(&AppEvent::OutdoorAqiUpdated { aqi, advice });
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Telemetry upload
// ───────────────────────────────────────────────────────────────

pub struct TelemetryJob<T, E> {
    port: T,
    shared: Arc<SharedState>,
    sink: E,
}

impl<T, E> TelemetryJob<T, E> {
    pub fn new(port: T, shared: Arc<SharedState>, sink: E) -> Self {
        Self { port, shared, sink }
    }
}

impl<T, E> Job for TelemetryJob<T, E>
where
    T: TelemetryPort + Send,
    E: EventSink + Send,
{
    fn label(&self) -> &'static str {
        TELEMETRY_LABEL
    }

    fn run(&mut self, _ctx: &mut (), _now: DateTime<Utc>) -> Result<(), Error> {
        let Some(reading) = self.shared.latest_reading() else {
            debug!("Telemetry: no reading yet, skipping");
            return Ok(());
        };
        self.port.push(reading.eco2, reading.tvoc)?;
        self.sink.emit(&AppEvent::TelemetrySent {
            eco2: reading.eco2,
            tvoc: reading.tvoc,
        });
        Ok(())
    }
}
