//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events
//! through the `log` facade (stderr via `env_logger` in the binary).
//! A chat or MQTT adapter would implement the same trait.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::baseline::LOG_TIME_FORMAT;

/// Adapter that logs every [`AppEvent`].  Stateless, so each scheduled
/// job can hold its own copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { restored, maturation } => match restored {
                Some(b) => info!(
                    "START | baseline restored 0x{:x}/0x{:x} from {} | first commit in {}h",
                    b.eco2_baseline,
                    b.tvoc_baseline,
                    b.captured_at.format(LOG_TIME_FORMAT),
                    maturation.num_hours()
                ),
                None => info!("START | cold start | first commit in {}h", maturation.num_hours()),
            },
            AppEvent::WarmupFinished { waited_secs, ready } => {
                info!("WARMUP | ready={} after {}s", ready, waited_secs);
            }
            AppEvent::Reading { reading, level } => {
                info!(
                    "READING | CO2={}ppm VOC={}ppb | {}",
                    reading.eco2,
                    reading.tvoc,
                    level.as_str()
                );
            }
            AppEvent::ScreenChanged { on, level } => {
                info!("ALERT | screen {} | air={}", if *on { "on" } else { "off" }, level.as_str());
            }
            AppEvent::BaselineCandidate(entry) => {
                info!("BASELINE | candidate {}", entry);
            }
            AppEvent::BaselineCommitted(b) => {
                info!(
                    "BASELINE | committed 0x{:x}/0x{:x} at {}",
                    b.eco2_baseline,
                    b.tvoc_baseline,
                    b.captured_at.format(LOG_TIME_FORMAT)
                );
            }
            AppEvent::PersistFailed(e) => {
                warn!("PERSIST | {}", e);
            }
            AppEvent::OutdoorAqiUpdated { aqi, advice } => {
                info!("AQI | outdoor={} ({}) | {}", aqi.aqi, aqi.observed, advice.message());
            }
            AppEvent::TelemetrySent { eco2, tvoc } => {
                info!("TELEM | CO2={}ppm VOC={}ppb sent", eco2, tvoc);
            }
        }
    }
}
