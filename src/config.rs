//! Monitor configuration.
//!
//! Loaded once at startup from a JSON file.  The same file carries the
//! persisted baseline record (`baseline` section), which
//! [`ConfigFileStore`](crate::adapters::config_file::ConfigFileStore)
//! rewrites atomically whenever a valid baseline is committed.
//!
//! ```json
//! {
//!   "baseline": { "eCO2": 35512, "TVOC": 37120, "timestamp": "2024-03-01T09:00:00Z" },
//!   "location": { "latitude": 40.41, "longitude": -3.70 },
//!   "iqair": { "token": "..." },
//!   "adafruit": { "username": "...", "key": "..." },
//!   "logs": { "baseline_log": "logs/sgp30-baseline.txt", "result_log": "logs/sgp30-result.txt" },
//!   "timing": { "tick_interval_ms": 1000 }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::baseline::{Baseline, BaselineValues};
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub baseline: BaselineRecord,
    /// Required when `iqair` is set.
    pub location: Option<Location>,
    /// Outdoor AQI poll; disabled when absent.
    pub iqair: Option<IqAirConfig>,
    /// Telemetry upload; disabled when absent.
    pub adafruit: Option<AdafruitConfig>,
    pub logs: LogPaths,
    pub timing: TimingConfig,
}

/// Persisted baseline as it appears in the config file.
///
/// All three fields must be present for the record to count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineRecord {
    #[serde(rename = "eCO2")]
    pub eco2: Option<u16>,
    #[serde(rename = "TVOC")]
    pub tvoc: Option<u16>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl BaselineRecord {
    pub fn to_baseline(&self) -> Option<Baseline> {
        match (self.eco2, self.tvoc, self.timestamp) {
            (Some(eco2), Some(tvoc), Some(at)) => Some(Baseline::new(BaselineValues { eco2, tvoc }, at)),
            _ => None,
        }
    }
}

impl From<&Baseline> for BaselineRecord {
    fn from(b: &Baseline) -> Self {
        Self {
            eco2: Some(b.eco2_baseline),
            tvoc: Some(b.tvoc_baseline),
            timestamp: Some(b.captured_at),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IqAirConfig {
    pub token: String,
    #[serde(default = "default_iqair_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdafruitConfig {
    pub username: String,
    pub key: String,
    #[serde(default = "default_eco2_feed")]
    pub eco2_feed: String,
    #[serde(default = "default_tvoc_feed")]
    pub tvoc_feed: String,
    #[serde(default = "default_adafruit_url")]
    pub base_url: String,
}

fn default_iqair_url() -> String {
    "https://api.airvisual.com".into()
}

fn default_adafruit_url() -> String {
    "https://io.adafruit.com".into()
}

fn default_eco2_feed() -> String {
    "eco2".into()
}

fn default_tvoc_feed() -> String {
    "tvoc".into()
}

/// Append-only text logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogPaths {
    pub baseline_log: PathBuf,
    pub result_log: PathBuf,
}

impl Default for LogPaths {
    fn default() -> Self {
        Self {
            baseline_log: PathBuf::from("logs/sgp30-baseline.txt"),
            result_log: PathBuf::from("logs/sgp30-result.txt"),
        }
    }
}

/// Cadences.  Baseline trust and maturation windows are fixed and live in
/// [`crate::baseline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Monitor tick (milliseconds).
    pub tick_interval_ms: u64,
    /// Outdoor AQI poll (seconds).
    pub aqi_poll_interval_secs: u64,
    /// Telemetry upload (seconds).
    pub telemetry_interval_secs: u64,
    /// Baseline candidate log (seconds).
    pub candidate_interval_secs: u64,
    /// Upper bound on the startup warm-up gate (seconds).
    pub warmup_timeout_secs: u64,
    /// Transport timeout for outbound HTTP (seconds).
    pub http_timeout_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,         // 1 Hz
            aqi_poll_interval_secs: 1800,   // 30 min
            telemetry_interval_secs: 30,
            candidate_interval_secs: 600,   // 10 min
            warmup_timeout_secs: 30,
            http_timeout_secs: 10,
        }
    }
}

/// Longest accepted job interval (one day).
pub const MAX_JOB_INTERVAL_SECS: u64 = 86_400;
/// Longest accepted warm-up gate.
pub const MAX_WARMUP_SECS: u64 = 300;
/// Longest accepted tick.
pub const MAX_TICK_INTERVAL_MS: u64 = 60_000;
/// Longest accepted HTTP timeout.
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 300;

impl MonitorConfig {
    /// Read, parse and validate the config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.kind()))?;
        let config: Self = serde_json::from_str(&text).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the monitor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.timing;
        if !(1..=MAX_TICK_INTERVAL_MS).contains(&t.tick_interval_ms) {
            return Err(ConfigError::Invalid("timing.tick_interval_ms must be 1..=60000"));
        }
        let intervals = [
            t.aqi_poll_interval_secs,
            t.telemetry_interval_secs,
            t.candidate_interval_secs,
        ];
        if intervals.iter().any(|s| !(1..=MAX_JOB_INTERVAL_SECS).contains(s)) {
            return Err(ConfigError::Invalid("timing: job intervals must be 1..=86400 s"));
        }
        if t.warmup_timeout_secs > MAX_WARMUP_SECS {
            return Err(ConfigError::Invalid("timing.warmup_timeout_secs must be <= 300"));
        }
        if !(1..=MAX_HTTP_TIMEOUT_SECS).contains(&t.http_timeout_secs) {
            return Err(ConfigError::Invalid("timing.http_timeout_secs must be 1..=300"));
        }

        if let Some(loc) = &self.location {
            if !(-90.0..=90.0).contains(&loc.latitude) {
                return Err(ConfigError::Invalid("location.latitude out of range"));
            }
            if !(-180.0..=180.0).contains(&loc.longitude) {
                return Err(ConfigError::Invalid("location.longitude out of range"));
            }
        }

        if let Some(iqair) = &self.iqair {
            if iqair.token.trim().is_empty() {
                return Err(ConfigError::Invalid("iqair.token is empty"));
            }
            if self.location.is_none() {
                return Err(ConfigError::Invalid("iqair requires a location"));
            }
        }

        if let Some(aio) = &self.adafruit {
            if aio.username.trim().is_empty() || aio.key.trim().is_empty() {
                return Err(ConfigError::Invalid("adafruit credentials are empty"));
            }
            if aio.eco2_feed.is_empty() || aio.tvoc_feed.is_empty() {
                return Err(ConfigError::Invalid("adafruit feed names are empty"));
            }
        }

        if self.logs.baseline_log.as_os_str().is_empty() || self.logs.result_log.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("log paths must not be empty"));
        }

        Ok(())
    }
}
