//! Baseline lifecycle for the SGP30 gas sensor.
//!
//! The sensor continuously learns a calibration baseline.  Two overlapping
//! lifecycles are tracked here:
//!
//! - **Restored**: the persisted baseline is applied once at startup when
//!   it is younger than [`trust_window`].
//! - **Learned**: the sensor's live baseline is logged as a low-trust
//!   *candidate* every few minutes and committed as *valid* once the
//!   [`maturation_window`] has elapsed, then hourly.
//!
//! Persistence goes through [`BaselinePort`]; implementations replace the
//! stored record atomically, so there is never more than one record and a
//! torn write is never read back.

use core::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::app::ports::BaselinePort;
use crate::error::PersistError;

const TRUST_WINDOW_DAYS: i64 = 7;
const COLD_MATURATION_HOURS: i64 = 12;
const WARM_MATURATION_HOURS: i64 = 1;
const COMMIT_INTERVAL_HOURS: i64 = 1;

/// Baseline register values as exchanged with the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BaselineValues {
    pub eco2: u16,
    pub tvoc: u16,
}

/// A baseline with the moment it was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub eco2_baseline: u16,
    pub tvoc_baseline: u16,
    pub captured_at: DateTime<Utc>,
}

impl Baseline {
    pub fn new(values: BaselineValues, captured_at: DateTime<Utc>) -> Self {
        Self {
            eco2_baseline: values.eco2,
            tvoc_baseline: values.tvoc,
            captured_at,
        }
    }

    pub fn values(&self) -> BaselineValues {
        BaselineValues {
            eco2: self.eco2_baseline,
            tvoc: self.tvoc_baseline,
        }
    }
}

/// How long a persisted baseline stays trustworthy.
pub fn trust_window() -> TimeDelta {
    TimeDelta::days(TRUST_WINDOW_DAYS)
}

/// Interval between valid commits once the maturation window has passed.
pub fn commit_interval() -> TimeDelta {
    TimeDelta::hours(COMMIT_INTERVAL_HOURS)
}

/// Return the persisted baseline if it is still inside the trust window.
pub fn restore(persisted: &Baseline, now: DateTime<Utc>) -> Option<Baseline> {
    (now < persisted.captured_at + trust_window()).then_some(*persisted)
}

/// Delay before a learned baseline may be committed.
///
/// A cold sensor needs half a day to converge; with a restored baseline
/// applied an hour is enough.
pub fn maturation_window(restored: bool) -> TimeDelta {
    if restored {
        TimeDelta::hours(WARM_MATURATION_HOURS)
    } else {
        TimeDelta::hours(COLD_MATURATION_HOURS)
    }
}

// ---------------------------------------------------------------------------
// Log entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Periodic observation, for visibility only.
    Candidate,
    /// Committed as the persisted baseline.
    Valid,
}

/// One line of the baseline log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: EntryKind,
    pub values: BaselineValues,
    pub at: DateTime<Utc>,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == EntryKind::Valid {
            write!(f, "Valid: ")?;
        }
        write!(
            f,
            "CO2: {0} 0x{0:x}, VOC: {1} 0x{1:x} | {2}",
            self.values.eco2,
            self.values.tvoc,
            self.at.format(LOG_TIME_FORMAT)
        )
    }
}

/// Timestamp format shared by the baseline and result logs.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Low-trust observation of the live baseline.
pub fn record_candidate(values: BaselineValues, now: DateTime<Utc>) -> LogEntry {
    LogEntry {
        kind: EntryKind::Candidate,
        values,
        at: now,
    }
}

/// Persist `values` as the authoritative baseline captured at `now`.
///
/// On failure the sensor keeps its in-memory baseline; the caller logs the
/// error and the next hourly commit retries.
pub fn commit_valid(
    store: &mut impl BaselinePort,
    values: BaselineValues,
    now: DateTime<Utc>,
) -> Result<Baseline, PersistError> {
    let baseline = Baseline::new(values, now);
    store.save(&baseline)?;
    Ok(baseline)
}
