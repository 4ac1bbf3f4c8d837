//! Unified error types for the monitor.
//!
//! One top-level [`Error`] that every subsystem converts into, so the
//! tick loop and the scheduler runner handle failures uniformly.  The
//! variants mirror the failure policy:
//!
//! | Variant   | Policy                                                   |
//! |-----------|----------------------------------------------------------|
//! | `Sensor`  | skip the tick, nothing is decided on a missing reading   |
//! | `Persist` | log, retry on the next cycle                             |
//! | `Service` | log, keep the previous value, job re-arms as usual       |
//! | `Config`  | fatal at startup                                         |
//!
//! All variants are `Copy` so they can travel inside [`AppEvent`]s
//! without allocation.
//!
//! [`AppEvent`]: crate::app::events::AppEvent

use core::fmt;
use std::io;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be initialised or read.
    Sensor(SensorError),
    /// A baseline record or log line could not be written.
    Persist(PersistError),
    /// The outdoor AQI fetch or the telemetry push failed.
    Service(ServiceError),
    /// Startup configuration is missing or malformed.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor unavailable: {e}"),
            Self::Persist(e) => write!(f, "persistence failure: {e}"),
            Self::Service(e) => write!(f, "external service failure: {e}"),
            Self::Config(e) => write!(f, "config invalid: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// Driver initialisation failed.
    InitFailed,
    /// The bus transaction for a measurement failed.
    ReadFailed,
    /// Reading or writing the calibration baseline failed.
    BaselineIo,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitFailed => write!(f, "init failed"),
            Self::ReadFailed => write!(f, "read failed"),
            Self::BaselineIo => write!(f, "baseline transfer failed"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Persistence errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistError {
    /// Filesystem error.
    Io(io::ErrorKind),
    /// Stored record failed to parse.
    Corrupted,
    /// Record could not be encoded.
    Encode,
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(kind) => write!(f, "I/O error ({kind})"),
            Self::Corrupted => write!(f, "stored record corrupted"),
            Self::Encode => write!(f, "record encoding failed"),
        }
    }
}

impl std::error::Error for PersistError {}

impl From<io::Error> for PersistError {
    fn from(e: io::Error) -> Self {
        Self::Io(e.kind())
    }
}

impl From<PersistError> for Error {
    fn from(e: PersistError) -> Self {
        Self::Persist(e)
    }
}

// ---------------------------------------------------------------------------
// External service errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceError {
    /// Connection, DNS, TLS or timeout.
    Transport,
    /// The server answered with a non-success HTTP status.
    Status(u16),
    /// The body arrived but reported failure (e.g. IQAir `status != "success"`).
    Rejected,
    /// The body could not be decoded.
    Malformed,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport error"),
            Self::Status(code) => write!(f, "HTTP status {code}"),
            Self::Rejected => write!(f, "request rejected by service"),
            Self::Malformed => write!(f, "malformed response"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<ServiceError> for Error {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(io::ErrorKind),
    /// The file is not valid JSON for [`MonitorConfig`](crate::config::MonitorConfig).
    Parse,
    /// A field failed validation; the text names the field.
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(kind) => write!(f, "cannot read config ({kind})"),
            Self::Parse => write!(f, "cannot parse config"),
            Self::Invalid(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
