//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements          | Connects to                 |
//! |---------------|---------------------|-----------------------------|
//! | `adafruit`    | TelemetryPort       | Adafruit IO REST API        |
//! | `config_file` | BaselinePort        | JSON config file            |
//! | `history`     | HistoryLog          | Append-only text logs       |
//! | `iqair`       | AqiSource           | IQAir nearest-city API      |
//! | `log_sink`    | EventSink           | `log` facade                |
//! | `sim`         | GasSensorPort       | Simulated SGP30             |
//! |               | ProximityPort       | Simulated LTR-559           |
//! |               | DisplayPort         | Simulated panel             |
//! | `time`        | ClockPort           | System clock                |

pub mod adafruit;
pub mod config_file;
pub mod history;
mod http;
pub mod iqair;
pub mod log_sink;
pub mod sim;
pub mod time;
