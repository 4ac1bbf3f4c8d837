//! Adafruit IO telemetry adapter.
//!
//! One `POST {base}/api/v2/{user}/feeds/{feed}/data` per value, with the
//! account key in `X-AIO-Key`.

use std::time::Duration;

use log::info;
use serde_json::json;

use crate::app::ports::TelemetryPort;
use crate::config::AdafruitConfig;
use crate::error::ServiceError;

use super::http;

pub struct AdafruitIo {
    agent: ureq::Agent,
    feeds_url: String,
    key: String,
    eco2_feed: String,
    tvoc_feed: String,
}

impl AdafruitIo {
    pub fn new(config: &AdafruitConfig, timeout: Duration) -> Self {
        Self {
            agent: http::agent(timeout),
            feeds_url: format!(
                "{}/api/v2/{}/feeds",
                config.base_url.trim_end_matches('/'),
                config.username
            ),
            key: config.key.clone(),
            eco2_feed: config.eco2_feed.clone(),
            tvoc_feed: config.tvoc_feed.clone(),
        }
    }

    pub fn data_url(&self, feed: &str) -> String {
        format!("{}/{}/data", self.feeds_url, feed)
    }

    fn send(&self, feed: &str, value: u32) -> Result<(), ServiceError> {
        self.agent
            .post(&self.data_url(feed))
            .set("X-AIO-Key", &self.key)
            .send_json(json!({ "value": value }))
            .map_err(http::map_error)?;
        Ok(())
    }
}

impl TelemetryPort for AdafruitIo {
    fn push(&mut self, eco2: u32, tvoc: u32) -> Result<(), ServiceError> {
        self.send(&self.eco2_feed, eco2)?;
        self.send(&self.tvoc_feed, tvoc)?;
        info!("Readings sent to Adafruit IO");
        Ok(())
    }
}
