//! IQAir (AirVisual) outdoor AQI adapter.
//!
//! `GET {base}/v2/nearest_city?lat=..&lon=..&key=..`; the index is the
//! US EPA value at `data.current.pollution.aqius`.

use std::time::Duration;

use serde_json::Value;

use crate::app::ports::AqiSource;
use crate::config::{IqAirConfig, Location};
use crate::error::ServiceError;
use crate::readings::OutdoorAqi;

use super::http;

pub struct IqAirClient {
    agent: ureq::Agent,
    url: String,
    location: Location,
    token: String,
}

impl IqAirClient {
    pub fn new(config: &IqAirConfig, location: Location, timeout: Duration) -> Self {
        Self {
            agent: http::agent(timeout),
            url: format!("{}/v2/nearest_city", config.base_url.trim_end_matches('/')),
            location,
            token: config.token.clone(),
        }
    }
}

impl AqiSource for IqAirClient {
    fn fetch(&mut self) -> Result<OutdoorAqi, ServiceError> {
        let body: Value = self
            .agent
            .get(&self.url)
            .query("lat", &self.location.latitude.to_string())
            .query("lon", &self.location.longitude.to_string())
            .query("key", &self.token)
            .call()
            .map_err(http::map_error)?
            .into_json()
            .map_err(|_| ServiceError::Malformed)?;
        parse_response(&body)
    }
}

/// Extract the AQI from a decoded response body.
pub fn parse_response(body: &Value) -> Result<OutdoorAqi, ServiceError> {
    if body.get("status").and_then(Value::as_str) != Some("success") {
        return Err(ServiceError::Rejected);
    }
    let pollution = body
        .pointer("/data/current/pollution")
        .ok_or(ServiceError::Malformed)?;
    let aqi = pollution
        .get("aqius")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(ServiceError::Malformed)?;
    let observed = pollution
        .get("ts")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned();
    Ok(OutdoorAqi { aqi, observed })
}
