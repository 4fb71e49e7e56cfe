use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{convert::TryFrom, fmt::Debug};
use tracing::debug;

use crate::{
    error::UpstreamError,
    model::{Coordinate, Reading},
    requester::Requester,
    units::round_to,
};

pub mod accuweather;
pub mod noaa;
pub mod weatherdotcom;

pub use accuweather::AccuweatherService;
pub use noaa::NoaaService;
pub use weatherdotcom::WeatherDotComService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceId {
    #[serde(rename = "accuweather")]
    Accuweather,
    #[serde(rename = "noaa")]
    Noaa,
    #[serde(rename = "weather.com")]
    WeatherDotCom,
}

impl ServiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceId::Accuweather => "accuweather",
            ServiceId::Noaa => "noaa",
            ServiceId::WeatherDotCom => "weather.com",
        }
    }

    pub const fn all() -> &'static [ServiceId] {
        &[ServiceId::Accuweather, ServiceId::Noaa, ServiceId::WeatherDotCom]
    }
}

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ServiceId {
    type Error = UnknownService;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ServiceId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == value)
            .ok_or_else(|| UnknownService(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown weather service '{0}'")]
pub struct UnknownService(pub String);

/// What to send to an upstream: method, path below the base URL and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestTarget {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

impl RequestTarget {
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::GET, path: path.into(), body: None }
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self { method: Method::POST, path: path.into(), body: Some(body) }
    }
}

/// One upstream weather service. Implementations hold no per-request state,
/// so a single instance can serve any number of concurrent aggregations.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    fn id(&self) -> ServiceId;

    fn build_target(&self, coordinate: &Coordinate) -> RequestTarget;

    /// Pull `(celsius, fahrenheit)` out of the upstream's JSON body.
    fn parse_reading(&self, body: &Value) -> Result<(f64, f64), UpstreamError>;

    async fn get_current_temperature(
        &self,
        requester: &Requester,
        coordinate: &Coordinate,
        decimal_places: u32,
    ) -> Result<Reading, UpstreamError> {
        let target = self.build_target(coordinate);
        let body = requester.send(self.id(), &target).await?;
        let (celsius, fahrenheit) = self.parse_reading(&body)?;

        let reading = Reading {
            service: self.id(),
            celsius: round_to(celsius, decimal_places),
            fahrenheit: round_to(fahrenheit, decimal_places),
            observed_at: Utc::now(),
        };
        debug!(
            service = %reading.service,
            celsius = reading.celsius,
            fahrenheit = reading.fahrenheit,
            "parsed reading"
        );

        Ok(reading)
    }
}

/// Read a numeric field, reporting the key path when it is missing or not a number.
pub(crate) fn number_at(
    service: ServiceId,
    value: &Value,
    key_path: &[&str],
) -> Result<f64, UpstreamError> {
    let found = crate::extract::get_value(value, key_path).ok_or_else(|| {
        UpstreamError::payload(service, format!("missing '{}'", key_path.join(".")))
    })?;

    crate::extract::as_number(found).ok_or_else(|| {
        UpstreamError::payload(service, format!("'{}' is not a number", key_path.join(".")))
    })
}
