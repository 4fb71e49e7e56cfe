use serde_json::{Value, json};

use crate::{
    error::UpstreamError,
    model::Coordinate,
    provider::{RequestTarget, ServiceId, WeatherService, number_at},
    units::fahrenheit_to_celsius,
};

/// Weather.com only reports Fahrenheit; Celsius is derived locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherDotComService;

impl WeatherDotComService {
    pub fn new() -> Self {
        Self
    }
}

impl WeatherService for WeatherDotComService {
    fn id(&self) -> ServiceId {
        ServiceId::WeatherDotCom
    }

    fn build_target(&self, coordinate: &Coordinate) -> RequestTarget {
        RequestTarget::post(
            "/weatherdotcom",
            json!({"lat": coordinate.latitude(), "lon": coordinate.longitude()}),
        )
    }

    fn parse_reading(&self, body: &Value) -> Result<(f64, f64), UpstreamError> {
        let fahrenheit =
            number_at(self.id(), body, &["query", "results", "channel", "condition", "temp"])?;
        Ok((fahrenheit_to_celsius(fahrenheit), fahrenheit))
    }
}
