use serde_json::Value;

use crate::{
    error::UpstreamError,
    extract::get_value,
    model::Coordinate,
    provider::{RequestTarget, ServiceId, WeatherService, number_at},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct AccuweatherService;

impl AccuweatherService {
    pub fn new() -> Self {
        Self
    }
}

impl WeatherService for AccuweatherService {
    fn id(&self) -> ServiceId {
        ServiceId::Accuweather
    }

    fn build_target(&self, coordinate: &Coordinate) -> RequestTarget {
        RequestTarget::get(format!(
            "/accuweather?latitude={}&longitude={}",
            coordinate.latitude(),
            coordinate.longitude()
        ))
    }

    fn parse_reading(&self, body: &Value) -> Result<(f64, f64), UpstreamError> {
        let today = get_value(body, &["simpleforecast", "forecastday"])
            .and_then(Value::as_array)
            .and_then(|days| days.first())
            .ok_or_else(|| {
                UpstreamError::payload(self.id(), "missing 'simpleforecast.forecastday[0]'")
            })?;

        let celsius = number_at(self.id(), today, &["current", "celsius"])?;
        let fahrenheit = number_at(self.id(), today, &["current", "fahrenheit"])?;
        Ok((celsius, fahrenheit))
    }
}
