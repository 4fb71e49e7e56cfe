use serde_json::Value;

use crate::{
    error::UpstreamError,
    extract::get_value,
    model::Coordinate,
    provider::{RequestTarget, ServiceId, WeatherService, number_at},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct NoaaService;

impl NoaaService {
    pub fn new() -> Self {
        Self
    }
}

impl WeatherService for NoaaService {
    fn id(&self) -> ServiceId {
        ServiceId::Noaa
    }

    fn build_target(&self, coordinate: &Coordinate) -> RequestTarget {
        RequestTarget::get(format!(
            "/noaa?latlon={},{}",
            coordinate.latitude(),
            coordinate.longitude()
        ))
    }

    fn parse_reading(&self, body: &Value) -> Result<(f64, f64), UpstreamError> {
        let current = get_value(body, &["today", "current"])
            .ok_or_else(|| UpstreamError::payload(self.id(), "missing 'today.current'"))?;

        let celsius = number_at(self.id(), current, &["celsius"])?;
        let fahrenheit = number_at(self.id(), current, &["fahrenheit"])?;
        Ok((celsius, fahrenheit))
    }
}
