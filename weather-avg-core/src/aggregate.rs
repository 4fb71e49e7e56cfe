use std::{sync::Arc, time::Duration};

use futures::future::try_join_all;
use tracing::{info, instrument, warn};

use crate::{
    error::UpstreamError,
    model::{AggregateResult, Coordinate, Reading},
    provider::WeatherService,
    requester::Requester,
    units::round_to,
};

const AVERAGE_DECIMAL_PLACES: u32 = 1;

/// Fans a request out to several services and averages what comes back.
///
/// All or nothing: a single failing service fails the whole aggregation and
/// the calls still in flight are dropped.
#[derive(Debug, Clone)]
pub struct Aggregator {
    requester: Requester,
    call_timeout: Duration,
    temperature_decimal_places: u32,
}

impl Aggregator {
    pub fn new(requester: Requester, call_timeout: Duration, temperature_decimal_places: u32) -> Self {
        Self { requester, call_timeout, temperature_decimal_places }
    }

    #[instrument(skip(self, services), fields(services = services.len()))]
    pub async fn aggregate(
        &self,
        coordinate: &Coordinate,
        services: &[Arc<dyn WeatherService>],
    ) -> Result<AggregateResult, UpstreamError> {
        let readings = self.collect_readings(coordinate, services).await?;
        let result = average(&readings).ok_or(UpstreamError::NoReadings)?;
        info!(celsius = result.celsius, fahrenheit = result.fahrenheit, "aggregated temperature");
        Ok(result)
    }

    /// One reading per service, in the order the services were given.
    pub async fn collect_readings(
        &self,
        coordinate: &Coordinate,
        services: &[Arc<dyn WeatherService>],
    ) -> Result<Vec<Reading>, UpstreamError> {
        if services.is_empty() {
            return Err(UpstreamError::NoReadings);
        }

        let calls = services.iter().map(|service| self.fetch(service.as_ref(), coordinate));
        try_join_all(calls).await
    }

    async fn fetch(
        &self,
        service: &dyn WeatherService,
        coordinate: &Coordinate,
    ) -> Result<Reading, UpstreamError> {
        let call = service.get_current_temperature(
            &self.requester,
            coordinate,
            self.temperature_decimal_places,
        );

        let outcome = match tokio::time::timeout(self.call_timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(UpstreamError::Timeout {
                service: service.id(),
                timeout: self.call_timeout,
            }),
        };

        if let Err(err) = &outcome {
            warn!(service = %service.id(), error = %err, "upstream call failed");
        }
        outcome
    }
}

/// Mean Celsius and mean Fahrenheit, each computed on its own and rounded to one place.
/// `None` when there is nothing to average.
pub fn average(readings: &[Reading]) -> Option<AggregateResult> {
    if readings.is_empty() {
        return None;
    }

    let count = readings.len() as f64;
    let celsius = readings.iter().map(|r| r.celsius).sum::<f64>() / count;
    let fahrenheit = readings.iter().map(|r| r.fahrenheit).sum::<f64>() / count;

    Some(AggregateResult {
        fahrenheit: round_to(fahrenheit, AVERAGE_DECIMAL_PLACES),
        celsius: round_to(celsius, AVERAGE_DECIMAL_PLACES),
    })
}
