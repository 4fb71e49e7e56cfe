use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    aggregate::Aggregator,
    config::Config,
    error::{AverageError, FailureKind, ValidationError},
    model::{AggregateResult, Coordinate, Reading},
    provider::WeatherService,
    registry::ServiceRegistry,
    requester::Requester,
    validate::{validate_coordinates, validate_services},
};

/// Entry point used by the transport boundaries: raw strings in, averaged temperature
/// or classified failure out.
#[derive(Debug, Clone)]
pub struct WeatherAverage {
    registry: ServiceRegistry,
    aggregator: Aggregator,
    coordinate_decimal_places: u32,
}

/// Body and status of a finished request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AverageResponse {
    Success(AggregateResult),
    Failure {
        #[serde(skip)]
        kind: FailureKind,
        error: Vec<String>,
    },
}

impl AverageResponse {
    pub fn status_code(&self) -> u16 {
        match self {
            AverageResponse::Success(_) => 200,
            AverageResponse::Failure { kind, .. } => kind.status_code(),
        }
    }
}

impl From<Result<AggregateResult, AverageError>> for AverageResponse {
    fn from(result: Result<AggregateResult, AverageError>) -> Self {
        match result {
            Ok(avg) => AverageResponse::Success(avg),
            Err(err) => AverageResponse::Failure { kind: err.kind(), error: err.messages() },
        }
    }
}

impl WeatherAverage {
    pub fn new(
        registry: ServiceRegistry,
        aggregator: Aggregator,
        coordinate_decimal_places: u32,
    ) -> Self {
        Self { registry, aggregator, coordinate_decimal_places }
    }

    /// Build the default registry and an HTTP requester from `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let requester = Requester::new(config.upstream.base_url.clone(), config.call_timeout())
            .context("Failed to build HTTP client for upstream services")?;
        let aggregator = Aggregator::new(
            requester,
            config.call_timeout(),
            config.precision.temperature_decimal_places,
        );

        Ok(Self::new(
            ServiceRegistry::default(),
            aggregator,
            config.precision.coordinate_decimal_places,
        ))
    }

    #[instrument(skip(self))]
    pub async fn average(
        &self,
        latitude: &str,
        longitude: &str,
        services: &[String],
    ) -> Result<AggregateResult, AverageError> {
        let (coordinate, selected) = self.prepare(latitude, longitude, services)?;
        Ok(self.aggregator.aggregate(&coordinate, &selected).await?)
    }

    /// Validated per-service readings, before averaging.
    pub async fn readings(
        &self,
        latitude: &str,
        longitude: &str,
        services: &[String],
    ) -> Result<Vec<Reading>, AverageError> {
        let (coordinate, selected) = self.prepare(latitude, longitude, services)?;
        Ok(self.aggregator.collect_readings(&coordinate, &selected).await?)
    }

    fn prepare(
        &self,
        latitude: &str,
        longitude: &str,
        services: &[String],
    ) -> Result<(Coordinate, Vec<Arc<dyn WeatherService>>), ValidationError> {
        let coordinate =
            validate_coordinates(latitude, longitude, self.coordinate_decimal_places)?;
        let ids = validate_services(&self.registry, services)?;
        let selected = self.registry.resolve(&ids);
        info!(services = ?selected.iter().map(|s| s.id()).collect::<Vec<_>>(), "querying services");
        Ok((coordinate, selected))
    }

    /// Same as [`WeatherAverage::average`], folded into a response ready to serialize.
    pub async fn respond(
        &self,
        latitude: &str,
        longitude: &str,
        services: &[String],
    ) -> AverageResponse {
        self.average(latitude, longitude, services).await.into()
    }
}
