use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::ServiceId;

/// A validated latitude/longitude pair. Only built by [`crate::validate::validate_coordinates`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub(crate) fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// One normalized temperature from a single upstream call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    pub service: ServiceId,
    pub celsius: f64,
    pub fahrenheit: f64,
    pub observed_at: DateTime<Utc>,
}

/// Mean temperature across every queried service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub fahrenheit: f64,
    pub celsius: f64,
}
