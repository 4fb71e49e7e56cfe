//! Core library for the `weather-avg` tool.
//!
//! This crate defines:
//! - Input validation for coordinates and service names
//! - Abstraction over the upstream weather services
//! - Concurrent, all-or-nothing aggregation of their readings
//! - Configuration handling
//!
//! It is used by `weather-avg-cli`, which exposes it on the command line and over HTTP.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod provider;
pub mod registry;
pub mod requester;
pub mod service;
pub mod units;
pub mod validate;

pub use aggregate::Aggregator;
pub use config::{Config, PrecisionConfig, ServerConfig, UpstreamConfig};
pub use error::{AverageError, FailureKind, UpstreamError, ValidationError, ValidationIssue};
pub use model::{AggregateResult, Coordinate, Reading};
pub use provider::{RequestTarget, ServiceId, WeatherService};
pub use registry::ServiceRegistry;
pub use requester::Requester;
pub use service::{AverageResponse, WeatherAverage};
