use std::{fmt, num::ParseFloatError, time::Duration};

use thiserror::Error;

use crate::provider::ServiceId;

/// Which coordinate a validation issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateField {
    Latitude,
    Longitude,
}

impl CoordinateField {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinateField::Latitude => "latitude",
            CoordinateField::Longitude => "longitude",
        }
    }

    /// Inclusive absolute bound for the field.
    pub fn limit(&self) -> f64 {
        match self {
            CoordinateField::Latitude => 90.0,
            CoordinateField::Longitude => 180.0,
        }
    }
}

impl fmt::Display for CoordinateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single rejected piece of input. Its `Display` is the exact message shown to callers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationIssue {
    #[error("{field} must be a number. {source}")]
    Parse {
        field: CoordinateField,
        source: ParseFloatError,
    },

    #[error("{field} must be between -{limit} and {limit}.", limit = .field.limit())]
    Range { field: CoordinateField },

    #[error("{field} must have {max} decimal places max.")]
    Precision { field: CoordinateField, max: u32 },

    #[error("service must be {allowed} only.")]
    ServiceName { allowed: String },
}

/// Ordered, non-empty collection of validation issues.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Returns `None` when there is nothing to report.
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Option<Self> {
        if issues.is_empty() { None } else { Some(Self { issues }) }
    }

    pub fn single(issue: ValidationIssue) -> Self {
        Self { issues: vec![issue] }
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join(" "))
    }
}

impl std::error::Error for ValidationError {}

/// Anything that went wrong while talking to an upstream service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("could not reach {service}: {message}")]
    Connection { service: ServiceId, message: String },

    #[error("{service} did not answer within {timeout:?}")]
    Timeout { service: ServiceId, timeout: Duration },

    #[error("{service} responded with status {status}: {body}")]
    Status {
        service: ServiceId,
        status: u16,
        body: String,
    },

    #[error("{service} returned an unusable payload: {message}")]
    Payload { service: ServiceId, message: String },

    #[error("no weather services were selected")]
    NoReadings,
}

impl UpstreamError {
    pub fn payload(service: ServiceId, message: impl Into<String>) -> Self {
        Self::Payload {
            service,
            message: message.into(),
        }
    }

    pub fn from_reqwest(service: ServiceId, err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout { service, timeout }
        } else if err.is_decode() {
            Self::payload(service, err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                service,
                status: status.as_u16(),
                body: String::new(),
            }
        } else {
            Self::Connection {
                service,
                message: err.to_string(),
            }
        }
    }
}

/// How a failed request is reported at the transport boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    ValidationFailure,
    UpstreamFailure,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ValidationFailure => "validation-failure",
            FailureKind::UpstreamFailure => "upstream-failure",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            FailureKind::ValidationFailure => 400,
            FailureKind::UpstreamFailure => 409,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AverageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl AverageError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AverageError::Validation(_) => FailureKind::ValidationFailure,
            AverageError::Upstream(_) => FailureKind::UpstreamFailure,
        }
    }

    /// Messages for the `error` list of a failure payload. Never empty.
    pub fn messages(&self) -> Vec<String> {
        match self {
            AverageError::Validation(err) => err.messages(),
            AverageError::Upstream(err) => vec![err.to_string()],
        }
    }
}
