use crate::{
    error::{CoordinateField, ValidationError, ValidationIssue},
    model::Coordinate,
    provider::ServiceId,
    registry::ServiceRegistry,
};

/// Parse and check a raw latitude/longitude pair.
///
/// Unparseable input fails straight away with one message per bad field.
/// Otherwise every range and precision violation is collected and reported together.
pub fn validate_coordinates(
    latitude: &str,
    longitude: &str,
    max_decimal_places: u32,
) -> Result<Coordinate, ValidationError> {
    let lat = parse_field(CoordinateField::Latitude, latitude);
    let lon = parse_field(CoordinateField::Longitude, longitude);

    let (lat, lon) = match (lat, lon) {
        (Ok(lat), Ok(lon)) => (lat, lon),
        (Err(issue), Ok(_)) | (Ok(_), Err(issue)) => return Err(ValidationError::single(issue)),
        (Err(lat_issue), Err(lon_issue)) => {
            let mut err = ValidationError::single(lat_issue);
            err.push(lon_issue);
            return Err(err);
        }
    };

    let mut issues = Vec::new();
    for (field, value) in [(CoordinateField::Latitude, lat), (CoordinateField::Longitude, lon)] {
        if !(-field.limit()..=field.limit()).contains(&value) {
            issues.push(ValidationIssue::Range { field });
        }
    }
    for (field, value) in [(CoordinateField::Latitude, lat), (CoordinateField::Longitude, lon)] {
        if decimal_places(value) > max_decimal_places as usize {
            issues.push(ValidationIssue::Precision { field, max: max_decimal_places });
        }
    }

    match ValidationError::from_issues(issues) {
        Some(err) => Err(err),
        None => Ok(Coordinate::new(lat, lon)),
    }
}

/// Check requested service tags against the registry.
///
/// An empty request is valid and means "every service". The first unknown tag fails the
/// whole request with a single message.
pub fn validate_services(
    registry: &ServiceRegistry,
    requested: &[String],
) -> Result<Vec<ServiceId>, ValidationError> {
    requested
        .iter()
        .map(|tag| {
            registry.get(tag).map(|service| service.id()).ok_or_else(|| {
                ValidationError::single(ValidationIssue::ServiceName {
                    allowed: registry.describe_ids(),
                })
            })
        })
        .collect()
}

fn parse_field(field: CoordinateField, raw: &str) -> Result<f64, ValidationIssue> {
    raw.trim()
        .parse::<f64>()
        .map_err(|source| ValidationIssue::Parse { field, source })
}

// Counted on the shortest round-trip rendering, so trailing zeros in the input don't count.
fn decimal_places(value: f64) -> usize {
    let rendered = value.to_string();
    rendered.split_once('.').map_or(0, |(_, fraction)| fraction.len())
}
