//! End-to-end tests of the aggregation against mocked upstream services.

use std::{sync::Arc, time::{Duration, Instant}};

use async_trait::async_trait;
use serde_json::{Value, json};
use weather_avg_core::{
    AggregateResult, Aggregator, AverageError, AverageResponse, Config, Coordinate, FailureKind,
    Reading, RequestTarget, Requester, ServiceId, ServiceRegistry, UpstreamError, WeatherAverage,
    WeatherService, provider::{AccuweatherService, NoaaService, WeatherDotComService},
    validate::validate_coordinates,
};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LAT: &str = "45.012345";
const LON: &str = "100.765432";

fn accuweather_body(celsius: f64, fahrenheit: f64) -> Value {
    json!({
        "simpleforecast": {
            "forecastday": [{"current": {"celsius": celsius, "fahrenheit": fahrenheit}}]
        }
    })
}

fn noaa_body(celsius: f64, fahrenheit: f64) -> Value {
    json!({"today": {"current": {"celsius": celsius, "fahrenheit": fahrenheit}}})
}

fn weatherdotcom_body(fahrenheit: &str) -> Value {
    json!({"query": {"results": {"channel": {"condition": {"temp": fahrenheit}}}}})
}

async fn mount_all(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/accuweather"))
        .and(query_param("latitude", LAT))
        .and(query_param("longitude", LON))
        .respond_with(ResponseTemplate::new(200).set_body_json(accuweather_body(20.0, 68.0)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/noaa"))
        .and(query_param("latlon", format!("{LAT},{LON}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(noaa_body(22.0, 71.6)))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/weatherdotcom"))
        .and(body_json(json!({"lat": 45.012345, "lon": 100.765432})))
        .respond_with(ResponseTemplate::new(200).set_body_json(weatherdotcom_body("75")))
        .mount(server)
        .await;
}

fn service_for(server: &MockServer) -> WeatherAverage {
    let mut config = Config::default();
    config.upstream.base_url = server.uri();
    config.upstream.timeout_secs = 5;
    WeatherAverage::from_config(&config).expect("config should be valid")
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn averages_every_service_by_default() {
    let server = MockServer::start().await;
    mount_all(&server).await;

    let result = service_for(&server).average(LAT, LON, &[]).await.unwrap();

    // celsius: 20, 22, 24 (derived from 75F); fahrenheit: 68, 71.6, 75
    assert_eq!(result, AggregateResult { celsius: 22.0, fahrenheit: 71.5 });
}

#[tokio::test]
async fn averages_only_requested_services() {
    let server = MockServer::start().await;
    mount_all(&server).await;

    let result = service_for(&server)
        .average(LAT, LON, &strings(&["noaa", "accuweather"]))
        .await
        .unwrap();

    assert_eq!(result, AggregateResult { celsius: 21.0, fahrenheit: 69.8 });
}

#[tokio::test]
async fn every_pair_of_services_yields_finite_numbers() {
    let server = MockServer::start().await;
    mount_all(&server).await;
    let service = service_for(&server);

    let pairs = [["accuweather", "noaa"], ["accuweather", "weather.com"], ["noaa", "weather.com"]];
    for pair in pairs {
        let result = service.average(LAT, LON, &strings(&pair)).await.unwrap();
        assert!(result.celsius.is_finite(), "{pair:?}");
        assert!(result.fahrenheit.is_finite(), "{pair:?}");
    }
}

#[tokio::test]
async fn readings_keep_request_order_and_precision() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/noaa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(noaa_body(21.4567, 70.6219)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/weatherdotcom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weatherdotcom_body("75")))
        .mount(&server)
        .await;

    let readings = service_for(&server)
        .readings(LAT, LON, &strings(&["weather.com", "noaa"]))
        .await
        .unwrap();

    let ids: Vec<ServiceId> = readings.iter().map(|r| r.service).collect();
    assert_eq!(ids, vec![ServiceId::WeatherDotCom, ServiceId::Noaa]);
    assert_eq!((readings[1].celsius, readings[1].fahrenheit), (21.46, 70.62));
}

#[tokio::test]
async fn upstream_error_status_fails_whole_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/noaa"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_all(&server).await;

    let err = service_for(&server).average(LAT, LON, &[]).await.unwrap_err();

    assert_eq!(err.kind(), FailureKind::UpstreamFailure);
    assert!(matches!(
        err,
        AverageError::Upstream(UpstreamError::Status { service: ServiceId::Noaa, status: 500, .. })
    ));
}

#[tokio::test]
async fn malformed_payload_is_an_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/weatherdotcom"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"query": {}})))
        .mount(&server)
        .await;

    let response = service_for(&server).respond(LAT, LON, &strings(&["weather.com"])).await;

    assert_eq!(response.status_code(), 409);
    match response {
        AverageResponse::Failure { error, .. } => {
            assert_eq!(error.len(), 1);
            assert!(error[0].contains("weather.com"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_an_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accuweather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = service_for(&server)
        .average(LAT, LON, &strings(&["accuweather"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AverageError::Upstream(UpstreamError::Payload { .. })));
}

#[tokio::test]
async fn unreachable_upstream_is_a_connection_failure() {
    let mut config = Config::default();
    config.upstream.base_url = "http://127.0.0.1:9".into();
    let service = WeatherAverage::from_config(&config).unwrap();

    let response = service.respond(LAT, LON, &[]).await;

    assert_eq!(response.status_code(), 409);
    assert!(matches!(
        response,
        AverageResponse::Failure { kind: FailureKind::UpstreamFailure, ref error } if !error.is_empty()
    ));
}

#[tokio::test]
async fn validation_failures_are_reported_before_upstream_calls() {
    let server = MockServer::start().await;
    let service = service_for(&server);

    let response = service.respond("90.000001", LON, &[]).await;
    assert_eq!(
        response,
        AverageResponse::Failure {
            kind: FailureKind::ValidationFailure,
            error: vec!["latitude must be between -90 and 90.".into()],
        }
    );

    let response = service.respond(LAT, LON, &strings(&["noaa", "telefe"])).await;
    assert_eq!(response.status_code(), 400);

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

/// Fails immediately without touching the network.
#[derive(Debug)]
struct Unreachable;

#[async_trait]
impl WeatherService for Unreachable {
    fn id(&self) -> ServiceId {
        ServiceId::Noaa
    }

    fn build_target(&self, _coordinate: &Coordinate) -> RequestTarget {
        RequestTarget::get("/unused")
    }

    fn parse_reading(&self, _body: &Value) -> Result<(f64, f64), UpstreamError> {
        unreachable!("never sends a request")
    }

    async fn get_current_temperature(
        &self,
        _requester: &Requester,
        _coordinate: &Coordinate,
        _decimal_places: u32,
    ) -> Result<Reading, UpstreamError> {
        Err(UpstreamError::Connection {
            service: ServiceId::Noaa,
            message: "connection refused".into(),
        })
    }
}

#[tokio::test]
async fn one_failed_service_discards_the_others() {
    let server = MockServer::start().await;
    mount_all(&server).await;

    let services: Vec<Arc<dyn WeatherService>> = vec![
        Arc::new(AccuweatherService::new()),
        Arc::new(Unreachable),
        Arc::new(WeatherDotComService::new()),
    ];
    let requester = Requester::new(server.uri(), Duration::from_secs(5)).unwrap();
    let aggregator = Aggregator::new(requester, Duration::from_secs(5), 2);
    let coordinate = validate_coordinates(LAT, LON, 6).unwrap();

    let err = aggregator.aggregate(&coordinate, &services).await.unwrap_err();
    assert!(matches!(err, UpstreamError::Connection { service: ServiceId::Noaa, .. }));
}

#[tokio::test]
async fn failure_cancels_slow_siblings() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/accuweather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(accuweather_body(20.0, 68.0))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let services: Vec<Arc<dyn WeatherService>> =
        vec![Arc::new(AccuweatherService::new()), Arc::new(Unreachable)];
    let requester = Requester::new(server.uri(), Duration::from_secs(30)).unwrap();
    let aggregator = Aggregator::new(requester, Duration::from_secs(30), 2);
    let coordinate = validate_coordinates(LAT, LON, 6).unwrap();

    let started = Instant::now();
    let err = aggregator.aggregate(&coordinate, &services).await.unwrap_err();

    assert!(matches!(err, UpstreamError::Connection { .. }));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn slow_service_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/noaa"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(noaa_body(10.0, 50.0))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let registry = ServiceRegistry::with_services(vec![Arc::new(NoaaService::new())]);
    let requester = Requester::new(server.uri(), Duration::from_secs(30)).unwrap();
    let aggregator = Aggregator::new(requester, Duration::from_millis(200), 2);
    let service = WeatherAverage::new(registry, aggregator, 6);

    let err = service.average(LAT, LON, &[]).await.unwrap_err();
    assert!(matches!(
        err,
        AverageError::Upstream(UpstreamError::Timeout { service: ServiceId::Noaa, .. })
    ));
    assert_eq!(err.messages(), vec!["noaa did not answer within 200ms".to_string()]);
}
