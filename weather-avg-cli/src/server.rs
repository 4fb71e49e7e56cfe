use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    http::StatusCode,
    routing::get,
};
use tokio::net::TcpListener;
use tracing::info;
use weather_avg_core::{AverageResponse, WeatherAverage};

pub fn router(service: Arc<WeatherAverage>) -> Router {
    Router::new()
        .route("/{latitude}/{longitude}/", get(weather_average))
        .route("/{latitude}/{longitude}", get(weather_average))
        .with_state(service)
}

pub async fn run(service: WeatherAverage, bind: &str) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(service)))
        .await
        .context("HTTP server stopped unexpectedly")
}

async fn weather_average(
    State(service): State<Arc<WeatherAverage>>,
    Path((latitude, longitude)): Path<(String, String)>,
    RawQuery(query): RawQuery,
) -> (StatusCode, Json<AverageResponse>) {
    let services = services_param(query.as_deref());
    let response = service.respond(&latitude, &longitude, &services).await;
    let status =
        StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    info!(%latitude, %longitude, ?services, status = status.as_u16(), "weather average");
    (status, Json(response))
}

/// Every value of the repeatable `services` query parameter, in order.
fn services_param(query: Option<&str>) -> Vec<String> {
    let Some(query) = query else {
        return Vec::new();
    };

    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| key == "services")
        .map(|(_, value)| value.into_owned())
        .collect()
}
