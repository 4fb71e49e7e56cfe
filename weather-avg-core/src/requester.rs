use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{error::UpstreamError, provider::{RequestTarget, ServiceId}};

/// Shared HTTP transport for every upstream. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct Requester {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl Requester {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `target` and return the decoded JSON body of a successful response.
    #[instrument(skip(self, target), fields(method = %target.method, path = %target.path))]
    pub async fn send(
        &self,
        service: ServiceId,
        target: &RequestTarget,
    ) -> Result<Value, UpstreamError> {
        let url = format!("{}{}", self.base_url, target.path);

        let mut request = self.http.request(target.method.clone(), &url);
        if let Some(body) = &target.body {
            request = request.json(body);
        }

        let res = request
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(service, e, self.timeout))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| UpstreamError::from_reqwest(service, e, self.timeout))?;
        debug!(%status, bytes = body.len(), "upstream responded");

        if !status.is_success() {
            return Err(UpstreamError::Status {
                service,
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        serde_json::from_str(&body)
            .map_err(|e| UpstreamError::payload(service, format!("invalid JSON: {e}")))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
