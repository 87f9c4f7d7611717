// Upstream client implementation
// reqwest-backed transport toward the Artemis host

use futures::future::BoxFuture;
use reqwest::Client;

use super::{UpstreamRequest, UpstreamResponse, UpstreamTransport};
use crate::error::AppResult;
use crate::proxy::config::UpstreamConfig;

pub struct UpstreamClient {
    http_client: Client,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> AppResult<Self> {
        let http_client = crate::utils::http::create_client(config)?;
        Ok(Self { http_client })
    }
}

impl UpstreamTransport for UpstreamClient {
    fn send(&self, request: UpstreamRequest) -> BoxFuture<'_, Result<UpstreamResponse, String>> {
        Box::pin(async move {
            tracing::debug!("Upstream request: {} {}", request.method, request.url);

            // Body goes out as raw bytes: re-serializing here would break Content-MD5
            let response = self
                .http_client
                .request(request.method, &request.url)
                .headers(request.headers)
                .body(request.body)
                .send()
                .await
                .map_err(|e| format!("HTTP request failed: {}", e))?;

            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| format!("Failed to read upstream response: {}", e))?;

            Ok(UpstreamResponse { status, body })
        })
    }
}
