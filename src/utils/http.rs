use reqwest::{Client, Proxy};
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::proxy::config::UpstreamConfig;

/// Create the HTTP client used to reach the VMS host
pub fn create_client(config: &UpstreamConfig) -> AppResult<Client> {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.request_timeout_secs));

    if config.accept_invalid_certs {
        tracing::warn!(
            "Upstream TLS certificate verification is DISABLED (upstream.accept_invalid_certs = true) for {}",
            config.host
        );
        builder = builder.danger_accept_invalid_certs(true);
    }

    if config.proxy.enabled && !config.proxy.url.is_empty() {
        let proxy = Proxy::all(&config.proxy.url).map_err(|e| {
            AppError::Config(format!("Invalid proxy address: {}, error: {}", config.proxy.url, e))
        })?;
        builder = builder.proxy(proxy);
        tracing::info!("HTTP client upstream proxy enabled: {}", config.proxy.url);
    }

    Ok(builder.build()?)
}
