use crate::error::{AppError, AppResult};
use crate::proxy::config::{ProxyConfig, SessionConfig, UpstreamConfig};
use serde::{Deserialize, Serialize};

/// Longest session a token may grant (7 days)
pub const MAX_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

/// Proxy schemes the upstream client can actually speak
const PROXY_SCHEMES: [&str; 4] = ["http", "https", "socks5", "socks5h"];

/// Application configuration (server_config.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ProxyConfig,
    pub upstream: UpstreamConfig,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            server: ProxyConfig::default(),
            upstream: UpstreamConfig::default(),
            session: SessionConfig::default(),
        }
    }

    /// Reject values that would only fail later, at request time.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.port == 0 {
            return Err(AppError::Config("server.port must not be 0".to_string()));
        }

        let host = url::Url::parse(&self.upstream.host).map_err(|e| {
            AppError::Config(format!("upstream.host {:?} is not a valid URL: {}", self.upstream.host, e))
        })?;
        if host.scheme() != "http" && host.scheme() != "https" {
            return Err(AppError::Config(format!(
                "upstream.host must use http or https, got {}",
                host.scheme()
            )));
        }

        if self.upstream.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "upstream.request_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.upstream.proxy.enabled {
            if self.upstream.proxy.url.is_empty() {
                return Err(AppError::Config(
                    "upstream.proxy.url is required when the proxy is enabled".to_string(),
                ));
            }
            let proxy = url::Url::parse(&self.upstream.proxy.url).map_err(|e| {
                AppError::Config(format!(
                    "upstream.proxy.url {:?} is not a valid URL: {}",
                    self.upstream.proxy.url, e
                ))
            })?;
            if !PROXY_SCHEMES.contains(&proxy.scheme()) {
                return Err(AppError::Config(format!(
                    "upstream.proxy.url must use one of {:?}, got {}",
                    PROXY_SCHEMES,
                    proxy.scheme()
                )));
            }
        }

        if self.session.jwt_secret.is_empty() {
            return Err(AppError::Config("session.jwt_secret must not be empty".to_string()));
        }
        if self.session.token_ttl_minutes <= 0 || self.session.token_ttl_minutes > MAX_TOKEN_TTL_MINUTES {
            return Err(AppError::Config(format!(
                "session.token_ttl_minutes must be between 1 and {}",
                MAX_TOKEN_TTL_MINUTES
            )));
        }
        if self.session.username.is_empty() || self.session.password.is_empty() {
            return Err(AppError::Config(
                "session.username and session.password must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}
