// Upstream module - signed calls to the VMS host

pub mod client;
pub mod dispatcher;
#[cfg(test)]
pub mod mock;

use bytes::Bytes;
use futures::future::BoxFuture;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};

pub use client::UpstreamClient;
pub use dispatcher::{DispatchOutcome, Dispatcher};

/// Fully signed request, ready to send
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Raw upstream reply; classification happens in the dispatcher
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Network seam between the dispatcher and the HTTP client.
///
/// `Err` means the host was not reached (connect, TLS, timeout, reset);
/// any HTTP status, including 5xx, is an `Ok` response.
pub trait UpstreamTransport: Send + Sync {
    fn send(&self, request: UpstreamRequest) -> BoxFuture<'_, Result<UpstreamResponse, String>>;
}
