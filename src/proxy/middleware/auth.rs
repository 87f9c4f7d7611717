// Session gate middleware
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::GatewayError;
use crate::proxy::server::AppState;

/// Bearer token authentication middleware.
///
/// Runs before every VMS operation handler; a rejected caller never reaches
/// the dispatcher. The verified identity is left in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    // Log the request method and URI
    tracing::info!("Request: {} {}", request.method(), request.uri());

    let identity = match bearer_token(request.headers()) {
        Some(token) => state.sessions.verify(token)?,
        None => return Err(GatewayError::Unauthenticated),
    };

    tracing::debug!("Authenticated as {}", identity.username);
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer ").or_else(|| s.strip_prefix("bearer ")))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
