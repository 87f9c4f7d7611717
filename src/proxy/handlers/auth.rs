// Token issuance handler
use axum::{
    extract::{FromRequest, Request, State},
    http::header,
    Form, Json,
};
use serde::Deserialize;

use crate::error::GatewayError;
use crate::proxy::server::AppState;
use crate::proxy::session::TokenResponse;

/// OAuth2 password-grant style login. Extra form fields (grant_type, scope) are ignored.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /token, form-encoded or JSON body
pub async fn handle_token(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<TokenResponse>, GatewayError> {
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false);

    let login = if is_json {
        Json::<LoginRequest>::from_request(request, &state)
            .await
            .map_err(|e| GatewayError::InvalidRequest(e.body_text()))?
            .0
    } else {
        Form::<LoginRequest>::from_request(request, &state)
            .await
            .map_err(|e| GatewayError::InvalidRequest(e.body_text()))?
            .0
    };

    let identity = state.sessions.authenticate(&login.username, &login.password)?;
    let token = state.sessions.issue(&identity)?;
    tracing::info!("Issued access token for {}", identity.username);

    Ok(Json(token))
}
