// System handlers
use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde_json::{json, Value};

use crate::error::GatewayError;
use crate::proxy::endpoints::Operation;
use crate::proxy::server::AppState;
use crate::proxy::session::Identity;
use crate::proxy::signer::CanonicalBody;

/// GET /api/system/version: signed connectivity probe against the VMS
pub async fn handle_version(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Value>, GatewayError> {
    tracing::info!("VMS version probe by {}", identity.username);
    let body = CanonicalBody::from_json(&json!({}))?;
    let payload = state.dispatcher.execute(&Operation::version(), &body).await?;
    Ok(Json(payload))
}

/// Health check handler
pub async fn health_check_handler(State(state): State<AppState>) -> Response {
    Json(json!({
        "status": "ok",
        "credentials_configured": state.dispatcher.is_configured()
    }))
    .into_response()
}
