// Visitor handlers
// Visitor bodies are forwarded as-is: the VMS schema for them is open-ended.
use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::Value;

use crate::error::GatewayError;
use crate::proxy::endpoints::Operation;
use crate::proxy::server::AppState;
use crate::proxy::session::Identity;
use crate::proxy::signer::CanonicalBody;

/// POST /api/visitors/visitor/list
pub async fn handle_visitor_list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let Json(body) = body.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    tracing::info!("Visitor list requested by {}", identity.username);
    forward(&state, &Operation::visitor_info(), &body).await
}

/// POST /api/register/visitor/register
pub async fn handle_register_visitor(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, GatewayError> {
    let Json(body) = body.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    tracing::info!("Visitor registration submitted by {}", identity.username);
    forward(&state, &Operation::visitor_appointment(), &body).await
}

async fn forward(state: &AppState, operation: &Operation, body: &Value) -> Result<Json<Value>, GatewayError> {
    if !body.is_object() {
        return Err(GatewayError::InvalidRequest(
            "request body must be a JSON object".to_string(),
        ));
    }

    let body = CanonicalBody::from_json(body)?;
    let payload = state.dispatcher.execute(operation, &body).await?;
    Ok(Json(payload))
}
