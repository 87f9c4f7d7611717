// Linked door handler
use axum::{body::Bytes, extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::GatewayError;
use crate::proxy::endpoints::Operation;
use crate::proxy::mappers::normalize_list;
use crate::proxy::server::AppState;
use crate::proxy::session::Identity;
use crate::proxy::signer::CanonicalBody;

/// Paging sent to acsDoorList. Field order is the wire order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorListQuery {
    #[serde(default = "default_page_no")]
    pub page_no: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl Default for DoorListQuery {
    fn default() -> Self {
        Self {
            page_no: default_page_no(),
            page_size: default_page_size(),
        }
    }
}

fn default_page_no() -> u32 {
    1
}

fn default_page_size() -> u32 {
    200
}

/// An empty body means default paging; anything else must parse.
fn parse_query(body: &[u8]) -> Result<DoorListQuery, GatewayError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DoorListQuery::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid paging body: {}", e)))
}

#[derive(Debug, Serialize)]
pub struct DoorListResponse {
    pub status: u16,
    pub doors: Vec<Value>,
}

/// POST /api/doors/door/linked
pub async fn handle_linked_doors(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    body: Bytes,
) -> Result<Json<DoorListResponse>, GatewayError> {
    let query = parse_query(&body)?;
    tracing::info!(
        "Linked door list requested by {} (page {} size {})",
        identity.username,
        query.page_no,
        query.page_size
    );

    let body = CanonicalBody::from_json(&query)?;
    let payload = state.dispatcher.execute(&Operation::linked_doors(), &body).await?;

    let list = normalize_list(&payload);
    Ok(Json(DoorListResponse {
        status: list.status,
        doors: list.items,
    }))
}
