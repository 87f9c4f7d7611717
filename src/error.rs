use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Process-level failures: startup, configuration, listener, logging.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TLS error: {0}")]
    Tls(String),
}

// Implement alias for Result to simplify usage
pub type AppResult<T> = Result<T, AppError>;

/// Request-level failures surfaced to inbound callers.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Could not validate credentials")]
    Unauthenticated,

    #[error("Incorrect username or password")]
    InvalidLogin,

    #[error("VMS credentials not configured. Provide APP_KEY and APP_SECRET in vms_keys.json and restart the service")]
    CredentialMissing,

    #[error("VMS credentials are invalid: {0}")]
    CredentialInvalid(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("VMS API Request Failed. VMS Error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Unauthenticated | GatewayError::InvalidLogin => StatusCode::UNAUTHORIZED,
            GatewayError::CredentialMissing | GatewayError::CredentialInvalid(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            GatewayError::Upstream(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Internal(format!("Failed to serialize request body: {}", e))
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "detail": self.to_string() }));

        match self {
            // Bearer challenge, as required for 401 on a bearer-protected resource
            GatewayError::Unauthenticated | GatewayError::InvalidLogin => {
                (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
            }
            _ => (status, body).into_response(),
        }
    }
}
