// Endpoint dispatcher
// Tries an operation's candidates strictly in order; the first one the VMS
// both answers and accepts (envelope code 0) wins.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use super::{UpstreamRequest, UpstreamResponse, UpstreamTransport};
use crate::error::GatewayError;
use crate::proxy::common::utils::truncate_chars;
use crate::proxy::endpoints::Operation;
use crate::proxy::signer::{CanonicalBody, Signer};

const UNKNOWN_ERROR: &str = "unknown error";
const ERROR_SNIPPET_CHARS: usize = 100;

/// Why a single candidate attempt failed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptError {
    /// Host not reached: connect, TLS, timeout
    #[error("{0}")]
    Unreachable(String),
    /// Reached, but non-2xx or a non-zero envelope code
    #[error("{0}")]
    Rejected(String),
    /// Reached with 2xx, body is not a JSON object
    #[error("{0}")]
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub succeeded: bool,
    pub payload: Option<Value>,
    pub last_error: Option<String>,
    /// Number of candidates actually sent
    pub attempts: usize,
}

impl DispatchOutcome {
    pub fn into_payload(self) -> Result<Value, GatewayError> {
        match self.payload {
            Some(payload) if self.succeeded => Ok(payload),
            _ => Err(GatewayError::Upstream(
                self.last_error.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
            )),
        }
    }
}

pub struct Dispatcher {
    signer: Signer,
    transport: Arc<dyn UpstreamTransport>,
    attempt_timeout: Duration,
}

impl Dispatcher {
    pub fn new(signer: Signer, transport: Arc<dyn UpstreamTransport>, attempt_timeout: Duration) -> Self {
        Self {
            signer,
            transport,
            attempt_timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.signer.is_configured()
    }

    /// Run `operation` and return its payload, or the last diagnostic as an error.
    pub async fn execute(&self, operation: &Operation, body: &CanonicalBody) -> Result<Value, GatewayError> {
        self.dispatch(operation, body).await?.into_payload()
    }

    /// Candidates are tried one at a time, never concurrently: the VMS is not
    /// known to be idempotent. Dropping the returned future abandons the
    /// in-flight attempt and skips the remaining candidates.
    ///
    /// `Err` is reserved for failures no other candidate could fix
    /// (missing or unusable credentials); upstream failures land in the outcome.
    pub async fn dispatch(
        &self,
        operation: &Operation,
        body: &CanonicalBody,
    ) -> Result<DispatchOutcome, GatewayError> {
        let total = operation.candidates.len();
        let mut last_error: Option<String> = None;

        for (index, candidate) in operation.candidates.iter().enumerate() {
            // 1. Sign over the canonical path (with gateway prefix)
            let signature = self
                .signer
                .sign(&operation.method, candidate.canonical_path(), body)?;

            // 2. Address the host with the execution path, same body bytes
            let request = UpstreamRequest {
                method: operation.method.clone(),
                url: candidate.url(&signature.upstream_host),
                headers: signature.headers()?,
                body: body.to_bytes(),
            };

            // 3. Classify
            match self.attempt(request).await {
                Ok(payload) => {
                    info!(
                        "[{}] candidate {}/{} accepted: {}",
                        operation.name,
                        index + 1,
                        total,
                        candidate.execution_path()
                    );
                    return Ok(DispatchOutcome {
                        succeeded: true,
                        payload: Some(payload),
                        last_error: None,
                        attempts: index + 1,
                    });
                }
                Err(e) => {
                    warn!(
                        "[{}] candidate {}/{} {} failed: {}",
                        operation.name,
                        index + 1,
                        total,
                        candidate.execution_path(),
                        e
                    );
                    last_error = Some(e.to_string());
                }
            }
        }

        Ok(DispatchOutcome {
            succeeded: false,
            payload: None,
            last_error: Some(last_error.unwrap_or_else(|| UNKNOWN_ERROR.to_string())),
            attempts: total,
        })
    }

    async fn attempt(&self, request: UpstreamRequest) -> Result<Value, AttemptError> {
        let response = match tokio::time::timeout(self.attempt_timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(AttemptError::Unreachable(e)),
            Err(_) => {
                return Err(AttemptError::Unreachable(format!(
                    "Upstream did not answer within {:?}",
                    self.attempt_timeout
                )))
            }
        };
        classify(&response)
    }
}

/// Turn a raw upstream reply into an accepted payload or an attempt failure
pub fn classify(response: &UpstreamResponse) -> Result<Value, AttemptError> {
    if !response.status.is_success() {
        let text = String::from_utf8_lossy(&response.body);
        return Err(AttemptError::Rejected(format!(
            "HTTP {}: {}",
            response.status.as_u16(),
            truncate_chars(&text, ERROR_SNIPPET_CHARS)
        )));
    }

    let payload: Value = serde_json::from_slice(&response.body)
        .map_err(|e| AttemptError::Malformed(format!("Invalid JSON from upstream: {}", e)))?;
    if !payload.is_object() {
        return Err(AttemptError::Malformed(format!(
            "Expected a JSON object from upstream, got: {}",
            payload
        )));
    }

    if envelope_succeeded(&payload) {
        Ok(payload)
    } else {
        // Reached and answered, but the VMS reports a logical failure
        Err(AttemptError::Rejected(payload.to_string()))
    }
}

/// `code` of `"0"` or `0`; anything else, including a missing code, is a failure
pub fn envelope_succeeded(payload: &Value) -> bool {
    match payload.get("code") {
        Some(Value::String(code)) => code == "0",
        Some(Value::Number(code)) => code.as_u64() == Some(0),
        _ => false,
    }
}
