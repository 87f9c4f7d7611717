//! Artemis request signing.
//!
//! The VMS gateway authenticates every call with an HMAC-SHA256 signature
//! over a fixed string built from the method, content headers, the body
//! digest, the `x-ca-key` header and the canonical path:
//!
//! ```text
//! POST\n
//! application/json\n
//! <Content-MD5>\n
//! application/json;charset=UTF-8\n
//! x-ca-key:<key>\n
//! /artemis/api/...
//! ```
//!
//! The digest is taken over the exact body bytes that go on the wire, so the
//! body is serialized once into a [`CanonicalBody`] and reused for sending.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use sha2::Sha256;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::proxy::credentials::UpstreamCredential;

type HmacSha256 = Hmac<Sha256>;

pub const ACCEPT_VALUE: &str = "application/json";
pub const CONTENT_TYPE_VALUE: &str = "application/json;charset=UTF-8";
pub const SIGNED_HEADER_NAMES: &str = "x-ca-key";

const CONTENT_MD5: HeaderName = HeaderName::from_static("content-md5");
const X_CA_KEY: HeaderName = HeaderName::from_static("x-ca-key");
const X_CA_SIGNATURE: HeaderName = HeaderName::from_static("x-ca-signature");
const X_CA_SIGNATURE_HEADERS: HeaderName = HeaderName::from_static("x-ca-signature-headers");

/// JSON body serialized exactly once: compact, keys in insertion order.
///
/// These bytes are both hashed into `Content-MD5` and transmitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalBody(Bytes);

impl CanonicalBody {
    pub fn from_json<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_vec(value).map(|v| Self(Bytes::from(v)))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Cheap handle to the same bytes, for the outbound request
    pub fn to_bytes(&self) -> Bytes {
        self.0.clone()
    }
}

/// Headers and metadata for one signed upstream call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureResult {
    pub content_md5: String,
    pub signature: String,
    pub signed_header_names: String,
    pub upstream_host: String,
    pub key: String,
}

impl SignatureResult {
    /// Accept, Content-Type, Content-MD5, X-Ca-Key, X-Ca-Signature, X-Ca-Signature-Headers
    pub fn headers(&self) -> Result<HeaderMap, GatewayError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_VALUE));
        headers.insert(CONTENT_MD5, header_value(&self.content_md5)?);
        headers.insert(X_CA_KEY, header_value(&self.key)?);
        headers.insert(X_CA_SIGNATURE, header_value(&self.signature)?);
        headers.insert(X_CA_SIGNATURE_HEADERS, header_value(&self.signed_header_names)?);
        Ok(headers)
    }
}

fn header_value(value: &str) -> Result<HeaderValue, GatewayError> {
    HeaderValue::from_str(value).map_err(|_| {
        GatewayError::CredentialInvalid("APP_KEY contains characters not allowed in a header".to_string())
    })
}

/// Signs requests for one upstream host with the process credential
#[derive(Debug, Clone)]
pub struct Signer {
    credential: Arc<UpstreamCredential>,
    upstream_host: String,
}

impl Signer {
    pub fn new(credential: Arc<UpstreamCredential>, upstream_host: impl Into<String>) -> Self {
        Self {
            credential,
            upstream_host: upstream_host.into(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.credential.is_configured()
    }

    pub fn sign(
        &self,
        method: &Method,
        canonical_path: &str,
        body: &CanonicalBody,
    ) -> Result<SignatureResult, GatewayError> {
        // Never sign with an empty key or secret
        if !self.credential.is_configured() {
            return Err(GatewayError::CredentialMissing);
        }

        let content_md5 = content_md5(body.as_bytes());
        let string_to_sign = string_to_sign(
            method.as_str(),
            &content_md5,
            self.credential.key(),
            canonical_path,
        );
        let signature = hmac_sha256_base64(self.credential.secret(), &string_to_sign)?;

        Ok(SignatureResult {
            content_md5,
            signature,
            signed_header_names: SIGNED_HEADER_NAMES.to_string(),
            upstream_host: self.upstream_host.clone(),
            key: self.credential.key().to_string(),
        })
    }
}

/// base64(MD5(body))
pub fn content_md5(body: &[u8]) -> String {
    STANDARD.encode(Md5::digest(body))
}

/// No trailing newline: the canonical path closes the string.
pub fn string_to_sign(method: &str, content_md5: &str, key: &str, canonical_path: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}\n{}:{}\n{}",
        method, ACCEPT_VALUE, content_md5, CONTENT_TYPE_VALUE, SIGNED_HEADER_NAMES, key, canonical_path
    )
}

fn hmac_sha256_base64(secret: &str, data: &str) -> Result<String, GatewayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GatewayError::Internal(format!("HMAC init failed: {}", e)))?;
    mac.update(data.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VISITOR_INFO: &str = "/artemis/api/visitor/v1/visitor/visitorInfo";

    fn signer(key: &str, secret: &str) -> Signer {
        Signer::new(
            Arc::new(UpstreamCredential::new(key, secret)),
            "https://10.0.0.1/artemis",
        )
    }

    #[test]
    fn test_reference_vector() {
        let body = CanonicalBody::from_json(&json!({})).unwrap();
        let result = signer("K", "S").sign(&Method::POST, VISITOR_INFO, &body).unwrap();

        assert_eq!(result.content_md5, "mZFLkyvTelC5g8XnyQrpOw==");
        assert_eq!(result.signature, "IH2J4nNpCw2Bu46GuTWl3zIqvkJHoZRbCsg0rPIJuBU=");
        assert_eq!(result.signed_header_names, "x-ca-key");
        assert_eq!(result.key, "K");
        assert_eq!(result.upstream_host, "https://10.0.0.1/artemis");
    }

    #[test]
    fn test_string_to_sign_layout() {
        let s = string_to_sign("POST", "MD5==", "K", "/artemis/api/x");
        assert_eq!(
            s,
            "POST\napplication/json\nMD5==\napplication/json;charset=UTF-8\nx-ca-key:K\n/artemis/api/x"
        );
    }

    #[test]
    fn test_canonical_body_is_compact_and_ordered() {
        let body = CanonicalBody::from_json(&json!({"pageNo": 1, "pageSize": 200})).unwrap();
        assert_eq!(body.as_bytes(), br#"{"pageNo":1,"pageSize":200}"#);
        assert_eq!(content_md5(body.as_bytes()), "8Ojqxoc516Z/Doc2qcwRbw==");

        // preserve_order keeps insertion order instead of sorting keys
        let body = CanonicalBody::from_json(&json!({"z": 1, "a": 2})).unwrap();
        assert_eq!(body.as_bytes(), br#"{"z":1,"a":2}"#);
    }

    #[test]
    fn test_sign_is_deterministic() {
        let s = signer("K", "S");
        let body = CanonicalBody::from_json(&json!({"visitorName": "Ann"})).unwrap();
        let a = s.sign(&Method::POST, VISITOR_INFO, &body).unwrap();
        let b = s.sign(&Method::POST, VISITOR_INFO, &body).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_body_change_changes_digest_and_signature() {
        let s = signer("K", "S");
        let a = CanonicalBody::from_json(&json!({"pageNo": 1})).unwrap();
        let b = CanonicalBody::from_json(&json!({"pageNo": 2})).unwrap();
        let sa = s.sign(&Method::POST, VISITOR_INFO, &a).unwrap();
        let sb = s.sign(&Method::POST, VISITOR_INFO, &b).unwrap();
        assert_ne!(sa.content_md5, sb.content_md5);
        assert_ne!(sa.signature, sb.signature);
    }

    #[test]
    fn test_path_and_method_are_signed() {
        let s = signer("K", "S");
        let body = CanonicalBody::from_json(&json!({})).unwrap();
        let base = s.sign(&Method::POST, VISITOR_INFO, &body).unwrap();
        let other_path = s.sign(&Method::POST, "/artemis/api/common/v1/version", &body).unwrap();
        let other_method = s.sign(&Method::GET, VISITOR_INFO, &body).unwrap();
        assert_eq!(base.content_md5, other_path.content_md5);
        assert_ne!(base.signature, other_path.signature);
        assert_ne!(base.signature, other_method.signature);
    }

    #[test]
    fn test_empty_credential_fails() {
        let body = CanonicalBody::from_json(&json!({})).unwrap();
        for (key, secret) in [("", "S"), ("K", ""), ("", "")] {
            let result = signer(key, secret).sign(&Method::POST, VISITOR_INFO, &body);
            assert!(matches!(result, Err(GatewayError::CredentialMissing)));
        }
    }

    #[test]
    fn test_headers() {
        let body = CanonicalBody::from_json(&json!({})).unwrap();
        let headers = signer("K", "S")
            .sign(&Method::POST, VISITOR_INFO, &body)
            .unwrap()
            .headers()
            .unwrap();

        assert_eq!(headers.len(), 6);
        assert_eq!(headers["accept"], "application/json");
        assert_eq!(headers["content-type"], "application/json;charset=UTF-8");
        assert_eq!(headers["content-md5"], "mZFLkyvTelC5g8XnyQrpOw==");
        assert_eq!(headers["x-ca-key"], "K");
        assert_eq!(headers["x-ca-signature"], "IH2J4nNpCw2Bu46GuTWl3zIqvkJHoZRbCsg0rPIJuBU=");
        assert_eq!(headers["x-ca-signature-headers"], "x-ca-key");
    }

    #[test]
    fn test_key_with_newline_is_rejected() {
        let body = CanonicalBody::from_json(&json!({})).unwrap();
        let result = signer("K\n", "S").sign(&Method::POST, VISITOR_INFO, &body).unwrap();
        assert!(matches!(result.headers(), Err(GatewayError::CredentialInvalid(_))));
    }
}
