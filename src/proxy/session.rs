// Session tokens
// HS256 bearer tokens naming the operator; checked before any upstream work.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;
use crate::proxy::config::SessionConfig;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Caller identity established by a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

pub struct SessionManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    username: String,
    password: String,
}

impl SessionManager {
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            ttl: Duration::try_minutes(config.token_ttl_minutes).unwrap_or(Duration::MAX),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Exact match against the configured operator pair
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Identity, GatewayError> {
        if username != self.username || password != self.password {
            tracing::warn!("Rejected login for user {:?}", username);
            return Err(GatewayError::InvalidLogin);
        }
        Ok(Identity {
            username: username.to_string(),
        })
    }

    pub fn issue(&self, identity: &Identity) -> Result<TokenResponse, GatewayError> {
        self.issue_at(identity, Utc::now())
    }

    fn issue_at(&self, identity: &Identity, issued_at: DateTime<Utc>) -> Result<TokenResponse, GatewayError> {
        let claims = Claims {
            sub: identity.username.clone(),
            iat: issued_at.timestamp(),
            exp: issued_at
                .checked_add_signed(self.ttl)
                .ok_or_else(|| GatewayError::Internal("Token lifetime out of range".to_string()))?
                .timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| GatewayError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok(TokenResponse {
            access_token,
            token_type: "bearer".to_string(),
        })
    }

    /// Missing subject, bad signature, malformed or expired token: all `Unauthenticated`
    pub fn verify(&self, token: &str) -> Result<Identity, GatewayError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!("Token rejected: {}", e);
            GatewayError::Unauthenticated
        })?;

        if data.claims.sub.is_empty() {
            return Err(GatewayError::Unauthenticated);
        }

        Ok(Identity {
            username: data.claims.sub,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_config() -> SessionConfig {
        SessionConfig {
            jwt_secret: "unit-test-secret".to_string(),
            token_ttl_minutes: 30,
            username: "vms_admin".to_string(),
            password: "vms_secret".to_string(),
        }
    }

    /// Token that expired an hour ago, well past the validation leeway
    pub(crate) fn expired_token(manager: &SessionManager) -> String {
        let identity = Identity {
            username: "vms_admin".to_string(),
        };
        manager
            .issue_at(&identity, Utc::now() - Duration::hours(2))
            .unwrap()
            .access_token
    }

    #[test]
    fn test_issue_and_verify() {
        let manager = SessionManager::new(&test_config());
        let identity = manager.authenticate("vms_admin", "vms_secret").unwrap();
        let token = manager.issue(&identity).unwrap();

        assert_eq!(token.token_type, "bearer");
        assert_eq!(manager.verify(&token.access_token).unwrap(), identity);
    }

    #[test]
    fn test_wrong_password() {
        let manager = SessionManager::new(&test_config());
        assert!(matches!(
            manager.authenticate("vms_admin", "nope"),
            Err(GatewayError::InvalidLogin)
        ));
        assert!(matches!(
            manager.authenticate("someone", "vms_secret"),
            Err(GatewayError::InvalidLogin)
        ));
    }

    #[test]
    fn test_expired_token() {
        let manager = SessionManager::new(&test_config());
        let token = expired_token(&manager);
        assert!(matches!(manager.verify(&token), Err(GatewayError::Unauthenticated)));
    }

    #[test]
    fn test_token_from_other_secret() {
        let manager = SessionManager::new(&test_config());
        let other = SessionManager::new(&SessionConfig {
            jwt_secret: "someone-elses-secret".to_string(),
            ..test_config()
        });
        let identity = other.authenticate("vms_admin", "vms_secret").unwrap();
        let foreign = other.issue(&identity).unwrap().access_token;

        assert!(matches!(manager.verify(&foreign), Err(GatewayError::Unauthenticated)));
    }

    #[test]
    fn test_garbage_token() {
        let manager = SessionManager::new(&test_config());
        assert!(manager.verify("").is_err());
        assert!(manager.verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_unbounded_lifetime_fails_without_panic() {
        let manager = SessionManager::new(&SessionConfig {
            token_ttl_minutes: i64::MAX,
            ..test_config()
        });
        let identity = manager.authenticate("vms_admin", "vms_secret").unwrap();
        assert!(matches!(manager.issue(&identity), Err(GatewayError::Internal(_))));
    }
}
