use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::SessionClaims;

/// Issues and verifies HS256-signed session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.session_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.session_secret.as_bytes()),
            ttl: config.session_ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a session token for the given user id
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::Internal(format!("System clock error: {}", e)))?
            .as_secs();

        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign session token: {}", e)))
    }

    /// Validate signature and expiry, returning the user id
    pub fn verify(&self, token: &str) -> Result<i64> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Invalid session: {}", e)))?;

        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Invalid session subject".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&AuthConfig {
            session_secret: secret.to_string(),
            session_ttl: Duration::from_secs(3600),
            cookie_secure: false,
        })
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service("0123456789abcdef0123456789abcdef");
        let token = tokens.issue(42).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), 42);
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let token = service("0123456789abcdef0123456789abcdef")
            .issue(42)
            .unwrap();
        let other = service("fedcba9876543210fedcba9876543210");
        assert!(matches!(
            other.verify(&token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_rejects_garbage() {
        let tokens = service("0123456789abcdef0123456789abcdef");
        assert!(tokens.verify("not-a-token").is_err());
    }
}
