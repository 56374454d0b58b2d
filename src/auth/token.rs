use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id the token was issued for.
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens. Stateless: a token is valid iff its
/// signature checks out and it has not expired.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Option<String>,
    expiry_hours: u64,
}

impl TokenCodec {
    pub fn new(security: &SecurityConfig) -> Self {
        Self { secret: security.jwt_secret.clone(), expiry_hours: security.jwt_expiry_hours }
    }

    pub fn sign(&self, subject: Uuid, email: &str) -> Result<String, ApiError> {
        let secret = self
            .secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::configuration("JWT signing secret is not configured"))?;

        let now = Utc::now();
        let claims = Claims {
            sub: subject,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours as i64)).timestamp(),
        };

        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|e| ApiError::configuration(format!("token generation failed: {}", e)))
    }

    /// Total: never errors. Expired and malformed tokens both come back as
    /// None; the distinction only shows up in debug logs.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let secret = self.secret.as_deref().filter(|s| !s.is_empty())?;

        let result = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        );

        match result {
            Ok(data) => Some(data.claims),
            Err(e) => {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        tracing::debug!("token rejected: expired")
                    }
                    other => tracing::debug!("token rejected: {:?}", other),
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec { secret: Some("test-secret".to_string()), expiry_hours: 24 }
    }

    #[test]
    fn sign_verify_round_trip() {
        let codec = codec();
        let subject = Uuid::new_v4();
        let token = codec.sign(subject, "a@x.com").unwrap();
        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.sub, subject);
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn sign_without_secret_is_a_configuration_error() {
        let codec = TokenCodec { secret: None, expiry_hours: 24 };
        let err = codec.sign(Uuid::new_v4(), "a@x.com").unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn verify_is_total_over_garbage() {
        let codec = codec();
        assert!(codec.verify("").is_none());
        assert!(codec.verify("not.a.token").is_none());
        assert!(codec.verify("aaaa.bbbb.cccc").is_none());
    }

    #[test]
    fn verify_rejects_wrong_signature() {
        let other = TokenCodec { secret: Some("different-secret".to_string()), expiry_hours: 24 };
        let token = other.sign(Uuid::new_v4(), "a@x.com").unwrap();
        assert!(codec().verify(&token).is_none());
    }

    #[test]
    fn verify_rejects_expired() {
        // Hand-craft a token whose exp is well past the default leeway.
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret".as_bytes()),
        )
        .unwrap();
        assert!(codec().verify(&token).is_none());
    }

    #[test]
    fn verify_without_secret_returns_none() {
        let signer = codec();
        let token = signer.sign(Uuid::new_v4(), "a@x.com").unwrap();
        let verifier = TokenCodec { secret: None, expiry_hours: 24 };
        assert!(verifier.verify(&token).is_none());
    }
}
