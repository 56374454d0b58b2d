use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::database::store::UserStore;
use crate::error::ApiError;

use super::token::TokenCodec;

/// The resolved identity threaded explicitly through the call chain; the
/// core never mutates a shared request object.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Resolves a raw `Authorization` header to a live user identity.
pub struct AuthGate {
    tokens: TokenCodec,
    users: Arc<dyn UserStore>,
}

impl AuthGate {
    pub fn new(tokens: TokenCodec, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    /// Three distinct failure modes, in order: no usable credential
    /// (`Unauthenticated`), a token that does not verify (`TokenInvalid`,
    /// covering malformed, wrong-signature and expired alike), and a token
    /// whose account no longer exists (`StaleToken`).
    pub async fn authenticate(&self, header: Option<&str>) -> Result<AuthUser, ApiError> {
        let header =
            header.ok_or_else(|| ApiError::unauthenticated("Missing Authorization header"))?;

        let token = header.strip_prefix("Bearer ").map(str::trim).ok_or_else(|| {
            ApiError::unauthenticated("Authorization header must use Bearer token format")
        })?;
        if token.is_empty() {
            return Err(ApiError::unauthenticated("Empty bearer token"));
        }

        let claims = self
            .tokens
            .verify(token)
            .ok_or_else(|| ApiError::token_invalid("Invalid or expired token"))?;

        let user = self
            .users
            .find_by_id(claims.sub)
            .await?
            .ok_or_else(|| ApiError::stale_token("Account referenced by token no longer exists"))?;

        Ok(AuthUser { id: user.id, email: user.email })
    }
}
