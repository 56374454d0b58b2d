// Tagged API error taxonomy shared by every core operation.
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

/// A single field-level validation problem, reported as
/// `<section>.<dotted.path>` (e.g. `body.authorIds.1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
    pub code: &'static str,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: &'static str) -> Self {
        Self { field: field.into(), message: message.into(), code }
    }
}

/// Error kinds returned by the core services. The HTTP layer maps these to
/// status codes; the core itself never touches HTTP semantics beyond the
/// `IntoResponse` glue at the bottom of this file.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed, missing or out-of-range request data. Carries every field
    /// violation discovered in one validation pass, not just the first.
    InvalidInput { message: String, violations: Vec<FieldViolation> },

    /// No credential, or one that is not even `Bearer <token>` shaped.
    Unauthenticated(String),

    /// Credential present but cryptographically or structurally invalid,
    /// including expired tokens.
    TokenInvalid(String),

    /// Token verified but the account it references no longer exists.
    StaleToken(String),

    /// Authenticated but not authorized for this resource instance.
    Forbidden(String),

    NotFound(String),

    /// State conflict: duplicate unique field or referential-integrity block.
    Conflict(String),

    AlreadyFavorited(String),
    NotInFavorites(String),

    /// Server-side misconfiguration (e.g. no signing secret).
    Configuration(String),

    /// Persistence collaborator failure; treated as transient/unexpected.
    Storage(String),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidInput { .. } => 400,
            ApiError::Unauthenticated(_) => 401,
            ApiError::TokenInvalid(_) => 401,
            ApiError::StaleToken(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::AlreadyFavorited(_) => 409,
            ApiError::NotInFavorites(_) => 400,
            ApiError::Configuration(_) => 500,
            ApiError::Storage(_) => 500,
        }
    }

    /// Stable machine-checkable kind for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput { .. } => "INVALID_INPUT",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::TokenInvalid(_) => "TOKEN_INVALID",
            ApiError::StaleToken(_) => "STALE_TOKEN",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::AlreadyFavorited(_) => "ALREADY_FAVORITED",
            ApiError::NotInFavorites(_) => "NOT_IN_FAVORITES",
            ApiError::Configuration(_) => "CONFIGURATION_ERROR",
            ApiError::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidInput { message, .. } => message,
            ApiError::Unauthenticated(msg)
            | ApiError::TokenInvalid(msg)
            | ApiError::StaleToken(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::AlreadyFavorited(msg)
            | ApiError::NotInFavorites(msg)
            | ApiError::Configuration(msg)
            | ApiError::Storage(msg) => msg,
        }
    }

    /// JSON body for the HTTP layer. Internal detail for 500-class errors is
    /// logged, never sent to clients.
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::InvalidInput { message, violations } => json!({
                "error": true,
                "message": message,
                "code": self.error_code(),
                "violations": violations,
            }),
            ApiError::Storage(msg) => {
                tracing::error!("storage error: {}", msg);
                json!({
                    "error": true,
                    "message": "An error occurred while processing your request",
                    "code": self.error_code(),
                })
            }
            ApiError::Configuration(msg) => {
                tracing::error!("configuration error: {}", msg);
                json!({
                    "error": true,
                    "message": "Server configuration error",
                    "code": self.error_code(),
                })
            }
            _ => json!({
                "error": true,
                "message": self.message(),
                "code": self.error_code(),
            }),
        }
    }
}

// Static constructors, matching the call-site shape used throughout services.
impl ApiError {
    pub fn invalid_input(message: impl Into<String>, violations: Vec<FieldViolation>) -> Self {
        ApiError::InvalidInput { message: message.into(), violations }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn token_invalid(message: impl Into<String>) -> Self {
        ApiError::TokenInvalid(message.into())
    }

    pub fn stale_token(message: impl Into<String>) -> Self {
        ApiError::StaleToken(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn already_favorited(message: impl Into<String>) -> Self {
        ApiError::AlreadyFavorited(message.into())
    }

    pub fn not_in_favorites(message: impl Into<String>) -> Self {
        ApiError::NotInFavorites(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        ApiError::Configuration(message.into())
    }
}

impl From<crate::database::store::StoreError> for ApiError {
    fn from(err: crate::database::store::StoreError) -> Self {
        match err {
            crate::database::store::StoreError::ReferentialIntegrity(msg) => {
                ApiError::conflict(msg)
            }
            crate::database::store::StoreError::UniqueViolation(msg) => ApiError::conflict(msg),
            other => ApiError::Storage(other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_wire_mapping() {
        assert_eq!(ApiError::not_found("x").status_code(), 404);
        assert_eq!(ApiError::forbidden("x").status_code(), 403);
        assert_eq!(ApiError::unauthenticated("x").status_code(), 401);
        assert_eq!(ApiError::token_invalid("x").status_code(), 401);
        assert_eq!(ApiError::stale_token("x").status_code(), 401);
        assert_eq!(ApiError::conflict("x").status_code(), 409);
        assert_eq!(ApiError::already_favorited("x").status_code(), 409);
        assert_eq!(ApiError::not_in_favorites("x").status_code(), 400);
        assert_eq!(ApiError::invalid_input("x", vec![]).status_code(), 400);
    }

    #[test]
    fn stale_token_distinct_from_token_invalid() {
        // Both are 401 but carry different machine-checkable codes.
        let stale = ApiError::stale_token("account gone");
        let invalid = ApiError::token_invalid("bad signature");
        assert_eq!(stale.status_code(), invalid.status_code());
        assert_ne!(stale.error_code(), invalid.error_code());
    }

    #[test]
    fn invalid_input_serializes_all_violations() {
        let err = ApiError::invalid_input(
            "Validation failed",
            vec![
                FieldViolation::new("body.name", "name is required", "required"),
                FieldViolation::new("query.page", "must be an integer", "invalid_type"),
            ],
        );
        let body = err.to_json();
        assert_eq!(body["violations"].as_array().unwrap().len(), 2);
        assert_eq!(body["violations"][0]["field"], "body.name");
    }

    #[test]
    fn storage_errors_hide_internal_detail() {
        let err = ApiError::Storage("connection refused to 10.0.0.3".into());
        let body = err.to_json();
        assert!(!body["message"].as_str().unwrap().contains("10.0.0.3"));
    }
}
