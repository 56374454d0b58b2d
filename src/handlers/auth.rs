use axum::{extract::State, Extension, Json};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::auth_service::{LoginInput, RegisterInput, Session};
use crate::state::AppState;
use crate::validation::{validate, FieldKind, FieldSpec, RequestSections, Schema, SectionSchema};

static REGISTER_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new().body(SectionSchema::strict(vec![
        FieldSpec::required("email", FieldKind::Email),
        // bcrypt truncates past 72 bytes, so cap the password there.
        FieldSpec::required("password", FieldKind::Str { min_len: 8, max_len: 72 }),
        FieldSpec::optional("displayName", FieldKind::Str { min_len: 1, max_len: 100 }),
    ]))
});

static LOGIN_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new().body(SectionSchema::strict(vec![
        FieldSpec::required("email", FieldKind::Email),
        FieldSpec::required("password", FieldKind::Str { min_len: 1, max_len: 72 }),
    ]))
});

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Session> {
    let validated = validate(&REGISTER_SCHEMA, RequestSections::body_only(body))?;
    let input: RegisterInput = validated.body_as()?;
    let session = state.auth.register(input).await?;
    Ok(ApiResponse::created(session))
}

/// POST /auth/login
pub async fn login(State(state): State<AppState>, Json(body): Json<Value>) -> ApiResult<Session> {
    let validated = validate(&LOGIN_SCHEMA, RequestSections::body_only(body))?;
    let input: LoginInput = validated.body_as()?;
    let session = state.auth.login(input).await?;
    Ok(ApiResponse::success(session))
}

/// GET /api/auth/whoami
pub async fn whoami(Extension(user): Extension<AuthUser>) -> ApiResult<AuthUser> {
    Ok(ApiResponse::success(user))
}
