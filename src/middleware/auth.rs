use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Authentication middleware for every `/api/*` route. All this layer does
/// is pull the raw header off the request and hand it to the gate; the
/// resolved [`AuthUser`](crate::auth::AuthUser) rides along as a request
/// extension for handlers to extract.
pub async fn require_auth(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let user = state.gate.authenticate(header).await?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
