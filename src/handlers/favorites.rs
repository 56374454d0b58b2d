use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension,
};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::database::models::{Author, Book, User};
use crate::listing::Page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::validation::{
    id_path_section, list_query_section, validate, RequestSections, Schema,
};

use super::{id_path_value, list_params, query_to_value};

static TOGGLE_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new().path(id_path_section()));

static LIST_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new().query(list_query_section(10)));

/// POST /api/authors/:id/favorite
pub async fn add_author(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let sections = RequestSections::new(Value::Null, Value::Null, id_path_value(id));
    let validated = validate(&TOGGLE_SCHEMA, sections)?;
    let updated = state.favorites.add_author(&user, validated.path_id("id")?).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/authors/:id/favorite
pub async fn remove_author(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let sections = RequestSections::new(Value::Null, Value::Null, id_path_value(id));
    let validated = validate(&TOGGLE_SCHEMA, sections)?;
    let updated = state.favorites.remove_author(&user, validated.path_id("id")?).await?;
    Ok(ApiResponse::success(updated))
}

/// POST /api/books/:id/favorite
pub async fn add_book(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let sections = RequestSections::new(Value::Null, Value::Null, id_path_value(id));
    let validated = validate(&TOGGLE_SCHEMA, sections)?;
    let updated = state.favorites.add_book(&user, validated.path_id("id")?).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/books/:id/favorite
pub async fn remove_book(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<User> {
    let sections = RequestSections::new(Value::Null, Value::Null, id_path_value(id));
    let validated = validate(&TOGGLE_SCHEMA, sections)?;
    let updated = state.favorites.remove_book(&user, validated.path_id("id")?).await?;
    Ok(ApiResponse::success(updated))
}

/// GET /api/favorites/authors
pub async fn list_authors(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Page<Author>> {
    let sections = RequestSections::new(Value::Null, query_to_value(query), Value::Null);
    let validated = validate(&LIST_SCHEMA, sections)?;
    let page = state.favorites.list_authors(&user, list_params(&validated)).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/favorites/books
pub async fn list_books(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Page<Book>> {
    let sections = RequestSections::new(Value::Null, query_to_value(query), Value::Null);
    let validated = validate(&LIST_SCHEMA, sections)?;
    let page = state.favorites.list_books(&user, list_params(&validated)).await?;
    Ok(ApiResponse::success(page))
}
