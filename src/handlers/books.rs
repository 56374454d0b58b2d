use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::database::models::Book;
use crate::listing::Page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::book_service::{CreateBookInput, UpdateBookInput};
use crate::state::AppState;
use crate::validation::{
    id_path_section, list_query_section, validate, FieldKind, FieldSpec, Refinement,
    RequestSections, Schema, SectionSchema,
};

use super::{id_path_value, list_params, query_to_value};

fn book_body_fields(required: bool) -> Vec<FieldSpec> {
    let title = FieldKind::Str { min_len: 1, max_len: 300 };
    let isbn = FieldKind::Str { min_len: 10, max_len: 17 };
    let author_ids = FieldKind::IdArray { min_len: 1 };
    if required {
        vec![
            FieldSpec::required("title", title),
            FieldSpec::optional("isbn", isbn),
            FieldSpec::optional("publishedDate", FieldKind::Date),
            FieldSpec::required("authorIds", author_ids),
        ]
    } else {
        vec![
            FieldSpec::optional("title", title),
            FieldSpec::optional("isbn", isbn),
            FieldSpec::optional("publishedDate", FieldKind::Date),
            FieldSpec::optional("authorIds", author_ids),
        ]
    }
}

static CREATE_SCHEMA: Lazy<Schema> =
    Lazy::new(|| Schema::new().body(SectionSchema::strict(book_body_fields(true))));

static LIST_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new().query(list_query_section(10)));

static GET_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new().path(id_path_section()));

static UPDATE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .body(SectionSchema::strict(book_body_fields(false)))
        .path(id_path_section())
        .refine(Refinement::AtLeastOneBodyField)
});

/// POST /api/books
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> ApiResult<Book> {
    let validated = validate(&CREATE_SCHEMA, RequestSections::body_only(body))?;
    let input: CreateBookInput = validated.body_as()?;
    let book = state.books.create(&user, input).await?;
    Ok(ApiResponse::created(book))
}

/// GET /api/books
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Page<Book>> {
    let sections = RequestSections::new(Value::Null, query_to_value(query), Value::Null);
    let validated = validate(&LIST_SCHEMA, sections)?;
    let page = state.books.list(&user, list_params(&validated)).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/books/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Book> {
    let sections = RequestSections::new(Value::Null, Value::Null, id_path_value(id));
    let validated = validate(&GET_SCHEMA, sections)?;
    let book = state.books.get(&user, validated.path_id("id")?).await?;
    Ok(ApiResponse::success(book))
}

/// PATCH /api/books/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Book> {
    let sections = RequestSections::new(body, Value::Null, id_path_value(id));
    let validated = validate(&UPDATE_SCHEMA, sections)?;
    let input: UpdateBookInput = validated.body_as()?;
    let book = state.books.update(&user, validated.path_id("id")?, input).await?;
    Ok(ApiResponse::success(book))
}

/// DELETE /api/books/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let sections = RequestSections::new(Value::Null, Value::Null, id_path_value(id));
    let validated = validate(&GET_SCHEMA, sections)?;
    state.books.delete(&user, validated.path_id("id")?).await?;
    Ok(ApiResponse::no_content())
}
