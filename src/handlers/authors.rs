use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::auth::AuthUser;
use crate::database::models::Author;
use crate::listing::Page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::author_service::{CreateAuthorInput, UpdateAuthorInput};
use crate::state::AppState;
use crate::validation::{
    id_path_section, list_query_section, validate, FieldKind, FieldSpec, Refinement,
    RequestSections, Schema, SectionSchema,
};

use super::{id_path_value, list_params, query_to_value};

fn author_body_fields(required: bool) -> Vec<FieldSpec> {
    let name = FieldKind::Str { min_len: 1, max_len: 200 };
    let bio = FieldKind::Str { min_len: 0, max_len: 2000 };
    if required {
        vec![FieldSpec::required("name", name), FieldSpec::optional("bio", bio)]
    } else {
        vec![FieldSpec::optional("name", name), FieldSpec::optional("bio", bio)]
    }
}

static CREATE_SCHEMA: Lazy<Schema> =
    Lazy::new(|| Schema::new().body(SectionSchema::strict(author_body_fields(true))));

static LIST_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new().query(list_query_section(10)));

static GET_SCHEMA: Lazy<Schema> = Lazy::new(|| Schema::new().path(id_path_section()));

static UPDATE_SCHEMA: Lazy<Schema> = Lazy::new(|| {
    Schema::new()
        .body(SectionSchema::strict(author_body_fields(false)))
        .path(id_path_section())
        .refine(Refinement::AtLeastOneBodyField)
});

/// POST /api/authors
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> ApiResult<Author> {
    let validated = validate(&CREATE_SCHEMA, RequestSections::body_only(body))?;
    let input: CreateAuthorInput = validated.body_as()?;
    let author = state.authors.create(&user, input).await?;
    Ok(ApiResponse::created(author))
}

/// GET /api/authors
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HashMap<String, String>>,
) -> ApiResult<Page<Author>> {
    let sections = RequestSections::new(Value::Null, query_to_value(query), Value::Null);
    let validated = validate(&LIST_SCHEMA, sections)?;
    let page = state.authors.list(&user, list_params(&validated)).await?;
    Ok(ApiResponse::success(page))
}

/// GET /api/authors/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<Author> {
    let sections = RequestSections::new(Value::Null, Value::Null, id_path_value(id));
    let validated = validate(&GET_SCHEMA, sections)?;
    let author = state.authors.get(&user, validated.path_id("id")?).await?;
    Ok(ApiResponse::success(author))
}

/// PATCH /api/authors/:id
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Author> {
    let sections = RequestSections::new(body, Value::Null, id_path_value(id));
    let validated = validate(&UPDATE_SCHEMA, sections)?;
    let input: UpdateAuthorInput = validated.body_as()?;
    let author = state.authors.update(&user, validated.path_id("id")?, input).await?;
    Ok(ApiResponse::success(author))
}

/// DELETE /api/authors/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let sections = RequestSections::new(Value::Null, Value::Null, id_path_value(id));
    let validated = validate(&GET_SCHEMA, sections)?;
    state.authors.delete(&user, validated.path_id("id")?).await?;
    Ok(ApiResponse::no_content())
}
