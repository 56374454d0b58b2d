//! HTTP handlers, one module per resource. Each handler validates the raw
//! request sections against its endpoint schema, then calls into a service
//! with coerced values only.

pub mod auth;
pub mod authors;
pub mod books;
pub mod favorites;
pub mod health;

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::listing::ListParams;
use crate::validation::Validated;

/// Axum hands query params over as string/string pairs; the validation
/// pipeline wants a JSON object so coercion rules apply uniformly.
pub(crate) fn query_to_value(params: HashMap<String, String>) -> Value {
    let map: Map<String, Value> =
        params.into_iter().map(|(k, v)| (k, Value::String(v))).collect();
    Value::Object(map)
}

pub(crate) fn id_path_value(id: String) -> Value {
    json!({ "id": id })
}

/// Lift the coerced list-query section into [`ListParams`]. The schema
/// guarantees `page` and `limit` are present (defaulted) integers.
pub(crate) fn list_params(validated: &Validated) -> ListParams {
    ListParams {
        page: validated.query_i64("page").unwrap_or(1),
        limit: validated.query_i64("limit").unwrap_or(10),
        sort_by: validated.query_str("sortBy").map(str::to_string),
        search: validated.query_str("search").map(str::to_string),
    }
}
