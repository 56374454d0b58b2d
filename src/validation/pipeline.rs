//! Parses and coerces the three request sections against a [`Schema`],
//! collecting every violated constraint before failing once with all of
//! them attached. Downstream code only ever sees coerced values.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{ApiError, FieldViolation};

use super::schema::{FieldKind, Refinement, Schema, Section, SectionSchema};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

// Canonical hyphenated UUID: fixed-length hexadecimal groups.
static ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("id regex")
});

/// Raw request data as the HTTP layer hands it over: three JSON objects.
#[derive(Debug, Clone, Default)]
pub struct RequestSections {
    pub body: Value,
    pub query: Value,
    pub path: Value,
}

impl RequestSections {
    pub fn new(body: Value, query: Value, path: Value) -> Self {
        Self { body, query, path }
    }

    pub fn body_only(body: Value) -> Self {
        Self { body, ..Default::default() }
    }
}

/// Output of a successful validation pass. Holds only coerced/defaulted
/// values; the original raw sections are gone.
#[derive(Debug, Clone)]
pub struct Validated {
    pub body: Value,
    pub query: Value,
    pub path: Value,
}

impl Validated {
    /// Deserialize the coerced body into an endpoint DTO. A mismatch here
    /// means the schema and the DTO disagree, which is a server bug, not a
    /// client error.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.body.clone())
            .map_err(|e| ApiError::Storage(format!("validated body did not match DTO: {}", e)))
    }

    pub fn query_i64(&self, name: &str) -> Option<i64> {
        self.query.get(name).and_then(Value::as_i64)
    }

    pub fn query_str(&self, name: &str) -> Option<&str> {
        self.query.get(name).and_then(Value::as_str)
    }

    /// Fetch a path id that the schema already validated and canonicalized.
    pub fn path_id(&self, name: &str) -> Result<Uuid, ApiError> {
        self.path
            .get(name)
            .and_then(Value::as_str)
            .and_then(|s| Uuid::parse_str(s).ok())
            .ok_or_else(|| ApiError::Storage(format!("validated path missing id '{}'", name)))
    }
}

pub fn validate(schema: &Schema, sections: RequestSections) -> Result<Validated, ApiError> {
    let mut violations: Vec<FieldViolation> = Vec::new();

    let body = validate_section(Section::Body, &schema.body, sections.body, &mut violations);
    let query = validate_section(Section::Query, &schema.query, sections.query, &mut violations);
    let path = validate_section(Section::Path, &schema.path, sections.path, &mut violations);

    for refinement in &schema.refinements {
        match refinement {
            Refinement::AtLeastOneBodyField => {
                let empty = body.as_object().map(Map::is_empty).unwrap_or(true);
                if empty {
                    violations.push(FieldViolation::new(
                        "body",
                        "at least one field must be provided",
                        "empty_update",
                    ));
                }
            }
        }
    }

    if !violations.is_empty() {
        return Err(ApiError::invalid_input("Validation failed", violations));
    }
    Ok(Validated { body, query, path })
}

fn validate_section(
    section: Section,
    schema: &SectionSchema,
    raw: Value,
    out: &mut Vec<FieldViolation>,
) -> Value {
    let raw_map = match raw {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            out.push(FieldViolation::new(section.as_str(), "must be an object", "invalid_type"));
            return Value::Object(Map::new());
        }
    };

    let mut coerced = Map::new();
    for spec in &schema.fields {
        let field_path = format!("{}.{}", section.as_str(), spec.name);
        match raw_map.get(spec.name) {
            None | Some(Value::Null) => {
                if let Some(default) = &spec.default {
                    coerced.insert(spec.name.to_string(), default.clone());
                } else if spec.required {
                    out.push(FieldViolation::new(field_path, "field is required", "required"));
                }
            }
            Some(value) => {
                if let Some(value) = coerce_field(&field_path, &spec.kind, value, out) {
                    coerced.insert(spec.name.to_string(), value);
                }
            }
        }
    }

    for key in raw_map.keys() {
        let declared = schema.fields.iter().any(|spec| spec.name == key);
        if !declared && schema.strict {
            out.push(FieldViolation::new(
                format!("{}.{}", section.as_str(), key),
                "unrecognized field",
                "unknown_field",
            ));
        }
        // Lax sections silently drop unknown fields.
    }

    Value::Object(coerced)
}

/// Coerce one value; pushes a violation and returns None when it fails.
fn coerce_field(
    path: &str,
    kind: &FieldKind,
    value: &Value,
    out: &mut Vec<FieldViolation>,
) -> Option<Value> {
    match kind {
        FieldKind::Str { min_len, max_len } => {
            let Some(s) = value.as_str() else {
                out.push(FieldViolation::new(path, "must be a string", "invalid_type"));
                return None;
            };
            let len = s.chars().count();
            if len < *min_len {
                out.push(FieldViolation::new(
                    path,
                    format!("must be at least {} characters", min_len),
                    "too_short",
                ));
                return None;
            }
            if len > *max_len {
                out.push(FieldViolation::new(
                    path,
                    format!("must be at most {} characters", max_len),
                    "too_long",
                ));
                return None;
            }
            Some(Value::String(s.to_string()))
        }
        FieldKind::Email => {
            let Some(s) = value.as_str() else {
                out.push(FieldViolation::new(path, "must be a string", "invalid_type"));
                return None;
            };
            let trimmed = s.trim();
            if !EMAIL_RE.is_match(trimmed) {
                out.push(FieldViolation::new(
                    path,
                    "must be a valid email address",
                    "invalid_email",
                ));
                return None;
            }
            Some(Value::String(trimmed.to_string()))
        }
        FieldKind::Int { min, max } => {
            // Coercion first: query params arrive as strings.
            let parsed = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            let Some(n) = parsed else {
                out.push(FieldViolation::new(path, "must be an integer", "invalid_type"));
                return None;
            };
            if n < *min || n > *max {
                out.push(FieldViolation::new(
                    path,
                    format!("must be at least {}", min),
                    "out_of_range",
                ));
                return None;
            }
            Some(Value::from(n))
        }
        FieldKind::Date => {
            let Some(s) = value.as_str() else {
                out.push(FieldViolation::new(path, "must be a string", "invalid_type"));
                return None;
            };
            if NaiveDate::parse_from_str(s, "%Y-%m-%d").is_err() {
                out.push(FieldViolation::new(
                    path,
                    "must be an ISO date (YYYY-MM-DD)",
                    "invalid_date",
                ));
                return None;
            }
            Some(Value::String(s.to_string()))
        }
        FieldKind::Id => coerce_id(path, value, out),
        FieldKind::IdArray { min_len } => {
            let Some(items) = value.as_array() else {
                out.push(FieldViolation::new(path, "must be an array of ids", "invalid_type"));
                return None;
            };
            if items.len() < *min_len {
                out.push(FieldViolation::new(
                    path,
                    format!("must contain at least {} id(s)", min_len),
                    "too_short",
                ));
                return None;
            }
            let mut coerced = Vec::with_capacity(items.len());
            let mut ok = true;
            for (index, item) in items.iter().enumerate() {
                match coerce_id(&format!("{}.{}", path, index), item, out) {
                    Some(value) => coerced.push(value),
                    None => ok = false,
                }
            }
            ok.then(|| Value::Array(coerced))
        }
    }
}

fn coerce_id(path: &str, value: &Value, out: &mut Vec<FieldViolation>) -> Option<Value> {
    let invalid = || FieldViolation::new(path, "must be a valid resource id", "invalid_id");
    let Some(s) = value.as_str() else {
        out.push(invalid());
        return None;
    };
    if !ID_RE.is_match(s) {
        out.push(invalid());
        return None;
    }
    match Uuid::parse_str(s) {
        // Canonical lowercase hyphenated form.
        Ok(id) => Some(Value::String(id.to_string())),
        Err(_) => {
            out.push(invalid());
            None
        }
    }
}
