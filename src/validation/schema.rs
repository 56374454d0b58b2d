//! Declarative per-endpoint request schemas. A schema describes the three
//! request sections (body, query, path); the pipeline coerces and checks
//! all of them before any endpoint logic runs.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Body,
    Query,
    Path,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Body => "body",
            Section::Query => "query",
            Section::Path => "path",
        }
    }
}

/// Field type plus its coercions and constraints. Coercion runs before
/// constraint checks: query strings become ints, dates are shape-checked,
/// ids are canonicalized.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Str { min_len: usize, max_len: usize },
    Email,
    Int { min: i64, max: i64 },
    /// ISO `YYYY-MM-DD`.
    Date,
    /// Resource id: fixed-shape hexadecimal (UUID), reported with a
    /// dedicated code distinct from generic type errors.
    Id,
    IdArray { min_len: usize },
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: true, default: None }
    }

    pub fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false, default: None }
    }

    pub fn with_default(name: &'static str, kind: FieldKind, default: Value) -> Self {
        Self { name, kind, required: false, default: Some(default) }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SectionSchema {
    pub fields: Vec<FieldSpec>,
    /// Strict sections reject unknown fields; lax sections drop them.
    pub strict: bool,
}

impl SectionSchema {
    pub fn strict(fields: Vec<FieldSpec>) -> Self {
        Self { fields, strict: true }
    }

    pub fn lax(fields: Vec<FieldSpec>) -> Self {
        Self { fields, strict: false }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

/// Cross-field constraints applied after per-field coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refinement {
    /// The coerced body must carry at least one field (update endpoints).
    AtLeastOneBodyField,
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub body: SectionSchema,
    pub query: SectionSchema,
    pub path: SectionSchema,
    pub refinements: Vec<Refinement>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, section: SectionSchema) -> Self {
        self.body = section;
        self
    }

    pub fn query(mut self, section: SectionSchema) -> Self {
        self.query = section;
        self
    }

    pub fn path(mut self, section: SectionSchema) -> Self {
        self.path = section;
        self
    }

    pub fn refine(mut self, refinement: Refinement) -> Self {
        self.refinements.push(refinement);
        self
    }
}

/// The pagination/sort/search query section shared by every collection
/// endpoint.
pub fn list_query_section(default_limit: i64) -> SectionSchema {
    SectionSchema::lax(vec![
        FieldSpec::with_default("page", FieldKind::Int { min: 1, max: i64::MAX }, Value::from(1)),
        FieldSpec::with_default(
            "limit",
            FieldKind::Int { min: 1, max: i64::MAX },
            Value::from(default_limit),
        ),
        FieldSpec::optional("sortBy", FieldKind::Str { min_len: 0, max_len: 100 }),
        FieldSpec::optional("search", FieldKind::Str { min_len: 0, max_len: 200 }),
    ])
}

/// Path section for `/:id` endpoints.
pub fn id_path_section() -> SectionSchema {
    SectionSchema::strict(vec![FieldSpec::required("id", FieldKind::Id)])
}
