pub mod pipeline;
pub mod schema;

pub use pipeline::{validate, RequestSections, Validated};
pub use schema::{
    id_path_section, list_query_section, FieldKind, FieldSpec, Refinement, Schema, Section,
    SectionSchema,
};
