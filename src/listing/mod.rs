pub mod page;
pub mod params;
pub mod query;

pub use page::{Page, PageMeta};
pub use params::{ListParams, SortDirection, SortOrder};
pub use query::{ListQuery, ResourceListSpec, ScopeFilter, SearchClause, AUTHOR_LIST_SPEC, BOOK_LIST_SPEC};
