//! Resolved listing queries: the intermediate form both store backends
//! execute, so listing stays a pure function of (filters, sort, page, limit).

use uuid::Uuid;

use crate::config::PaginationConfig;

use super::params::{parse_sort, ListParams, SortDirection, SortOrder};

/// Hard, non-optional predicate applied independently of user-supplied
/// search and sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFilter {
    CreatedBy(Uuid),
    IdIn(Vec<Uuid>),
}

/// Case-insensitive free-text match, OR-combined over the given columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchClause {
    pub columns: &'static [&'static str],
    pub term: String,
}

/// Per-resource listing surface: which fields may be sorted on (api name →
/// column), which columns free-text search touches, and the default order.
#[derive(Debug, Clone)]
pub struct ResourceListSpec {
    pub sortable: &'static [(&'static str, &'static str)],
    pub searchable: &'static [&'static str],
    pub default_sort: SortOrder,
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    pub scope: Vec<ScopeFilter>,
    pub search: Option<SearchClause>,
    pub sort: SortOrder,
    pub skip: i64,
    pub take: i64,
    /// The page/limit the caller asked for, echoed into the page meta.
    pub page: i64,
    pub limit: i64,
}

impl ListQuery {
    /// Turn raw parameters into an executable query. Invalid `sortBy` never
    /// errors, it falls back to the default ordering; a limit above the
    /// configured maximum is capped, not rejected.
    pub fn resolve(
        params: &ListParams,
        spec: &ResourceListSpec,
        pagination: &PaginationConfig,
        scope: Vec<ScopeFilter>,
    ) -> Self {
        let page = params.page.max(1);
        let mut limit = if params.limit > 0 { params.limit } else { pagination.default_limit };
        if limit > pagination.max_limit {
            tracing::warn!(
                "requested limit {} exceeds max {}, capping",
                limit,
                pagination.max_limit
            );
            limit = pagination.max_limit;
        }

        let sort = parse_sort(params.sort_by.as_deref(), spec.sortable)
            .unwrap_or_else(|| spec.default_sort.clone());

        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|term| SearchClause { columns: spec.searchable, term: term.to_string() });

        Self { scope, search, sort, skip: (page - 1) * limit, take: limit, page, limit }
    }
}

pub const DEFAULT_SORT: SortOrder =
    SortOrder { column: "created_at", direction: SortDirection::Desc };

/// Listing surface for authors: sort by name or creation time, search over
/// name and bio.
pub const AUTHOR_LIST_SPEC: ResourceListSpec = ResourceListSpec {
    sortable: &[("name", "name"), ("createdAt", "created_at")],
    searchable: &["name", "bio"],
    default_sort: DEFAULT_SORT,
};

/// Listing surface for books: sort by title, publication or creation time,
/// search over title and ISBN.
pub const BOOK_LIST_SPEC: ResourceListSpec = ResourceListSpec {
    sortable: &[
        ("title", "title"),
        ("publishedDate", "published_date"),
        ("createdAt", "created_at"),
    ],
    searchable: &["title", "isbn"],
    default_sort: DEFAULT_SORT,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn pagination() -> PaginationConfig {
        PaginationConfig { default_limit: 10, max_limit: 100 }
    }

    #[test]
    fn computes_skip_from_page_and_limit() {
        let params = ListParams::new(3, 20);
        let q = ListQuery::resolve(&params, &AUTHOR_LIST_SPEC, &pagination(), vec![]);
        assert_eq!(q.skip, 40);
        assert_eq!(q.take, 20);
    }

    #[test]
    fn invalid_sort_falls_back_to_default() {
        let mut params = ListParams::new(1, 10);
        params.sort_by = Some("createdById:desc".to_string());
        let q = ListQuery::resolve(&params, &AUTHOR_LIST_SPEC, &pagination(), vec![]);
        assert_eq!(q.sort, DEFAULT_SORT);
    }

    #[test]
    fn limit_is_capped_at_configured_max() {
        let params = ListParams::new(1, 5000);
        let q = ListQuery::resolve(&params, &BOOK_LIST_SPEC, &pagination(), vec![]);
        assert_eq!(q.take, 100);
        assert_eq!(q.limit, 100);
    }

    #[test]
    fn blank_search_is_dropped() {
        let mut params = ListParams::new(1, 10);
        params.search = Some("   ".to_string());
        let q = ListQuery::resolve(&params, &AUTHOR_LIST_SPEC, &pagination(), vec![]);
        assert!(q.search.is_none());
    }
}
