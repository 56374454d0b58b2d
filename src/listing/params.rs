//! User-supplied listing parameters and sort parsing.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    /// Store column name, already resolved through the allow-list.
    pub column: &'static str,
    pub direction: SortDirection,
}

/// Pagination/sort/search knobs as they arrive from the query section,
/// after validation has coerced `page` and `limit` to integers.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub page: i64,
    pub limit: i64,
    /// `"<field>:<asc|desc>"`; unknown fields or malformed values fall back
    /// to the resource default instead of erroring.
    pub sort_by: Option<String>,
    pub search: Option<String>,
}

impl ListParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit, sort_by: None, search: None }
    }
}

/// Resolve a raw `sortBy` value against an allow-list of `(api_field,
/// column)` pairs. Returns None on anything unrecognized; the caller falls
/// back to the default ordering silently.
pub fn parse_sort(raw: Option<&str>, allowed: &[(&'static str, &'static str)]) -> Option<SortOrder> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let (field, dir) = match raw.split_once(':') {
        Some((f, d)) => (f.trim(), d.trim()),
        None => (raw, "asc"),
    };
    let column = allowed.iter().find(|(api, _)| *api == field).map(|(_, col)| *col)?;
    let direction = if dir.eq_ignore_ascii_case("desc") {
        SortDirection::Desc
    } else if dir.eq_ignore_ascii_case("asc") {
        SortDirection::Asc
    } else {
        return None;
    };
    Some(SortOrder { column, direction })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[(&str, &str)] = &[("name", "name"), ("createdAt", "created_at")];

    #[test]
    fn parses_field_and_direction() {
        let sort = parse_sort(Some("name:desc"), ALLOWED).unwrap();
        assert_eq!(sort.column, "name");
        assert_eq!(sort.direction, SortDirection::Desc);
    }

    #[test]
    fn maps_api_field_to_column() {
        let sort = parse_sort(Some("createdAt:asc"), ALLOWED).unwrap();
        assert_eq!(sort.column, "created_at");
    }

    #[test]
    fn bare_field_defaults_to_asc() {
        let sort = parse_sort(Some("name"), ALLOWED).unwrap();
        assert_eq!(sort.direction, SortDirection::Asc);
    }

    #[test]
    fn unknown_field_falls_back_to_none() {
        assert!(parse_sort(Some("passwordHash:asc"), ALLOWED).is_none());
        assert!(parse_sort(Some("name:sideways"), ALLOWED).is_none());
        assert!(parse_sort(Some(""), ALLOWED).is_none());
        assert!(parse_sort(None, ALLOWED).is_none());
    }
}
