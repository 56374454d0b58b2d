use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: i64,
    pub item_count: i64,
    pub items_per_page: i64,
    pub total_pages: i64,
    pub current_page: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Combine a page of items with the independent count-query total.
    pub fn assemble(items: Vec<T>, total_items: i64, page: i64, limit: i64) -> Self {
        // Guard the division; a zero limit yields zero pages.
        let total_pages = if limit > 0 { (total_items + limit - 1) / limit } else { 0 };
        let item_count = items.len() as i64;
        Self {
            items,
            meta: PageMeta {
                total_items,
                item_count,
                items_per_page: limit,
                total_pages,
                current_page: page,
            },
        }
    }

    pub fn empty(page: i64, limit: i64) -> Self {
        Self::assemble(vec![], 0, page, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_is_ceiling_of_total_over_limit() {
        let page = Page::assemble(vec![1], 2, 1, 1);
        assert_eq!(page.meta.total_pages, 2);

        let page = Page::assemble(vec![1, 2, 3], 10, 1, 3);
        assert_eq!(page.meta.total_pages, 4);

        let page: Page<i32> = Page::assemble(vec![], 0, 1, 10);
        assert_eq!(page.meta.total_pages, 0);
    }

    #[test]
    fn zero_limit_yields_zero_pages() {
        let page: Page<i32> = Page::assemble(vec![], 42, 1, 0);
        assert_eq!(page.meta.total_pages, 0);
    }

    #[test]
    fn meta_echoes_request_shape() {
        let page = Page::assemble(vec!["a", "b"], 7, 2, 2);
        assert_eq!(page.meta.item_count, 2);
        assert_eq!(page.meta.items_per_page, 2);
        assert_eq!(page.meta.current_page, 2);
        assert_eq!(page.meta.total_items, 7);
    }

    #[test]
    fn serializes_camel_case_meta() {
        let page = Page::assemble(vec![1], 1, 1, 10);
        let v = serde_json::to_value(&page).unwrap();
        assert!(v["meta"]["totalItems"].is_i64());
        assert!(v["meta"]["itemsPerPage"].is_i64());
    }
}
