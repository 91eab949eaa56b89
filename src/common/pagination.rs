// Pagination primitives shared by the list endpoints

use serde::Serialize;

/// Clamped page window for a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
}

impl PageWindow {
    /// Apply the documented bounds: `page >= 1`, `limit` in `[1, 100]`.
    pub fn clamp(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(10).clamp(1, 100);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Sort direction, parsed strictly (the API rejects unknown values)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Pagination metadata included in list responses
#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(window: PageWindow, total_items: i64) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + window.limit - 1) / window.limit
        };
        Self {
            page: window.page,
            limit: window.limit,
            total_pages,
            total_items,
            has_next: window.page < total_pages,
            has_prev: window.page > 1 && total_items > 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_clamping() {
        let w = PageWindow::clamp(None, None);
        assert_eq!(w, PageWindow { page: 1, limit: 10 });

        let w = PageWindow::clamp(Some(0), Some(0));
        assert_eq!(w, PageWindow { page: 1, limit: 1 });

        let w = PageWindow::clamp(Some(-5), Some(500));
        assert_eq!(w, PageWindow { page: 1, limit: 100 });

        let w = PageWindow::clamp(Some(2), Some(10));
        assert_eq!(w.offset(), 10);
    }

    #[test]
    fn test_sort_order_parsing_is_strict() {
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("DESC"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("upwards"), None);
        assert_eq!(SortOrder::parse(""), None);
    }

    #[test]
    fn test_pagination_math() {
        let p = Pagination::new(PageWindow { page: 2, limit: 10 }, 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_prev);

        let p = Pagination::new(PageWindow { page: 1, limit: 10 }, 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);

        let p = Pagination::new(PageWindow { page: 3, limit: 10 }, 30);
        assert!(!p.has_next);
    }
}
