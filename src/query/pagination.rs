use serde::{Deserialize, Serialize};

/// Offset/limit slice of a ranked result list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    /// Window `[page * per_page, (page + 1) * per_page)` for a 0-indexed page
    pub fn for_page(page: usize, per_page: usize) -> Self {
        let limit = per_page.max(1);
        Self {
            offset: page.saturating_mul(limit),
            limit,
        }
    }

    /// Exclusive end of the window
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }
}

/// Pagination metadata computed once the total hit count is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_prev: bool,
    pub has_next: bool,
}

impl Pagination {
    pub fn new(page: usize, per_page: usize, total: usize) -> Self {
        let window = PageWindow::for_page(page, per_page);
        Self {
            page,
            per_page: window.limit,
            total,
            total_pages: total.div_ceil(window.limit),
            has_prev: page > 0,
            has_next: window.end() < total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_for_page() {
        assert_eq!(
            PageWindow::for_page(0, 10),
            PageWindow {
                offset: 0,
                limit: 10
            }
        );
        assert_eq!(PageWindow::for_page(3, 10).offset, 30);
        assert_eq!(PageWindow::for_page(3, 10).end(), 40);
    }

    #[test]
    fn test_window_saturates() {
        let window = PageWindow::for_page(usize::MAX, 10);
        assert_eq!(window.offset, usize::MAX);
        assert_eq!(window.end(), usize::MAX);
    }

    #[test]
    fn test_flags() {
        let first = Pagination::new(0, 10, 25);
        assert!(!first.has_prev);
        assert!(first.has_next);
        assert_eq!(first.total_pages, 3);

        let last = Pagination::new(2, 10, 25);
        assert!(last.has_prev);
        assert!(!last.has_next);

        let exact = Pagination::new(1, 10, 20);
        assert!(!exact.has_next);
    }

    #[test]
    fn test_page_past_end() {
        let pagination = Pagination::new(50, 10, 25);
        assert!(pagination.has_prev);
        assert!(!pagination.has_next);
    }

    #[test]
    fn test_empty_result() {
        let pagination = Pagination::new(0, 10, 0);
        assert_eq!(pagination.total_pages, 0);
        assert!(!pagination.has_next);
        assert!(!pagination.has_prev);
    }
}
