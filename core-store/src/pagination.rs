//! Pagination helper types shared by repository queries

use serde::{Deserialize, Serialize};

/// Pagination request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number, 0-indexed
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl PageRequest {
    /// Create a new page request
    ///
    /// # Examples
    ///
    /// ```
    /// use core_store::PageRequest;
    ///
    /// let request = PageRequest::new(0, 20);
    /// assert_eq!(request.offset(), 0);
    /// assert_eq!(request.limit(), 20);
    /// ```
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// SQL OFFSET value for this request
    pub fn offset(&self) -> u32 {
        self.page * self.page_size
    }

    /// SQL LIMIT value (same as the page size)
    pub fn limit(&self) -> u32 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: 50,
        }
    }
}

/// One page of results plus paging metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: u64,
    /// Current page number
    pub page: u32,
    /// Total number of pages
    pub total_pages: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Build a page from query results and the originating request
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let total_pages = if request.page_size == 0 {
            0
        } else {
            ((total as f64) / (request.page_size as f64)).ceil() as u32
        };

        Self {
            items,
            total,
            page: request.page,
            total_pages,
            page_size: request.page_size,
        }
    }

    /// Whether pages exist after this one
    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// Whether pages exist before this one
    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    /// Map the page items to a different type, keeping the metadata
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            total_pages: self.total_pages,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_limit() {
        let request = PageRequest::new(2, 20);
        assert_eq!(request.offset(), 40);
        assert_eq!(request.limit(), 20);
    }

    #[test]
    fn test_default_request() {
        let request = PageRequest::default();
        assert_eq!(request.page, 0);
        assert_eq!(request.page_size, 50);
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2, 3], 25, PageRequest::new(0, 10));
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next());
        assert!(!page.has_previous());

        let last = Page::new(vec![1], 25, PageRequest::new(2, 10));
        assert!(!last.has_next());
        assert!(last.has_previous());
    }

    #[test]
    fn test_page_map() {
        let page = Page::new(vec![1, 2, 3], 3, PageRequest::new(0, 10));
        let mapped = page.map(|x| x.to_string());
        assert_eq!(mapped.items, vec!["1", "2", "3"]);
        assert_eq!(mapped.total, 3);
    }

    #[test]
    fn test_zero_page_size() {
        let page = Page::new(Vec::<i32>::new(), 10, PageRequest::new(0, 0));
        assert_eq!(page.total_pages, 0);
    }
}
