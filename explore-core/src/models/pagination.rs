//! Pagination support for discover queries
//!
//! Adapters whose upstream returns the whole catalog slice locally with
//! [`PageParams::slice`]; adapters that paginate upstream forward
//! `page` and `page_size` instead.

use serde::{Deserialize, Serialize};

/// Maximum allowed page size
pub const MAX_PAGE_SIZE: u32 = 100;

/// Minimum page number (1-indexed)
pub const MIN_PAGE: u32 = 1;

/// Pagination parameters for discover queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    /// Page number (1-indexed)
    pub page: u32,
    /// Number of items per page
    pub page_size: u32,
}

impl PageParams {
    /// Create pagination parameters with validation
    ///
    /// # Examples
    /// ```
    /// use explore_core::PageParams;
    ///
    /// let params = PageParams::new(None, None, 20);
    /// assert_eq!(params.page, 1);
    /// assert_eq!(params.page_size, 20);
    ///
    /// // page 0 is treated as page 1, oversize pages are capped
    /// let params = PageParams::new(Some(0), Some(500), 20);
    /// assert_eq!(params.page, 1);
    /// assert_eq!(params.page_size, 100);
    /// ```
    #[must_use]
    pub fn new(page: Option<u32>, page_size: Option<u32>, default_page_size: u32) -> Self {
        let page = page.unwrap_or(MIN_PAGE).max(MIN_PAGE);
        let page_size = page_size
            .unwrap_or(default_page_size)
            .clamp(1, MAX_PAGE_SIZE);

        Self { page, page_size }
    }

    /// Offset of the first item on this page
    #[must_use]
    pub const fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }

    /// Take this page out of a complete result list.
    ///
    /// Returns `items[(page-1)*size .. min(page*size, len)]`, or an empty
    /// list when the page starts past the end.
    #[must_use]
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let start = self.offset();
        if start >= items.len() {
            return Vec::new();
        }
        items
            .into_iter()
            .skip(start)
            .take(self.page_size as usize)
            .collect()
    }
}
