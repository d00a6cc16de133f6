//! Search query types for the book search indexer.

use serde::{Deserialize, Serialize};

/// Default page number when the caller does not provide one.
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size when the caller does not provide one.
pub const DEFAULT_PER_PAGE: u32 = 10;

/// A paginated free-text search request.
///
/// The query text is not validated here: an empty string is a valid,
/// degenerate query. Rejecting empty queries is the job of whatever boundary
/// receives them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    /// The free-text search string.
    #[serde(rename = "q")]
    pub text: String,

    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u32,

    /// Number of results per page.
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    DEFAULT_PAGE
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

impl SearchQuery {
    /// Create a query for the first page with the default page size.
    ///
    /// # Example
    ///
    /// ```
    /// use book_search_shared::SearchQuery;
    ///
    /// let query = SearchQuery::new("tolkien").with_page(2).with_per_page(25);
    /// assert_eq!(query.offset(), 25);
    /// ```
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Set the page number. Zero is clamped to the first page.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Set the page size. Zero is clamped to one.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// Number of matches to skip: `(page - 1) * per_page`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.per_page.max(1))
    }

    /// Maximum number of matches to return.
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page.max(1))
    }
}
