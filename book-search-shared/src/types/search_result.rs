//! Search result types for the book search indexer.
//!
//! This module defines the response envelopes returned from search operations.
//! The page shape matches the one the primary store uses for its own listings.

use serde::{Deserialize, Serialize};

use crate::types::book::BookRecord;

/// Pagination metadata attached to every page of results.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageMeta {
    pub current_page: u32,
    pub last_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl PageMeta {
    /// Compute pagination metadata for a page of `total` matches.
    ///
    /// `last_page` is `ceil(total / per_page)`. An empty result still has one
    /// (empty) page, the same way the primary store's paginator reports it.
    pub fn new(current_page: u32, per_page: u32, total: u64) -> Self {
        let per_page = per_page.max(1);
        let pages = total.div_ceil(u64::from(per_page)).max(1);
        Self {
            current_page,
            last_page: u32::try_from(pages).unwrap_or(u32::MAX),
            per_page,
            total,
        }
    }
}

/// A page of books returned from a search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookPage {
    /// The books on this page, most relevant first.
    pub data: Vec<BookRecord>,
    pub meta: PageMeta,
}

impl BookPage {
    /// Create a new page of results.
    pub fn new(data: Vec<BookRecord>, meta: PageMeta) -> Self {
        Self { data, meta }
    }
}

/// Error envelope returned when the search backend cannot serve a request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_page_rounds_up() {
        let meta = PageMeta::new(2, 10, 15);
        assert_eq!(meta.current_page, 2);
        assert_eq!(meta.last_page, 2);
        assert_eq!(meta.per_page, 10);
        assert_eq!(meta.total, 15);
    }

    #[test]
    fn test_last_page_exact_multiple() {
        assert_eq!(PageMeta::new(1, 10, 30).last_page, 3);
        assert_eq!(PageMeta::new(1, 10, 31).last_page, 4);
        assert_eq!(PageMeta::new(1, 1, 7).last_page, 7);
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let meta = PageMeta::new(1, 10, 0);
        assert_eq!(meta.last_page, 1);
        assert_eq!(meta.total, 0);
    }

    #[test]
    fn test_serialization_shape() {
        let page = BookPage::new(
            vec![BookRecord {
                id: 1,
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                description: "Desert planet politics.".to_string(),
                isbn: "9780441172719".to_string(),
                price: 9.99,
            }],
            PageMeta::new(1, 10, 1),
        );

        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["data"][0]["id"], 1);
        assert_eq!(json["data"][0]["isbn"], "9780441172719");
        assert_eq!(json["meta"]["current_page"], 1);
        assert_eq!(json["meta"]["last_page"], 1);
        assert_eq!(json["meta"]["per_page"], 10);
        assert_eq!(json["meta"]["total"], 1);
    }

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse::new("search backend error", "connection refused");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "search backend error");
        assert_eq!(json["message"], "connection refused");
    }
}
