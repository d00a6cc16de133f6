//! # Book Search Shared
//!
//! This crate defines shared data structures used across the book search indexer.
//! It includes the primary-store book record, the document stored in the search
//! index, and the query and result envelopes exchanged with callers.

pub mod types;

pub use types::book::{BookRecord, NewBook, ValidationError};
pub use types::book_document::BookDocument;
pub use types::search_query::SearchQuery;
pub use types::search_result::{BookPage, ErrorResponse, PageMeta};
