//! Core data structures shared across the book search indexer.

pub mod book;
pub mod book_document;
pub mod search_query;
pub mod search_result;

pub use book::{BookRecord, NewBook, ValidationError};
pub use book_document::BookDocument;
pub use search_query::SearchQuery;
pub use search_result::{BookPage, ErrorResponse, PageMeta};
