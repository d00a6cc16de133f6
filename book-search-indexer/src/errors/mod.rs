//! Error types for the book search indexer.

use book_search_repository::SearchIndexError;
use book_search_shared::{ErrorResponse, ValidationError};
use thiserror::Error;

/// Errors that can occur while keeping the index in sync with created books.
///
/// These never reach the caller that created the book; they are handed to the
/// [`IndexEventReporter`](crate::reporter::IndexEventReporter) instead.
#[derive(Error, Debug, Clone)]
pub enum IngestError {
    /// The synchronizer queue was full when the event was dispatched.
    #[error("Synchronizer queue is full; dropped event for book {book_id}")]
    QueueFull { book_id: i64 },

    /// The synchronizer has shut down.
    #[error("Synchronizer is not running; dropped event for book {book_id}")]
    QueueClosed { book_id: i64 },

    /// The search index rejected or did not answer the write.
    #[error("Index error: {0}")]
    IndexError(#[from] SearchIndexError),
}

/// Errors from the primary store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The book failed model validation and was not written.
    #[error("Invalid book: {0}")]
    Invalid(#[from] ValidationError),

    /// Another book already uses this isbn.
    #[error("A book with isbn {0} already exists")]
    DuplicateIsbn(String),

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Errors returned by the search query service.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The search engine could not serve the query. Not the same as zero matches.
    #[error("Search index unavailable: {0}")]
    IndexUnavailable(String),

    /// The search engine answered, but the answer could not be used.
    #[error("Search failed: {0}")]
    SearchFailed(String),
}

impl QueryError {
    /// The `{error, message}` envelope returned to query callers.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            Self::IndexUnavailable(msg) | Self::SearchFailed(msg) => msg.clone(),
        };
        ErrorResponse::new("An error occurred while searching.", message)
    }
}

impl From<SearchIndexError> for QueryError {
    fn from(err: SearchIndexError) -> Self {
        if err.is_unavailable() {
            Self::IndexUnavailable(err.to_string())
        } else {
            Self::SearchFailed(err.to_string())
        }
    }
}
