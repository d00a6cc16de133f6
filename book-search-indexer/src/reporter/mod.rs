//! Reporting of indexing outcomes that are not returned to any caller.
//!
//! Background indexing swallows its failures. They are handed to an
//! [`IndexEventReporter`] so they stay observable without being tied to a
//! particular sink.

use book_search_repository::SearchIndexError;
use tracing::{debug, error, warn};

use crate::errors::IngestError;

/// Sink for indexing outcomes.
pub trait IndexEventReporter: Send + Sync {
    /// A created book reached the index.
    fn indexed(&self, book_id: i64);

    /// A created book could not be indexed. It will not be retried.
    fn index_failed(&self, book_id: i64, error: &IngestError);

    /// A creation event never reached a worker.
    fn dispatch_dropped(&self, book_id: i64, error: &IngestError);

    /// One document of a bulk reindex was not written.
    fn reindex_item_failed(&self, book_id: i64, error: &SearchIndexError);
}

/// Reporter that writes every outcome as a structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl IndexEventReporter for TracingReporter {
    fn indexed(&self, book_id: i64) {
        debug!(book_id, "Book indexed");
    }

    fn index_failed(&self, book_id: i64, error: &IngestError) {
        error!(book_id, error = %error, "Failed to index created book");
    }

    fn dispatch_dropped(&self, book_id: i64, error: &IngestError) {
        warn!(book_id, error = %error, "Dropped index event");
    }

    fn reindex_item_failed(&self, book_id: i64, error: &SearchIndexError) {
        warn!(book_id, error = %error, "Book not reindexed");
    }
}
