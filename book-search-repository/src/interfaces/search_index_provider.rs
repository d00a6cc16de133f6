//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use book_search_shared::{BookDocument, SearchQuery};

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationSummary, SearchHits};

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into `SearchIndexService`, which adds timeouts,
/// request chunking and document checks on top. Tests substitute mock
/// implementations.
///
/// Implementations must be safe to call concurrently from many tasks without
/// any locking on the caller's side.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Ensure the search index and its alias exist, creating them if necessary.
    ///
    /// Called once during application startup, before any document operation.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError>;

    /// Insert or replace a document, keyed by its id.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the document was written
    /// * `Err(SearchIndexError)` - If the backend is unreachable or rejected the document
    async fn index_document(&self, document: &BookDocument) -> Result<(), SearchIndexError>;

    /// Insert or replace many documents in one backend request.
    ///
    /// A rejected document must not prevent the others from being written; each
    /// document's outcome is reported in the summary.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Per-document outcomes
    /// * `Err(SearchIndexError)` - If the request as a whole failed (nothing is known to be written)
    async fn bulk_index_documents(
        &self,
        documents: &[BookDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Run a full-text match over title, author, description and isbn.
    ///
    /// Skips `query.offset()` matches and returns at most `query.limit()`
    /// documents, most relevant first, along with the total match count.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchHits)` - Possibly empty when nothing matches
    /// * `Err(SearchIndexError::IndexUnavailable)` - If the backend could not serve the query
    async fn search(&self, query: &SearchQuery) -> Result<SearchHits, SearchIndexError>;
}
