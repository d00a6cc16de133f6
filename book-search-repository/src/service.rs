//! Search index service implementation.
//!
//! This module provides the search index client that the rest of the system
//! goes through. It bounds every backend call with a timeout, splits bulk
//! submissions into requests of a configured size, and keeps malformed
//! documents from ever reaching the backend.

use std::future::Future;

use book_search_shared::{BookDocument, SearchQuery};
use tracing::{debug, warn};

use crate::config::SearchIndexServiceConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationResult, BatchOperationSummary, SearchHits};

/// The search index client.
///
/// Owns the provider (and therefore the backend connection). Construct one
/// per process and share it behind an `Arc`; all methods take `&self` and are
/// safe to call concurrently.
///
/// # Example
///
/// ```no_run
/// use book_search_repository::opensearch::{ConnectionSettings, IndexConfig};
/// use book_search_repository::{OpenSearchProvider, SearchIndexService};
/// use book_search_shared::SearchQuery;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let settings = ConnectionSettings::new("http", "localhost", 9200);
/// let provider = OpenSearchProvider::new(&settings, IndexConfig::new("books", 0))?;
/// let service = SearchIndexService::new(Box::new(provider));
///
/// let hits = service.search(&SearchQuery::new("herbert")).await?;
/// println!("{} matches", hits.total);
/// # Ok(())
/// # }
/// ```
pub struct SearchIndexService {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchIndexServiceConfig,
}

impl SearchIndexService {
    /// Create a new SearchIndexService with default configuration.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexServiceConfig::default(),
        }
    }

    /// Create a new SearchIndexService with custom configuration.
    pub fn with_config(
        provider: Box<dyn SearchIndexProvider>,
        config: SearchIndexServiceConfig,
    ) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &SearchIndexServiceConfig {
        &self.config
    }

    /// Check that a document can be sent to the backend.
    fn validate_document(document: &BookDocument) -> Result<(), SearchIndexError> {
        if document.id <= 0 {
            return Err(SearchIndexError::validation(format!(
                "document id must be positive, got {}",
                document.id
            )));
        }
        if !document.price.is_finite() {
            return Err(SearchIndexError::validation(format!(
                "document {} has a non-finite price",
                document.id
            )));
        }
        Ok(())
    }

    /// Run a backend call under the configured timeout.
    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T, SearchIndexError>
    where
        F: Future<Output = Result<T, SearchIndexError>>,
    {
        match tokio::time::timeout(self.config.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SearchIndexError::timeout(format!(
                "{} did not complete within {:?}",
                operation, self.config.request_timeout
            ))),
        }
    }

    /// Ensure the index and alias exist. Called once at startup.
    pub async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        self.bounded("ensure_index_exists", self.provider.ensure_index_exists())
            .await
    }

    /// Upsert a single document keyed by its id.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The document was written
    /// * `Err(SearchIndexError::ValidationError)` - The document is malformed and was not sent
    /// * `Err(SearchIndexError::Timeout)` - The backend did not answer in time
    /// * `Err(SearchIndexError)` - The backend was unreachable or rejected the document
    pub async fn index_one(&self, document: &BookDocument) -> Result<(), SearchIndexError> {
        Self::validate_document(document)?;
        self.bounded("index", self.provider.index_document(document))
            .await
    }

    /// Upsert many documents, best-effort.
    ///
    /// Documents are sent in order, in requests of at most `max_batch_size`.
    /// Nothing here aborts the submission: malformed documents are skipped and
    /// reported, a rejected document does not affect its neighbours, and a
    /// request that fails or times out as a whole marks only its own documents
    /// as failed before the next request is attempted.
    ///
    /// Results are grouped per request, malformed documents first.
    pub async fn index_bulk(&self, documents: Vec<BookDocument>) -> BatchOperationSummary {
        let mut summary = BatchOperationSummary::empty();
        if documents.is_empty() {
            return summary;
        }

        let chunk_size = self
            .config
            .max_batch_size
            .unwrap_or(documents.len())
            .max(1);

        for chunk in documents.chunks(chunk_size) {
            let mut accepted = Vec::with_capacity(chunk.len());
            let mut rejected = Vec::new();
            for doc in chunk {
                match Self::validate_document(doc) {
                    Ok(()) => accepted.push(doc.clone()),
                    Err(e) => {
                        warn!(document_id = doc.id, error = %e, "Skipping malformed document");
                        rejected.push(BatchOperationResult::failed(doc.id, e));
                    }
                }
            }
            summary.merge(BatchOperationSummary::from_results(rejected));

            if accepted.is_empty() {
                continue;
            }

            let outcome = self
                .bounded("bulk index", self.provider.bulk_index_documents(&accepted))
                .await;
            match outcome {
                Ok(chunk_summary) => summary.merge(chunk_summary),
                Err(e) => {
                    warn!(
                        count = accepted.len(),
                        error = %e,
                        "Bulk request failed; marking its documents as failed"
                    );
                    summary.merge(BatchOperationSummary::all_failed(&accepted, &e));
                }
            }
        }

        debug!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk indexing finished"
        );
        summary
    }

    /// Run a paginated full-text search.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchHits)` - Matches for the requested page; empty with `total == 0` when nothing matches
    /// * `Err(SearchIndexError::IndexUnavailable)` - The backend could not serve the query, including timeouts
    /// * `Err(SearchIndexError::ParseError)` - The backend answered with something unreadable
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchHits, SearchIndexError> {
        self.bounded("search", self.provider.search(query))
            .await
            .map_err(|e| match e {
                SearchIndexError::Timeout(msg) => SearchIndexError::unavailable(msg),
                other => other,
            })
    }
}
