//! Request and response types for search index operations.

use book_search_shared::BookDocument;

use crate::errors::SearchIndexError;

/// Result of a batch operation for a single document.
///
/// Indicates whether indexing one document of a bulk submission succeeded,
/// with error details if it failed.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOperationResult {
    /// The id of the document (and of the book record it mirrors).
    pub document_id: i64,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

impl BatchOperationResult {
    pub fn succeeded(document_id: i64) -> Self {
        Self {
            document_id,
            success: true,
            error: None,
        }
    }

    pub fn failed(document_id: i64, error: SearchIndexError) -> Self {
        Self {
            document_id,
            success: false,
            error: Some(error),
        }
    }
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// Bulk indexing is best-effort: a failed document never stops the others from
/// being attempted, so callers get counts and per-document outcomes instead of
/// a single pass/fail.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOperationSummary {
    /// Total number of documents in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each document.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// A summary of nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a summary from individual results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Mark every document as failed with the same error.
    pub fn all_failed(documents: &[BookDocument], error: &SearchIndexError) -> Self {
        Self::from_results(
            documents
                .iter()
                .map(|doc| BatchOperationResult::failed(doc.id, error.clone()))
                .collect(),
        )
    }

    /// Fold another summary into this one.
    pub fn merge(&mut self, other: BatchOperationSummary) {
        self.total += other.total;
        self.succeeded += other.succeeded;
        self.failed += other.failed;
        self.results.extend(other.results);
    }

    /// Iterate over the failed results only.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}

/// Documents matched by a search, with the total match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    /// Matched documents for the requested page, most relevant first.
    pub documents: Vec<BookDocument>,
    /// Total number of matches across all pages.
    pub total: u64,
}

impl SearchHits {
    pub fn new(documents: Vec<BookDocument>, total: u64) -> Self {
        Self { documents, total }
    }

    /// No matches.
    pub fn empty() -> Self {
        Self::default()
    }
}
