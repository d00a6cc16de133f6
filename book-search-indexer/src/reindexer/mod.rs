//! Bulk reindexer.
//!
//! Rebuilds the search index from the primary store. Every book is read in id
//! order, one page at a time, and each page is upserted as a batch. The index
//! is not cleared first: existing documents are overwritten by id, and
//! documents for books that no longer exist are left alone.

use std::sync::Arc;

use book_search_repository::{BatchOperationSummary, SearchIndexService};
use book_search_shared::BookDocument;
use tracing::{info, instrument};

use crate::errors::StoreError;
use crate::reporter::IndexEventReporter;
use crate::store::BookStore;

/// Default number of books read and submitted per page.
pub const DEFAULT_REINDEX_BATCH_SIZE: usize = 500;

/// Outcome of a full reindex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReindexSummary {
    pub indexed: usize,
    pub failed: usize,
}

impl ReindexSummary {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, batch: &BatchOperationSummary) {
        self.indexed += batch.succeeded;
        self.failed += batch.failed;
    }
}

pub struct BulkReindexer {
    store: Arc<dyn BookStore>,
    index: Arc<SearchIndexService>,
    reporter: Arc<dyn IndexEventReporter>,
    batch_size: usize,
}

impl BulkReindexer {
    pub fn new(
        store: Arc<dyn BookStore>,
        index: Arc<SearchIndexService>,
        reporter: Arc<dyn IndexEventReporter>,
    ) -> Self {
        Self {
            store,
            index,
            reporter,
            batch_size: DEFAULT_REINDEX_BATCH_SIZE,
        }
    }

    /// Set how many books are read and submitted per page. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Index every book in the primary store.
    ///
    /// Document failures do not stop the run; they are reported one by one
    /// and counted in the summary. Only a primary-store read failure ends the
    /// run early, since the remaining books cannot be listed.
    #[instrument(skip(self), fields(batch_size = self.batch_size))]
    pub async fn reindex_all(&self) -> Result<ReindexSummary, StoreError> {
        let mut summary = ReindexSummary::default();
        let mut after_id = None;

        loop {
            let books = self.store.books_after(after_id, self.batch_size).await?;
            let Some(last) = books.last() else {
                break;
            };
            after_id = Some(last.id);
            let page_len = books.len();

            let documents: Vec<BookDocument> = books.into_iter().map(BookDocument::from).collect();
            let batch = self.index.index_bulk(documents).await;

            for failure in batch.failures() {
                if let Some(error) = &failure.error {
                    self.reporter.reindex_item_failed(failure.document_id, error);
                }
            }
            summary.record(&batch);

            info!(
                page_len,
                indexed = summary.indexed,
                failed = summary.failed,
                "Reindex progress"
            );

            if page_len < self.batch_size {
                break;
            }
        }

        info!(
            indexed = summary.indexed,
            failed = summary.failed,
            "Reindex finished"
        );
        Ok(summary)
    }
}
