//! Shared test doubles for the indexer integration tests.
//!
//! These stand in for Postgres and OpenSearch so the flows can be exercised
//! end to end without external services.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use book_search_indexer::errors::{IngestError, StoreError};
use book_search_indexer::reporter::IndexEventReporter;
use book_search_indexer::store::BookStore;
use book_search_repository::{
    BatchOperationResult, BatchOperationSummary, SearchHits, SearchIndexError,
    SearchIndexProvider, SearchIndexService, SearchIndexServiceConfig,
};
use book_search_shared::{BookDocument, BookRecord, NewBook, SearchQuery};

// In-memory primary store
#[derive(Default)]
pub struct InMemoryBookStore {
    books: Mutex<Vec<BookRecord>>,
    fail_reads: AtomicBool,
}

impl InMemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_books(count: usize) -> Self {
        let store = Self::new();
        {
            let mut books = store.books.lock().unwrap();
            for n in 1..=count {
                books.push(new_book(n).into_record(n as i64));
            }
        }
        store
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.books.lock().unwrap().len()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn insert_book(&self, book: &NewBook) -> Result<BookRecord, StoreError> {
        let mut books = self.books.lock().unwrap();
        if books.iter().any(|b| b.isbn == book.isbn) {
            return Err(StoreError::DuplicateIsbn(book.isbn.clone()));
        }
        let id = books.last().map(|b| b.id + 1).unwrap_or(1);
        let record = book.clone().into_record(id);
        books.push(record.clone());
        Ok(record)
    }

    async fn books_after(
        &self,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<BookRecord>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::DatabaseError(sqlx::Error::PoolClosed));
        }
        let after = after_id.unwrap_or(0);
        Ok(self
            .books
            .lock()
            .unwrap()
            .iter()
            .filter(|b| b.id > after)
            .take(limit)
            .cloned()
            .collect())
    }
}

// In-memory search engine: case-insensitive term match over the searchable fields
#[derive(Clone, Default)]
pub struct InMemorySearchProvider {
    documents: Arc<Mutex<BTreeMap<i64, BookDocument>>>,
    bulk_calls: Arc<Mutex<Vec<usize>>>,
    reject_ids: Arc<Mutex<HashSet<i64>>>,
    down: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl InMemorySearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every call hangs for `delay` before answering.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn reject(&self, id: i64) {
        self.reject_ids.lock().unwrap().insert(id);
    }

    pub fn seed(&self, documents: impl IntoIterator<Item = BookDocument>) {
        let mut stored = self.documents.lock().unwrap();
        for doc in documents {
            stored.insert(doc.id, doc);
        }
    }

    pub fn document_count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.documents.lock().unwrap().contains_key(&id)
    }

    pub fn bulk_calls(&self) -> Vec<usize> {
        self.bulk_calls.lock().unwrap().clone()
    }

    async fn enter(&self) -> Result<(), SearchIndexError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.down.load(Ordering::SeqCst) {
            return Err(SearchIndexError::unavailable("connection refused"));
        }
        Ok(())
    }

    fn matches(doc: &BookDocument, text: &str) -> bool {
        let haystack = format!(
            "{} {} {} {}",
            doc.title, doc.author, doc.description, doc.isbn
        )
        .to_lowercase();
        text.to_lowercase()
            .split_whitespace()
            .any(|term| haystack.contains(term))
    }
}

#[async_trait]
impl SearchIndexProvider for InMemorySearchProvider {
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        self.enter().await
    }

    async fn index_document(&self, document: &BookDocument) -> Result<(), SearchIndexError> {
        self.enter().await?;
        if self.reject_ids.lock().unwrap().contains(&document.id) {
            return Err(SearchIndexError::write_failed("mapper_parsing_exception"));
        }
        self.documents
            .lock()
            .unwrap()
            .insert(document.id, document.clone());
        Ok(())
    }

    async fn bulk_index_documents(
        &self,
        documents: &[BookDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        self.bulk_calls.lock().unwrap().push(documents.len());
        self.enter().await?;

        let rejected = self.reject_ids.lock().unwrap().clone();
        let mut stored = self.documents.lock().unwrap();
        let results = documents
            .iter()
            .map(|doc| {
                if rejected.contains(&doc.id) {
                    BatchOperationResult::failed(
                        doc.id,
                        SearchIndexError::write_failed("mapper_parsing_exception"),
                    )
                } else {
                    stored.insert(doc.id, doc.clone());
                    BatchOperationResult::succeeded(doc.id)
                }
            })
            .collect();
        Ok(BatchOperationSummary::from_results(results))
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchHits, SearchIndexError> {
        self.enter().await?;

        let matched: Vec<BookDocument> = self
            .documents
            .lock()
            .unwrap()
            .values()
            .filter(|doc| Self::matches(doc, &query.text))
            .cloned()
            .collect();
        let total = matched.len() as u64;
        let page = matched
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit() as usize)
            .collect();
        Ok(SearchHits::new(page, total))
    }
}

// Reporter that remembers what it was told
#[derive(Default)]
pub struct RecordingReporter {
    pub indexed: Mutex<Vec<i64>>,
    pub failed: Mutex<Vec<(i64, String)>>,
    pub dropped: Mutex<Vec<(i64, String)>>,
    pub reindex_failed: Mutex<Vec<i64>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IndexEventReporter for RecordingReporter {
    fn indexed(&self, book_id: i64) {
        self.indexed.lock().unwrap().push(book_id);
    }

    fn index_failed(&self, book_id: i64, error: &IngestError) {
        self.failed.lock().unwrap().push((book_id, error.to_string()));
    }

    fn dispatch_dropped(&self, book_id: i64, error: &IngestError) {
        self.dropped
            .lock()
            .unwrap()
            .push((book_id, error.to_string()));
    }

    fn reindex_item_failed(&self, book_id: i64, _error: &SearchIndexError) {
        self.reindex_failed.lock().unwrap().push(book_id);
    }
}

pub fn index_service(provider: &InMemorySearchProvider) -> Arc<SearchIndexService> {
    Arc::new(SearchIndexService::new(Box::new(provider.clone())))
}

pub fn index_service_with(
    provider: &InMemorySearchProvider,
    config: SearchIndexServiceConfig,
) -> Arc<SearchIndexService> {
    Arc::new(SearchIndexService::with_config(
        Box::new(provider.clone()),
        config,
    ))
}

/// A valid book whose fields are unique to `n`.
pub fn new_book(n: usize) -> NewBook {
    NewBook {
        title: format!("Volume {}", n),
        author: format!("Author{}", n),
        description: format!("The collected notes, part {}.", n),
        isbn: format!("978{:010}", n),
        price: 10.0 + n as f64,
    }
}

pub fn document(n: usize) -> BookDocument {
    BookDocument::from(new_book(n).into_record(n as i64))
}
