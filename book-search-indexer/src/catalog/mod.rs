//! Book creation.
//!
//! Creating a book writes it to the primary store and then hands it to the
//! synchronizer. The caller gets the stored record back as soon as the store
//! write succeeds; indexing happens later and its outcome never affects the
//! result.

use std::sync::Arc;

use book_search_shared::{BookRecord, NewBook};
use tracing::{info, instrument};

use crate::errors::StoreError;
use crate::store::BookStore;
use crate::synchronizer::{BookEvent, SyncDispatcher};

pub struct BookCatalog {
    store: Arc<dyn BookStore>,
    dispatcher: SyncDispatcher,
}

impl BookCatalog {
    pub fn new(store: Arc<dyn BookStore>, dispatcher: SyncDispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Validate and store a new book, then queue it for indexing.
    ///
    /// # Returns
    ///
    /// * `Ok(BookRecord)` - The stored book. It may not be searchable yet.
    /// * `Err(StoreError::Invalid)` - The book broke a field rule
    /// * `Err(StoreError::DuplicateIsbn)` - The isbn is already taken
    /// * `Err(StoreError)` - The store write failed
    #[instrument(skip(self, book), fields(isbn = %book.isbn))]
    pub async fn create_book(&self, book: NewBook) -> Result<BookRecord, StoreError> {
        book.validate()?;

        let record = self.store.insert_book(&book).await?;
        info!(book_id = record.id, "Book created");

        // A dropped event is already counted and reported by the dispatcher.
        let _ = self.dispatcher.dispatch(BookEvent::Created(record.clone()));

        Ok(record)
    }
}
