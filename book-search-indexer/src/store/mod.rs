//! Primary store access.
//!
//! The primary store owns book records. The indexer only needs two things from
//! it: writing a new book, and reading every book back in id order for a full
//! reindex.

mod postgres;

use async_trait::async_trait;
use book_search_shared::{BookRecord, NewBook};

use crate::errors::StoreError;

pub use postgres::PostgresBookStore;

/// Abstract interface to the primary book store.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Write a new book and return it with its assigned id.
    ///
    /// # Returns
    ///
    /// * `Ok(BookRecord)` - The stored record
    /// * `Err(StoreError::DuplicateIsbn)` - Another book already has this isbn
    /// * `Err(StoreError)` - The write failed
    async fn insert_book(&self, book: &NewBook) -> Result<BookRecord, StoreError>;

    /// Read up to `limit` books with an id greater than `after_id`, in id order.
    ///
    /// `None` starts from the beginning. An empty result means there is nothing
    /// left to read.
    async fn books_after(
        &self,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<BookRecord>, StoreError>;
}
