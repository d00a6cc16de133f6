//! # Book Search Indexer
//!
//! Keeps a full-text search index of books in step with the primary store and
//! answers paginated search queries against it.
//!
//! ## Architecture
//!
//! Every component reaches the search engine through one shared
//! [`SearchIndexService`](book_search_repository::SearchIndexService):
//!
//! 1. **Catalog**: Writes new books to the primary store and queues them for indexing
//! 2. **Synchronizer**: Background workers that index queued books, best-effort
//! 3. **Reindexer**: Rebuilds the index from every book in the primary store
//! 4. **Query**: Builds the paginated `{data, meta}` search response
//!
//! ## Modules
//!
//! - [`config`]: Settings and dependency initialization
//! - [`store`]: Primary store access
//! - [`catalog`]: Book creation
//! - [`synchronizer`]: Background indexing of created books
//! - [`reindexer`]: Full reindex
//! - [`query`]: Search queries
//! - [`reporter`]: Sink for swallowed indexing outcomes
//! - [`errors`]: Error types for the indexer

pub mod catalog;
pub mod config;
pub mod errors;
pub mod query;
pub mod reindexer;
pub mod reporter;
pub mod store;
pub mod synchronizer;

pub use config::{Dependencies, Settings};
pub use errors::{IngestError, QueryError, StoreError};

use book_search_repository::SearchIndexError;
use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The search engine could not be reached or refused to set up the index.
    #[error("Search index error: {0}")]
    SearchIndexError(#[from] SearchIndexError),

    /// Primary store error.
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),

    /// Search query error.
    #[error("Query error: {0}")]
    QueryError(#[from] QueryError),

    /// Command output could not be serialized.
    #[error("Output error: {0}")]
    OutputError(#[from] serde_json::Error),

    /// A full reindex finished, but some books were not indexed.
    #[error("Reindex finished with {failed} books failed and {indexed} indexed")]
    ReindexPartialFailure { indexed: usize, failed: usize },
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
