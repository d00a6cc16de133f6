//! Dependency initialization and wiring for the book search indexer.

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::catalog::BookCatalog;
use crate::config::{ConnectionMode, Settings};
use crate::query::SearchQueryService;
use crate::reindexer::BulkReindexer;
use crate::reporter::{IndexEventReporter, TracingReporter};
use crate::store::{BookStore, PostgresBookStore};
use crate::synchronizer::IndexSynchronizer;
use crate::IndexingError;
use book_search_repository::{OpenSearchProvider, SearchIndexService};

/// Maximum number of pooled primary-store connections.
const DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Container for the long-lived, shared components.
///
/// Holds exactly one search index client; every component built from here
/// shares it.
pub struct Dependencies {
    pub settings: Settings,
    pub index: Arc<SearchIndexService>,
    pub reporter: Arc<dyn IndexEventReporter>,
}

impl Dependencies {
    /// Build the shared components from settings.
    ///
    /// Nothing is sent to the search engine here, so commands that only need
    /// the primary store keep working while it is down. Call
    /// [`ensure_index`](Self::ensure_index) where the index must exist.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError::ConfigError)` - If the search engine settings are invalid
    pub fn new(settings: Settings) -> Result<Self, IndexingError> {
        info!(
            opensearch = ?settings.opensearch,
            alias = %settings.index.alias,
            version = settings.index.version,
            connection_mode = ?settings.connection_mode,
            retry_interval_secs = settings.retry_interval.as_secs(),
            "Initializing dependencies"
        );

        let provider = OpenSearchProvider::new(&settings.opensearch, settings.index.clone())
            .map_err(|e| {
                IndexingError::config(format!("Failed to create OpenSearch provider: {}", e))
            })?;
        let index = Arc::new(SearchIndexService::with_config(
            Box::new(provider),
            settings.index_service_config(),
        ));

        Ok(Self {
            settings,
            index,
            reporter: Arc::new(TracingReporter),
        })
    }

    /// Make sure the index and alias exist, creating them if needed.
    ///
    /// In retry mode an unreachable engine is retried at the configured
    /// interval; any other failure is returned immediately.
    pub async fn ensure_index(&self) -> Result<(), IndexingError> {
        let retry_interval = self.settings.retry_interval;
        loop {
            match self.index.ensure_index_exists().await {
                Ok(()) => {
                    info!(alias = %self.settings.index.alias, "Search index is ready");
                    return Ok(());
                }
                Err(e)
                    if self.settings.connection_mode == ConnectionMode::Retry
                        && e.is_unavailable() =>
                {
                    warn!(
                        error = %e,
                        retry_interval_secs = retry_interval.as_secs(),
                        "Failed to connect to OpenSearch, retrying..."
                    );
                    sleep(retry_interval).await;
                }
                Err(e) => return Err(IndexingError::SearchIndexError(e)),
            }
        }
    }

    /// Open the primary store and bring its schema up to date.
    pub async fn book_store(&self) -> Result<Arc<dyn BookStore>, IndexingError> {
        let database_url = self
            .settings
            .database_url
            .as_deref()
            .ok_or_else(|| IndexingError::config("DATABASE_URL is not set"))?;

        let store = PostgresBookStore::connect(database_url, DATABASE_MAX_CONNECTIONS).await?;
        store.migrate().await?;

        info!("Primary store connection established");
        Ok(Arc::new(store))
    }

    pub fn query_service(&self) -> SearchQueryService {
        SearchQueryService::new(Arc::clone(&self.index))
    }

    pub fn reindexer(&self, store: Arc<dyn BookStore>) -> BulkReindexer {
        BulkReindexer::new(store, Arc::clone(&self.index), Arc::clone(&self.reporter))
            .with_batch_size(self.settings.reindex_batch_size)
    }

    /// Start the synchronizer workers. Must be called inside the runtime.
    pub fn start_synchronizer(&self) -> IndexSynchronizer {
        IndexSynchronizer::start(
            Arc::clone(&self.index),
            Arc::clone(&self.reporter),
            self.settings.synchronizer.clone(),
        )
    }

    pub fn catalog(&self, store: Arc<dyn BookStore>, synchronizer: &IndexSynchronizer) -> BookCatalog {
        BookCatalog::new(store, synchronizer.dispatcher())
    }
}
