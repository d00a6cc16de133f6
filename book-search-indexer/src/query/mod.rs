//! Search query service.
//!
//! Turns a free-text query into the paginated response envelope.

use std::sync::Arc;

use book_search_repository::SearchIndexService;
use book_search_shared::{BookDocument, BookPage, PageMeta, SearchQuery};
use tracing::{instrument, warn};

use crate::errors::QueryError;

pub struct SearchQueryService {
    index: Arc<SearchIndexService>,
}

impl SearchQueryService {
    pub fn new(index: Arc<SearchIndexService>) -> Self {
        Self { index }
    }

    /// Run a query and build `{data, meta}` for the requested page.
    ///
    /// `page` and `per_page` below one are treated as one. An empty `text` is
    /// sent as is; rejecting it is up to the caller. `last_page` is derived
    /// from the total match count and is never below one.
    #[instrument(skip(self))]
    pub async fn query(
        &self,
        text: &str,
        page: u32,
        per_page: u32,
    ) -> Result<BookPage, QueryError> {
        let query = SearchQuery::new(text)
            .with_page(page)
            .with_per_page(per_page);

        let hits = self.index.search(&query).await.map_err(|e| {
            warn!(error = %e, "Search failed");
            QueryError::from(e)
        })?;

        let meta = PageMeta::new(query.page, query.per_page, hits.total);
        let data = hits
            .documents
            .into_iter()
            .map(BookDocument::into_record)
            .collect();

        Ok(BookPage::new(data, meta))
    }
}
