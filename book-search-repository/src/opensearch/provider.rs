//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust crate.

use async_trait::async_trait;
use book_search_shared::{BookDocument, SearchQuery};
use opensearch::{
    auth::Credentials,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    http::response::Response,
    indices::{IndicesCreateParts, IndicesExistsAliasParts},
    BulkParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::opensearch::connection::ConnectionSettings;
use crate::opensearch::index_config::{get_index_settings, IndexConfig, SEARCH_FIELDS};
use crate::opensearch::response::{parse_bulk_response, parse_search_response};
use crate::types::{BatchOperationSummary, SearchHits};

/// OpenSearch provider implementation.
///
/// Holds a single client that is shared by every caller; the underlying
/// connection pool handles concurrent requests.
///
/// # Example
///
/// ```ignore
/// use book_search_repository::opensearch::{ConnectionSettings, IndexConfig};
///
/// let settings = ConnectionSettings::new("http", "localhost", 9200)
///     .with_basic_auth("admin", "admin");
/// let provider = OpenSearchProvider::new(&settings, IndexConfig::new("books", 0))?;
/// provider.ensure_index_exists().await?;
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    index_config: IndexConfig,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider for the node described by `settings`.
    ///
    /// No request is sent here; an unreachable node only shows up on first use.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchIndexError::ConnectionError)` - If the URL or transport is invalid
    pub fn new(
        settings: &ConnectionSettings,
        index_config: IndexConfig,
    ) -> Result<Self, SearchIndexError> {
        let url = settings.url()?;

        let conn_pool = SingleNodeConnectionPool::new(url.clone());
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(settings.timeout);
        if let Some((username, password)) = settings.credentials() {
            builder = builder.auth(Credentials::Basic(
                username.to_string(),
                password.to_string(),
            ));
        }
        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(
            url = %url,
            alias = %index_config.alias,
            version = index_config.version,
            authenticated = settings.credentials().is_some(),
            "Created OpenSearch provider"
        );

        Ok(Self {
            client,
            index_config,
        })
    }

    /// Build the request body for a paginated multi-field match.
    fn search_body(query: &SearchQuery) -> Value {
        json!({
            "from": query.offset(),
            "size": query.limit(),
            "track_total_hits": true,
            "query": {
                "multi_match": {
                    "query": query.text,
                    "fields": SEARCH_FIELDS,
                }
            }
        })
    }

    /// Build the newline-delimited bulk body: an action line then the source, per document.
    fn bulk_body(documents: &[BookDocument]) -> Result<Vec<JsonBody<Value>>, SearchIndexError> {
        let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(documents.len() * 2);
        for doc in documents {
            let source = serde_json::to_value(doc)
                .map_err(|e| SearchIndexError::serialization(e.to_string()))?;
            body.push(json!({ "index": { "_id": doc.document_id() } }).into());
            body.push(source.into());
        }
        Ok(body)
    }

    /// Read the body of a failed response for diagnostics.
    async fn error_body(response: Response) -> String {
        response.text().await.unwrap_or_default()
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchProvider {
    /// Create the versioned index with the alias attached, unless the alias already exists.
    async fn ensure_index_exists(&self) -> Result<(), SearchIndexError> {
        let alias = self.index_config.alias.as_str();

        let response = self
            .client
            .indices()
            .exists_alias(IndicesExistsAliasParts::Name(&[alias]))
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        if response.status_code().is_success() {
            debug!(alias = %alias, "Search index alias already exists");
            return Ok(());
        }

        let index_name = self.index_config.versioned_index_name();
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(&index_name))
            .body(get_index_settings(alias))
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Index creation failed");
            return Err(SearchIndexError::index_creation(format!(
                "Creating {} failed with status {}: {}",
                index_name, status, error_body
            )));
        }

        info!(index = %index_name, alias = %alias, "Created search index");
        Ok(())
    }

    /// Index one document by id, replacing any previous version.
    async fn index_document(&self, document: &BookDocument) -> Result<(), SearchIndexError> {
        let doc_id = document.document_id();

        let response = self
            .client
            .index(IndexParts::IndexId(&self.index_config.alias, &doc_id))
            .body(document)
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if status.is_server_error() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Index request failed");
            return Err(SearchIndexError::unavailable(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Document rejected");
            return Err(SearchIndexError::write_failed(format!(
                "Index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(doc_id = %doc_id, "Document indexed");
        Ok(())
    }

    /// Index documents with a single `_bulk` request.
    ///
    /// Per-item rejections are reported in the summary; only a failure of the
    /// request itself is returned as an error.
    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn bulk_index_documents(
        &self,
        documents: &[BookDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        let body = Self::bulk_body(documents)?;

        let response = self
            .client
            .bulk(BulkParts::Index(&self.index_config.alias))
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::unavailable(format!(
                "Bulk failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let summary = parse_bulk_response(documents, &body)?;
        debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk request completed"
        );
        Ok(summary)
    }

    /// Multi-field match over the alias with `from`/`size` pagination.
    async fn search(&self, query: &SearchQuery) -> Result<SearchHits, SearchIndexError> {
        let response = self
            .client
            .search(SearchParts::Index(&[self.index_config.alias.as_str()]))
            .body(Self::search_body(query))
            .send()
            .await
            .map_err(|e| SearchIndexError::unavailable(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = Self::error_body(response).await;
            error!(status = %status, body = %error_body, "Search request failed");
            return Err(SearchIndexError::unavailable(format!(
                "Search failed with status {}: {}",
                status, error_body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::parse(e.to_string()))?;

        let hits = parse_search_response(&body)?;
        debug!(
            query = %query.text,
            page = query.page,
            returned = hits.documents.len(),
            total = hits.total,
            "Search completed"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_body_pagination() {
        let query = SearchQuery::new("herbert").with_page(2).with_per_page(10);
        let body = OpenSearchProvider::search_body(&query);

        assert_eq!(body["from"], 10);
        assert_eq!(body["size"], 10);
        assert_eq!(body["track_total_hits"], true);
        assert_eq!(body["query"]["multi_match"]["query"], "herbert");
        assert_eq!(
            body["query"]["multi_match"]["fields"],
            json!(["title", "author", "description", "isbn"])
        );
    }

    #[test]
    fn test_search_body_first_page() {
        let body = OpenSearchProvider::search_body(&SearchQuery::new("dune"));
        assert_eq!(body["from"], 0);
        assert_eq!(body["size"], 10);
    }

    #[test]
    fn test_bulk_body_pairs_action_and_source() {
        let documents = vec![
            BookDocument {
                id: 4,
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                description: "Desert planet politics.".to_string(),
                isbn: "9780441172719".to_string(),
                price: 9.99,
                indexed_at: None,
            },
            BookDocument {
                id: 9,
                title: "Emma".to_string(),
                author: "Jane Austen".to_string(),
                description: "Matchmaking in Highbury.".to_string(),
                isbn: "9780141439587".to_string(),
                price: 6.5,
                indexed_at: None,
            },
        ];

        let body = OpenSearchProvider::bulk_body(&documents).unwrap();
        assert_eq!(body.len(), 4);
    }

    #[test]
    fn test_new_rejects_bad_scheme() {
        let settings = ConnectionSettings::new("gopher", "localhost", 9200);
        let result = OpenSearchProvider::new(&settings, IndexConfig::default());
        assert!(matches!(result, Err(SearchIndexError::ConnectionError(_))));
    }

    #[tokio::test]
    async fn test_unreachable_node_is_unavailable() {
        // Port 1 on loopback refuses connections.
        let settings = ConnectionSettings::new("http", "127.0.0.1", 1)
            .with_timeout(std::time::Duration::from_secs(2));
        let provider = OpenSearchProvider::new(&settings, IndexConfig::default()).unwrap();

        let result = provider.search(&SearchQuery::new("anything")).await;
        match result {
            Err(err) => assert!(err.is_unavailable(), "unexpected error: {:?}", err),
            Ok(hits) => panic!("expected an error, got {:?}", hits),
        }
    }
}
