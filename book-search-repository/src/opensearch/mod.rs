//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend.

mod connection;
mod index_config;
mod provider;
mod response;

pub use connection::ConnectionSettings;
pub use index_config::{
    get_index_settings, get_versioned_index_name, IndexConfig, INDEX_NAME, SEARCH_FIELDS,
};
pub use provider::OpenSearchProvider;
