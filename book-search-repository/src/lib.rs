//! # Book Search Repository
//!
//! This crate is the only place that talks to the search engine. It provides
//! the `SearchIndexProvider` trait, an OpenSearch implementation of it, and the
//! `SearchIndexService` that every other component goes through to index and
//! query book documents.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod service;
pub mod types;

pub use config::SearchIndexServiceConfig;
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::{ConnectionSettings, OpenSearchProvider};
pub use service::SearchIndexService;
pub use types::{BatchOperationResult, BatchOperationSummary, SearchHits};
