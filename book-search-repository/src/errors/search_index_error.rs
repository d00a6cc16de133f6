//! Search index error types.
//!
//! This module defines the unified error type for all search index operations,
//! including both low-level backend errors and document-level write failures.

use thiserror::Error;

/// Unified errors from search index operations.
///
/// Used by the `SearchIndexProvider` trait and `SearchIndexService`. Callers
/// mostly need to tell two situations apart: the backend as a whole could not
/// serve the call (`is_unavailable`), or a particular document was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchIndexError {
    /// The document is not fit to be sent to the backend.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to configure the connection to the search backend.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The search backend could not be reached or returned a fault.
    #[error("Search index unavailable: {0}")]
    IndexUnavailable(String),

    /// The backend rejected a single document write.
    #[error("Index write failed: {0}")]
    IndexWriteFailed(String),

    /// A backend call did not finish within the configured timeout.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Failed to create the search index or its alias.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to parse response from search index backend.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Failed to serialize data for the search index backend.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create an index unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::IndexUnavailable(msg.into())
    }

    /// Create an index write failure.
    pub fn write_failed(msg: impl Into<String>) -> Self {
        Self::IndexWriteFailed(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Whether the backend as a whole failed, as opposed to one document being rejected.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::IndexUnavailable(_) | Self::ConnectionError(_) | Self::Timeout(_)
        )
    }
}
