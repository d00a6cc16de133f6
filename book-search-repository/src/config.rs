//! Configuration types for the SearchIndexService.

use std::time::Duration;

/// Default number of documents sent in one bulk request.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 500;

/// Default upper bound on a single call to the search backend.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the SearchIndexService.
///
/// Controls how bulk submissions are split into network calls and how long any
/// single call to the backend may take before it is treated as failed.
#[derive(Debug, Clone)]
pub struct SearchIndexServiceConfig {
    /// Maximum number of documents sent in a single bulk request.
    ///
    /// Larger submissions are split into consecutive requests of at most this
    /// size. Set to `None` to send everything in one request.
    pub max_batch_size: Option<usize>,

    /// Timeout applied to every backend call (single index, each bulk request, search).
    pub request_timeout: Duration,
}

impl Default for SearchIndexServiceConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(DEFAULT_MAX_BATCH_SIZE),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl SearchIndexServiceConfig {
    /// Create a config with a custom bulk request size.
    ///
    /// A size of zero is treated as one.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size.max(1)),
            ..Self::default()
        }
    }

    /// Replace the per-call timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchIndexServiceConfig::default();
        assert_eq!(config.max_batch_size, Some(500));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        let config = SearchIndexServiceConfig::with_max_batch_size(0);
        assert_eq!(config.max_batch_size, Some(1));
    }

    #[test]
    fn test_builder() {
        let config =
            SearchIndexServiceConfig::with_max_batch_size(25).request_timeout(Duration::from_secs(2));
        assert_eq!(config.max_batch_size, Some(25));
        assert_eq!(config.request_timeout, Duration::from_secs(2));
    }
}
