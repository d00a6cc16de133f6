//! Settings read from the environment at startup.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use book_search_repository::opensearch::{IndexConfig, INDEX_NAME};
use book_search_repository::{ConnectionSettings, SearchIndexServiceConfig};
use tracing::warn;

use crate::reindexer::DEFAULT_REINDEX_BATCH_SIZE;
use crate::synchronizer::{SynchronizerConfig, DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};

const DEFAULT_OPENSEARCH_HOST: &str = "localhost";
const DEFAULT_OPENSEARCH_PORT: u16 = 9200;
const DEFAULT_OPENSEARCH_SCHEME: &str = "http";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;

/// What to do when the search engine cannot be reached at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Give up on the first failure.
    FailFast,
    /// Keep retrying at a fixed interval until it works.
    Retry,
}

impl ConnectionMode {
    /// Parse a mode name. Accepts "fail-fast" or "retry" (case-insensitive).
    fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "fail-fast" | "failfast" | "fail_fast" => Some(Self::FailFast),
            "retry" => Some(Self::Retry),
            _ => None,
        }
    }
}

/// Everything the indexer needs to know about its environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub opensearch: ConnectionSettings,
    pub index: IndexConfig,
    pub connection_mode: ConnectionMode,
    pub retry_interval: Duration,
    pub request_timeout: Duration,
    pub reindex_batch_size: usize,
    pub synchronizer: SynchronizerConfig,
    pub database_url: Option<String>,
}

impl Settings {
    /// Read settings from process environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENSEARCH_HOST`: Search engine host (default: localhost)
    /// - `OPENSEARCH_PORT`: Search engine port (default: 9200)
    /// - `OPENSEARCH_SCHEME`: "http" or "https" (default: http)
    /// - `OPENSEARCH_USERNAME` / `OPENSEARCH_PASSWORD`: Basic auth, used only when both are set
    /// - `INDEX_ALIAS`: Index alias name (default: "books")
    /// - `BOOKS_INDEX_VERSION`: Index version number (default: 0)
    /// - `OPENSEARCH_TIMEOUT_SECS`: Per-request timeout in seconds (default: 10)
    /// - `OPENSEARCH_CONNECTION_MODE`: "fail-fast" or "retry" (default: fail-fast)
    /// - `OPENSEARCH_RETRY_INTERVAL_SECS`: Retry interval in seconds (default: 15)
    /// - `REINDEX_BATCH_SIZE`: Books per reindex page (default: 500)
    /// - `SYNC_QUEUE_CAPACITY`: Synchronizer queue size (default: 1024)
    /// - `SYNC_WORKERS`: Synchronizer worker count (default: 4)
    /// - `DATABASE_URL`: Primary store connection string
    ///
    /// Values that do not parse fall back to their default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("OPENSEARCH_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OPENSEARCH_HOST.to_string());
        let scheme = lookup("OPENSEARCH_SCHEME")
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_OPENSEARCH_SCHEME.to_string());
        let port = parse_or(&lookup, "OPENSEARCH_PORT", DEFAULT_OPENSEARCH_PORT);
        let request_timeout =
            Duration::from_secs(parse_or(&lookup, "OPENSEARCH_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS));

        let mut opensearch =
            ConnectionSettings::new(scheme, host, port).with_timeout(request_timeout);
        let username = lookup("OPENSEARCH_USERNAME").filter(|u| !u.is_empty());
        let password = lookup("OPENSEARCH_PASSWORD").filter(|p| !p.is_empty());
        match (username, password) {
            (Some(username), Some(password)) => {
                opensearch = opensearch.with_basic_auth(username, password);
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!("Only one of OPENSEARCH_USERNAME and OPENSEARCH_PASSWORD is set; connecting without auth");
            }
            (None, None) => {}
        }

        let alias = lookup("INDEX_ALIAS")
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| INDEX_NAME.to_string());
        let version = parse_or(&lookup, "BOOKS_INDEX_VERSION", 0u32);

        let connection_mode = match lookup("OPENSEARCH_CONNECTION_MODE") {
            None => ConnectionMode::FailFast,
            Some(value) => ConnectionMode::parse(&value).unwrap_or_else(|| {
                warn!(value = %value, "Invalid OPENSEARCH_CONNECTION_MODE, defaulting to 'fail-fast'");
                ConnectionMode::FailFast
            }),
        };

        Self {
            opensearch,
            index: IndexConfig::new(alias, version),
            connection_mode,
            retry_interval: Duration::from_secs(parse_or(
                &lookup,
                "OPENSEARCH_RETRY_INTERVAL_SECS",
                DEFAULT_RETRY_INTERVAL_SECS,
            )),
            request_timeout,
            reindex_batch_size: parse_or(&lookup, "REINDEX_BATCH_SIZE", DEFAULT_REINDEX_BATCH_SIZE),
            synchronizer: SynchronizerConfig {
                queue_capacity: parse_or(&lookup, "SYNC_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY),
                workers: parse_or(&lookup, "SYNC_WORKERS", DEFAULT_WORKERS),
            },
            database_url: lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()),
        }
    }

    /// Service config for the search index client.
    pub fn index_service_config(&self) -> SearchIndexServiceConfig {
        SearchIndexServiceConfig::with_max_batch_size(self.reindex_batch_size)
            .request_timeout(self.request_timeout)
    }
}

/// Parse `key` as `T`, or fall back to `default` with a warning.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!(key, value = %raw, default = %default, "Invalid value, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]);

        assert_eq!(s.opensearch.url().unwrap().as_str(), "http://localhost:9200/");
        assert!(s.opensearch.credentials().is_none());
        assert_eq!(s.index.alias, "books");
        assert_eq!(s.index.version, 0);
        assert_eq!(s.connection_mode, ConnectionMode::FailFast);
        assert_eq!(s.retry_interval, Duration::from_secs(15));
        assert_eq!(s.request_timeout, Duration::from_secs(10));
        assert_eq!(s.reindex_batch_size, 500);
        assert_eq!(s.synchronizer.queue_capacity, 1024);
        assert_eq!(s.synchronizer.workers, 4);
        assert!(s.database_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("OPENSEARCH_HOST", "search.internal"),
            ("OPENSEARCH_PORT", "9443"),
            ("OPENSEARCH_SCHEME", "HTTPS"),
            ("OPENSEARCH_USERNAME", "admin"),
            ("OPENSEARCH_PASSWORD", "secret"),
            ("INDEX_ALIAS", "catalog"),
            ("BOOKS_INDEX_VERSION", "2"),
            ("OPENSEARCH_CONNECTION_MODE", "Retry"),
            ("SYNC_WORKERS", "8"),
            ("DATABASE_URL", "postgres://localhost/books"),
        ]);

        assert_eq!(
            s.opensearch.url().unwrap().as_str(),
            "https://search.internal:9443/"
        );
        assert_eq!(s.opensearch.credentials(), Some(("admin", "secret")));
        assert_eq!(s.index.versioned_index_name(), "books_v2");
        assert_eq!(s.index.alias, "catalog");
        assert_eq!(s.connection_mode, ConnectionMode::Retry);
        assert_eq!(s.synchronizer.workers, 8);
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/books"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let s = settings(&[
            ("OPENSEARCH_PORT", "not-a-port"),
            ("OPENSEARCH_TIMEOUT_SECS", "-3"),
            ("OPENSEARCH_CONNECTION_MODE", "sometimes"),
            ("REINDEX_BATCH_SIZE", "lots"),
        ]);

        assert_eq!(s.opensearch.port, 9200);
        assert_eq!(s.request_timeout, Duration::from_secs(10));
        assert_eq!(s.connection_mode, ConnectionMode::FailFast);
        assert_eq!(s.reindex_batch_size, 500);
    }

    #[test]
    fn test_partial_credentials_are_ignored() {
        let s = settings(&[("OPENSEARCH_USERNAME", "admin")]);
        assert!(s.opensearch.credentials().is_none());
    }

    #[test]
    fn test_index_service_config() {
        let s = settings(&[("REINDEX_BATCH_SIZE", "50"), ("OPENSEARCH_TIMEOUT_SECS", "3")]);
        let config = s.index_service_config();
        assert_eq!(config.max_batch_size, Some(50));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }
}
