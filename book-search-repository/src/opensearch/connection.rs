//! Connection settings for the OpenSearch backend.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::errors::SearchIndexError;

/// Where the OpenSearch node lives and how to authenticate against it.
///
/// Read once at startup and never reloaded.
#[derive(Clone)]
pub struct ConnectionSettings {
    /// `http` or `https`.
    pub scheme: String,
    pub host: String,
    pub port: u16,
    /// Basic-auth user name. Authentication is only sent when both the user
    /// name and the password are set.
    pub username: Option<String>,
    pub password: Option<String>,
    /// Transport-level timeout for every request.
    pub timeout: Duration,
}

impl ConnectionSettings {
    /// Settings for an unauthenticated node at `scheme://host:port`.
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
            username: None,
            password: None,
            timeout: Duration::from_secs(10),
        }
    }

    /// Add basic-auth credentials.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Replace the transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The node URL, e.g. `https://search.internal:9200`.
    pub fn url(&self) -> Result<Url, SearchIndexError> {
        let scheme = self.scheme.to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(SearchIndexError::connection(format!(
                "Unsupported scheme '{}', expected http or https",
                self.scheme
            )));
        }

        Url::parse(&format!("{}://{}:{}", scheme, self.host, self.port))
            .map_err(|e| SearchIndexError::connection(e.to_string()))
    }

    /// Basic-auth credentials, if both parts are configured.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) if !user.is_empty() => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("timeout", &self.timeout)
            .finish()
    }
}
