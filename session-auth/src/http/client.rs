//! HTTP client builder for talking to the backend API.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};

use crate::error::{Error, ErrorKind, HttpErrorKind};

/// Header carrying the backend API version on every request.
pub const API_VERSION_HEADER: &str = "x-version";

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Value of the `x-version` header, if the API expects one.
    pub api_version: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("session-auth/{}", env!("CARGO_PKG_VERSION")),
            api_version: None,
        }
    }
}

/// Builder for the `reqwest::Client` shared by the API client and the refresher.
///
/// No retry middleware is installed: the only retry an authenticated call gets is
/// the one after a credential refresh.
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Send `x-version: <api_version>` on every request.
    pub fn with_api_version(mut self, api_version: String) -> Self {
        self.config.api_version = Some(api_version);
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        if let Some(version) = &self.config.api_version {
            let value = HeaderValue::from_str(version).map_err(|e| Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Http(HttpErrorKind::BuilderFailed),
            })?;
            headers.insert(API_VERSION_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .default_headers(headers)
            .build()?;

        Ok(client)
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
