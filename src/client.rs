//! HTTP client for the GNS3 server API.
//!
//! The client owns a base URL and a `reqwest` transport with a bounded
//! request timeout. Requests are assembled by callers (resources and data
//! sources) and executed through [`Client::do_request`], which buffers the
//! whole response body and turns any non-200 status into an error.
//!
//! # Example
//!
//! ```ignore
//! use gns3_provider::client::Client;
//!
//! let client = Client::new(Some("http://gns3.lab:3080"))?;
//! let request = client.request(reqwest::Method::GET, "/v2/version").build()?;
//! let body = client.do_request(request).await?;
//! ```

use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use tracing::{debug, warn};

use crate::error::ClientError;

/// Base URL used when no host is supplied.
pub const DEFAULT_HOST_URL: &str = "http://localhost:3080";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Recognized options for building a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Upper bound for a single request, from connect to last body byte.
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A handle to a GNS3 server.
///
/// Immutable after construction; share it as `Arc<Client>`.
#[derive(Debug, Clone)]
pub struct Client {
    host_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl Client {
    /// Create a client for `host`, or for [`DEFAULT_HOST_URL`] when `None`.
    ///
    /// The host is used verbatim as the base URL.
    pub fn new(host: Option<&str>) -> Result<Self, ClientError> {
        Self::with_options(host, ClientOptions::default())
    }

    /// Create a client with explicit options.
    pub fn with_options(host: Option<&str>, options: ClientOptions) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            host_url: host.unwrap_or(DEFAULT_HOST_URL).to_string(),
            timeout: options.timeout,
            http,
        })
    }

    /// Create a client from the provider's `host` and `port` settings.
    ///
    /// A bare host gets an `http://` scheme; a host that already carries a
    /// scheme keeps it. The host may name `port` itself, but not a different
    /// one, and it may not carry a path, query or fragment.
    pub fn from_host_port(
        host: &str,
        port: u16,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let host = host.trim();
        let raw = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };
        let invalid = |reason: String| ClientError::InvalidUrl {
            url: raw.clone(),
            reason,
        };

        let mut url = Url::parse(&raw).map_err(|e| invalid(e.to_string()))?;
        if !url.host_str().is_some_and(|h| !h.is_empty()) {
            return Err(invalid("missing host".to_string()));
        }
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(invalid(
                "only a scheme and host are allowed, found a path, query or fragment".to_string(),
            ));
        }
        if let Some(existing) = url.port() {
            if existing != port {
                return Err(invalid(format!(
                    "host names port {} but port is set to {}",
                    existing, port
                )));
            }
        }
        url.set_port(Some(port))
            .map_err(|()| invalid(format!("cannot set port {}", port)))?;

        let base = url.as_str().trim_end_matches('/');
        Self::with_options(Some(base), options)
    }

    /// The base URL every request path is appended to.
    pub fn host_url(&self) -> &str {
        &self.host_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Join `path` onto the base URL with exactly one `/` between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.host_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Start building a request against `path` using the owned transport.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Execute `request` and return the full response body.
    ///
    /// The body is always read to the end before returning, so the
    /// connection is released whatever the outcome. Only `200 OK` counts as
    /// success; any other status yields [`ClientError::Status`] carrying the
    /// status code and the raw body text.
    pub async fn do_request(&self, request: reqwest::Request) -> Result<Vec<u8>, ClientError> {
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "Sending GNS3 request");

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(%method, %url, error = %e, "GNS3 request failed");
            ClientError::Transport(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?;

        if status != StatusCode::OK {
            warn!(%method, %url, status = status.as_u16(), "GNS3 request returned error status");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        debug!(%method, %url, bytes = body.len(), "GNS3 request completed");
        Ok(body.to_vec())
    }
}
