//! HTTP client utilities for the GlobalGreen storefront.
//!
//! Provides a small builder API over a pluggable [`Transport`], with JSON
//! handling and status-to-error conversion. The native transport is
//! `reqwest`; tests use [`MockTransport`] (feature `mock`).
//!
//! # Example
//!
//! ```rust,ignore
//! use green_data::FetchClient;
//! use std::time::Duration;
//!
//! let client = FetchClient::native("https://api.globalgreen.id", Duration::from_secs(15))?;
//!
//! let products: serde_json::Value = client
//!     .get("/products")
//!     .query("category", "vegetables")
//!     .send()
//!     .await?
//!     .error_for_status()?
//!     .json()?;
//! ```

mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod request;
mod response;
mod transport;

pub use error::FetchError;
pub use http::Method;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockTransport;
pub use request::Request;
pub use response::Response;
pub use transport::{ReqwestTransport, Transport};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// HTTP client for making outbound requests.
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct FetchClient {
    base_url: String,
    default_headers: HashMap<String, String>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchClient")
            .field("base_url", &self.base_url)
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Create a client over any transport.
    pub fn new(transport: Arc<dyn Transport>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_headers: HashMap::new(),
            transport,
        }
    }

    /// Create a client over `reqwest` with a request timeout.
    pub fn native(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(ReqwestTransport::new(timeout)?), base_url))
    }

    /// Add a default header that will be included in all requests.
    pub fn with_default_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Base URL prepended to relative paths.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::GET, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::POST, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::PUT, url)
    }

    /// Create a PATCH request.
    pub fn patch(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::PATCH, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::DELETE, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = url.into();
        let full_url = if url.starts_with("http://") || url.starts_with("https://") {
            url
        } else {
            format!(
                "{}/{}",
                self.base_url.trim_end_matches('/'),
                url.trim_start_matches('/')
            )
        };

        let mut request = Request::new(method, full_url).accept("application/json");
        for (key, value) in &self.default_headers {
            request = request.header(key.clone(), value.clone());
        }

        ClientRequestBuilder {
            request,
            transport: Arc::clone(&self.transport),
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    request: Request,
    transport: Arc<dyn Transport>,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.header(key, value);
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.query(key, value);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize + ?Sized>(mut self, value: &T) -> Result<Self, FetchError> {
        self.request = self.request.json(value)?;
        Ok(self)
    }

    /// Add a bearer token authorization header.
    pub fn bearer_auth(mut self, token: impl AsRef<str>) -> Self {
        self.request = self.request.bearer_auth(token);
        self
    }

    /// The request as built so far.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Send the request and return the response, whatever its status.
    pub async fn send(self) -> Result<Response, FetchError> {
        let method = self.request.method().clone();
        let path = self.request.path().to_string();
        tracing::debug!(%method, %path, "sending request");

        match self.transport.send(self.request).await {
            Ok(response) => {
                tracing::debug!(%method, %path, status = response.status, "received response");
                Ok(response)
            }
            Err(err) => {
                tracing::warn!(%method, %path, error = %err, "request failed");
                Err(err)
            }
        }
    }

    /// Send, fail on non-2xx, and parse the body as JSON.
    pub async fn send_json<T: serde::de::DeserializeOwned>(self) -> Result<T, FetchError> {
        self.send().await?.error_for_status()?.json()
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchClient, FetchError, Method, Request, Response, Transport};
}
