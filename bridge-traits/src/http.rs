//! HTTP Client Abstraction
//!
//! Mirrors the subset of the platform `fetch` contract the offline cache needs:
//! a request either resolves to a response (whatever its status) or fails at
//! the transport level.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{BridgeError, Result};
use crate::platform::PlatformSendSync;

/// HTTP method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }

    /// Parse an upper- or lower-case method name. Unknown verbs return `None`.
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "PATCH" => Some(HttpMethod::Patch),
            "DELETE" => Some(HttpMethod::Delete),
            "HEAD" => Some(HttpMethod::Head),
            _ => None,
        }
    }
}

/// How the request interacts with intermediate HTTP caches.
///
/// Same vocabulary as the `cache` member of a fetch `RequestInit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestCache {
    #[default]
    Default,
    /// Go to the network unconditionally and refresh intermediate caches.
    Reload,
    /// Revalidate with the origin before using a cached copy.
    NoCache,
    /// Bypass intermediate caches entirely.
    NoStore,
}

/// HTTP request builder
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Bytes>,
    pub timeout: Option<Duration>,
    pub cache: RequestCache,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
            timeout: None,
            cache: RequestCache::Default,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    pub fn cache_mode(mut self, cache: RequestCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == HttpMethod::Get
    }
}

/// HTTP response
///
/// Bodies are fully buffered; cloning shares the underlying `Bytes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Parse response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            BridgeError::OperationFailed(format!("JSON deserialization failed: {}", e))
        })
    }

    /// Get response body as UTF-8 string
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| BridgeError::OperationFailed(format!("Invalid UTF-8: {}", e)))
    }

    /// Check if response status is successful (2xx), the fetch `ok` flag
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response status indicates a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if response status indicates a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// Async HTTP client trait
///
/// Implementations must behave like `fetch`: any HTTP status, including
/// 4xx/5xx, resolves to `Ok(HttpResponse)`. Only failures that prevent a
/// response from being received are reported as
/// [`BridgeError::Network`](crate::error::BridgeError::Network).
/// Implementations must not retry on their own.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::http::{HttpClient, HttpRequest, RequestCache};
///
/// async fn revalidate(client: &dyn HttpClient, url: &str) -> Result<bool> {
///     let request = HttpRequest::get(url).cache_mode(RequestCache::Reload);
///     Ok(client.execute(request).await?.is_success())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait HttpClient: PlatformSendSync {
    /// Execute an HTTP request
    ///
    /// # Errors
    ///
    /// Returns error if the network connection fails, TLS validation fails or
    /// the request times out.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}
