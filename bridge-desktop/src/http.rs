//! HTTP Client Implementation using Reqwest

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RequestCache},
};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Reqwest-based HTTP client implementation
///
/// Behaves like a worker-side `fetch`:
/// - Every HTTP status resolves to a response
/// - Transport failures map to `BridgeError::Network`
/// - Exactly one attempt per request
/// - No deadline unless one is configured or set on the request
/// - Cache modes become `Cache-Control` / `Pragma` request headers, since
///   reqwest keeps no HTTP cache of its own
pub struct ReqwestHttpClient {
    client: Client,
    timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    /// Create a new HTTP client that leaves timeouts to the network stack
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Create a new HTTP client with an overall deadline per request
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .pool_max_idle_per_host(10)
            .user_agent(concat!("shell-cache/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| {
            BridgeError::NotAvailable(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self { client, timeout })
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Client-wide deadline, if any
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Convert bridge HttpMethod to reqwest Method
    fn convert_method(method: HttpMethod) -> reqwest::Method {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
        }
    }

    /// Request headers that reproduce a fetch cache mode against
    /// intermediate caches.
    fn cache_headers(cache: RequestCache) -> &'static [(&'static str, &'static str)] {
        match cache {
            RequestCache::Default => &[],
            RequestCache::Reload | RequestCache::NoCache => {
                &[("Cache-Control", "no-cache"), ("Pragma", "no-cache")]
            }
            RequestCache::NoStore => &[("Cache-Control", "no-store"), ("Pragma", "no-cache")],
        }
    }

    /// Build reqwest request from bridge request
    fn build_request(&self, request: HttpRequest) -> reqwest::RequestBuilder {
        let method = Self::convert_method(request.method);
        let mut req = self.client.request(method, &request.url);

        for (key, value) in Self::cache_headers(request.cache) {
            req = req.header(*key, *value);
        }

        // Explicit headers win over cache-mode defaults
        for (key, value) in request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            req = req.body(body);
        }

        if let Some(timeout) = request.timeout {
            req = req.timeout(timeout);
        }

        req
    }

    fn map_transport_error(e: reqwest::Error) -> BridgeError {
        if e.is_timeout() {
            BridgeError::Network("Request timed out".to_string())
        } else if e.is_connect() {
            BridgeError::Network(format!("Connection failed: {}", e))
        } else {
            BridgeError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(
            method = request.method.as_str(),
            url = %request.url,
            cache = ?request.cache,
            "Executing HTTP request"
        );

        let response = self.build_request(request).send().await.map_err(|e| {
            warn!(error = %e, "HTTP request failed");
            Self::map_transport_error(e)
        })?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|s| (k.to_string(), s.to_string())))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(Self::map_transport_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one request, answering only after `delay`.
    async fn slow_server(delay: Duration) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            tokio::time::sleep(delay).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 4\r\nconnection: close\r\n\r\nwasm")
                .await;
        });
        format!("http://{}/canvaskit.wasm", addr)
    }

    #[tokio::test]
    async fn test_http_client_creation() {
        let client = ReqwestHttpClient::new().unwrap();
        assert_eq!(client.timeout(), None);

        let bounded = ReqwestHttpClient::with_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(bounded.timeout(), Some(Duration::from_secs(5)));
    }

    #[tokio::test]
    async fn test_default_client_waits_for_slow_response() {
        let url = slow_server(Duration::from_millis(500)).await;
        let response = ReqwestHttpClient::new()
            .unwrap()
            .execute(HttpRequest::get(url))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body, "wasm");
    }

    #[tokio::test]
    async fn test_request_timeout_applies_only_when_set() {
        let url = slow_server(Duration::from_secs(2)).await;
        let err = ReqwestHttpClient::new()
            .unwrap()
            .execute(HttpRequest::get(url).timeout(Duration::from_millis(100)))
            .await
            .unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn test_method_conversion() {
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Get),
            reqwest::Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::convert_method(HttpMethod::Post),
            reqwest::Method::POST
        );
    }

    #[test]
    fn test_reload_revalidates_intermediate_caches() {
        let headers = ReqwestHttpClient::cache_headers(RequestCache::Reload);
        assert!(headers.contains(&("Cache-Control", "no-cache")));
        assert!(ReqwestHttpClient::cache_headers(RequestCache::Default).is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = ReqwestHttpClient::with_timeout(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) on loopback is expected to refuse connections.
        let err = client
            .execute(HttpRequest::get("http://127.0.0.1:9/index.html"))
            .await
            .unwrap_err();
        assert!(err.is_network());
    }
}
