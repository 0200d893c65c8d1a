//! `HttpClient` backed by the service worker's own `fetch`.
//!
//! The client never retries and resolves for every HTTP status; only a
//! rejected `fetch` promise (offline, DNS, CORS) becomes
//! `BridgeError::Network`. Request timeouts are not enforced here.

use crate::convert::{request_to_js, response_from_js};
use crate::error::network_error;
use crate::worker_scope;
use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    http::{HttpClient, HttpRequest, HttpResponse},
};
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Response, ServiceWorkerGlobalScope};

/// Fetch client bound to the running service worker.
pub struct WorkerFetchClient {
    scope: ServiceWorkerGlobalScope,
}

impl WorkerFetchClient {
    /// Create a client for the current worker scope.
    pub fn new() -> BridgeResult<Self> {
        Ok(Self {
            scope: worker_scope()?,
        })
    }
}

#[async_trait(?Send)]
impl HttpClient for WorkerFetchClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        debug!(
            method = request.method.as_str(),
            url = %request.url,
            cache = ?request.cache,
            "Executing fetch"
        );

        let req = request_to_js(&request)?;
        let js_value = JsFuture::from(self.scope.fetch_with_request(&req))
            .await
            .map_err(|err| {
                let err = network_error(err);
                debug!(url = %request.url, error = %err, "fetch rejected");
                err
            })?;
        let response = js_value
            .dyn_into::<Response>()
            .map_err(|_| BridgeError::OperationFailed("fetch returned non-Response".into()))?;

        response_from_js(&response).await
    }
}
