//! Request interception.
//!
//! Routing is synchronous so a host can decide whether to intercept while the
//! fetch event is still being dispatched; serving is asynchronous.

use crate::error::Result;
use crate::manager::OfflineCacheManager;
use crate::paths::{request_path, stored_path, ROOT_PATH};
use bridge_traits::http::{HttpRequest, HttpResponse};
use core_runtime::events::{CacheEvent, WorkerEvent};
use core_runtime::logging::redact_url;
use tracing::{debug, warn};

/// How an outgoing request is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRoute {
    /// Not intercepted; the platform performs the request itself.
    Passthrough,
    /// Root document: network first, cached copy when offline.
    OnlineFirst,
    /// Shell asset: cached copy first, network and lazy population on a miss.
    CacheFirst,
}

impl OfflineCacheManager {
    /// Decide how `request` is handled.
    ///
    /// Only GET requests whose path is in the Resource Table are intercepted.
    pub fn route(&self, request: &HttpRequest) -> FetchRoute {
        if !request.is_get() {
            return FetchRoute::Passthrough;
        }

        match request_path(&self.host.origin(), &request.url) {
            Some(path) if self.shell.resources().contains(&path) => {
                if path == ROOT_PATH {
                    FetchRoute::OnlineFirst
                } else {
                    FetchRoute::CacheFirst
                }
            }
            _ => FetchRoute::Passthrough,
        }
    }

    /// Serve `request` along an already chosen route. `Passthrough` yields `None`.
    pub async fn respond(
        &self,
        request: HttpRequest,
        route: FetchRoute,
    ) -> Result<Option<HttpResponse>> {
        match route {
            FetchRoute::Passthrough => Ok(None),
            FetchRoute::OnlineFirst => self.online_first(request).await.map(Some),
            FetchRoute::CacheFirst => self.cache_first(request).await.map(Some),
        }
    }

    /// Route and serve in one step.
    pub async fn handle_fetch(&self, request: HttpRequest) -> Result<Option<HttpResponse>> {
        let route = self.route(&request);
        debug!(url = redact_url(&request.url), ?route, "Fetch");
        self.respond(request, route).await
    }

    /// Network first; on a transport failure fall back to the cached copy,
    /// otherwise surface the original error.
    ///
    /// Whatever response the network produced is cached, whatever its status.
    pub async fn online_first(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();

        match self.http.execute(request).await {
            Ok(response) => {
                self.store_content(&url, &response).await;
                Ok(response)
            }
            Err(network_error) => {
                let content = self.storage.open(&self.names.content).await?;
                match content.get(&url).await? {
                    Some(cached) => {
                        debug!(url = redact_url(&url), error = %network_error, "Offline, serving cached document");
                        Ok(cached)
                    }
                    None => Err(network_error.into()),
                }
            }
        }
    }

    /// Cached copy first; on a miss fetch from the network and cache the
    /// response if it is ok. Network errors on a miss propagate.
    pub async fn cache_first(&self, request: HttpRequest) -> Result<HttpResponse> {
        let content = self.storage.open(&self.names.content).await?;
        if let Some(cached) = content.get(&request.url).await? {
            return Ok(cached);
        }

        let url = request.url.clone();
        let response = self.http.execute(request).await?;
        if response.is_success() {
            match content.put(&url, response.clone()).await {
                Ok(()) => {
                    if let Some(path) = stored_path(&self.host.origin(), &url) {
                        self.emit(WorkerEvent::Cache(CacheEvent::ResourceCached { path }));
                    }
                }
                Err(e) => warn!(url = redact_url(&url), error = %e, "Failed to cache response"),
            }
        }
        Ok(response)
    }

    /// Best-effort write to the content partition; the page gets its
    /// response either way.
    async fn store_content(&self, url: &str, response: &HttpResponse) {
        let result: bridge_traits::error::Result<()> = async {
            let content = self.storage.open(&self.names.content).await?;
            content.put(url, response.clone()).await
        }
        .await;

        if let Err(e) = result {
            warn!(url = redact_url(url), error = %e, "Failed to cache response");
        }
    }
}
