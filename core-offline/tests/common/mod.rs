//! Shared host doubles for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_desktop::{HeadlessWorkerHost, MemoryCacheStorage, MemoryCacheStore};
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    http::{HttpClient, HttpRequest, HttpResponse},
};
use core_offline::{OfflineCacheManager, ShellManifest};
use core_runtime::config::WorkerConfig;
use core_runtime::events::EventBus;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const ORIGIN: &str = "https://app.test";

pub fn url(path: &str) -> String {
    core_offline::paths::resource_url(ORIGIN, path)
}

/// HTTP client that answers from a script and records every request.
///
/// Unscripted URLs fail like an unreachable host.
#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<HashMap<String, Result<HttpResponse, String>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn respond(&self, url: impl Into<String>, response: HttpResponse) {
        self.routes.lock().unwrap().insert(url.into(), Ok(response));
    }

    /// Serve `body` with status 200 for `url`.
    pub fn serve(&self, url: impl Into<String>, body: &str) {
        self.respond(url, HttpResponse::new(200, body.to_string()));
    }

    pub fn fail(&self, url: impl Into<String>) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.into(), Err("connection refused".to_string()));
    }

    /// Drop every scripted route: the network is gone.
    pub fn go_offline(&self) {
        self.routes.lock().unwrap().clear();
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let outcome = self.routes.lock().unwrap().get(&request.url).cloned();
        self.requests.lock().unwrap().push(request.clone());
        match outcome {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(BridgeError::Network(message)),
            None => Err(BridgeError::Network(format!("no route to {}", request.url))),
        }
    }
}

/// A manager wired to in-memory doubles.
pub struct Harness {
    pub http: Arc<ScriptedHttpClient>,
    pub storage: Arc<MemoryCacheStorage>,
    pub host: Arc<HeadlessWorkerHost>,
    pub events: EventBus,
    pub manager: OfflineCacheManager,
}

impl Harness {
    pub fn new(shell: ShellManifest) -> Self {
        Self::with_parts(
            shell,
            Arc::new(ScriptedHttpClient::default()),
            Arc::new(MemoryCacheStorage::new()),
        )
    }

    /// A new deployment sharing the network and caches of an earlier one.
    pub fn redeploy(&self, shell: ShellManifest) -> Self {
        Self::with_parts(shell, Arc::clone(&self.http), Arc::clone(&self.storage))
    }

    fn with_parts(
        shell: ShellManifest,
        http: Arc<ScriptedHttpClient>,
        storage: Arc<MemoryCacheStorage>,
    ) -> Self {
        let host = Arc::new(HeadlessWorkerHost::new(ORIGIN));
        let config = WorkerConfig::builder()
            .http_client(http.clone())
            .cache_storage(storage.clone())
            .worker_host(host.clone())
            .build()
            .unwrap();
        let events = EventBus::new(32);
        let manager = OfflineCacheManager::new(config, shell).with_event_bus(events.clone());

        Self {
            http,
            storage,
            host,
            events,
            manager,
        }
    }

    pub fn partition(&self, name: &str) -> Option<Arc<MemoryCacheStore>> {
        self.storage.partition(name)
    }

    pub fn content(&self) -> Arc<MemoryCacheStore> {
        self.partition(&self.manager.cache_names().content)
            .expect("content partition exists")
    }

    /// Sorted keys of a partition, empty when it does not exist.
    pub async fn keys(&self, name: &str) -> Vec<String> {
        use bridge_traits::cache::CacheStore;
        match self.partition(name) {
            Some(store) => store.keys().await.unwrap(),
            None => Vec::new(),
        }
    }

    pub async fn content_keys(&self) -> Vec<String> {
        self.keys(&self.manager.cache_names().content).await
    }
}
