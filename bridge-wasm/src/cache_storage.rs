//! Cache Storage API implementation of the cache bridge traits.

use crate::convert::{response_from_js, response_to_js};
use crate::error::storage_error;
use crate::worker_scope;
use async_trait::async_trait;
use bridge_traits::{
    cache::{CacheStorage, CacheStore},
    error::{BridgeError, Result as BridgeResult},
    http::HttpResponse,
};
use js_sys::{Array, Promise};
use std::sync::Arc;
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Cache, Request, Response};

async fn settle(context: &str, promise: Promise) -> BridgeResult<JsValue> {
    JsFuture::from(promise)
        .await
        .map_err(|err| storage_error(context, err))
}

/// `self.caches` of the running worker.
pub struct WasmCacheStorage {
    caches: web_sys::CacheStorage,
}

impl WasmCacheStorage {
    /// Bind to the Cache Storage of the current worker scope.
    pub fn new() -> BridgeResult<Self> {
        let caches = worker_scope()?
            .caches()
            .map_err(|err| storage_error("self.caches", err))?;
        Ok(Self { caches })
    }
}

#[async_trait(?Send)]
impl CacheStorage for WasmCacheStorage {
    async fn open(&self, name: &str) -> BridgeResult<Arc<dyn CacheStore>> {
        let cache = settle("caches.open", self.caches.open(name))
            .await?
            .dyn_into::<Cache>()
            .map_err(|_| BridgeError::Storage(format!("caches.open({}) returned non-Cache", name)))?;
        Ok(Arc::new(WasmCacheStore { cache }))
    }

    async fn delete(&self, name: &str) -> BridgeResult<bool> {
        let deleted = settle("caches.delete", self.caches.delete(name))
            .await?
            .is_truthy();
        debug!(partition = name, deleted, "Deleted cache partition");
        Ok(deleted)
    }

    async fn has(&self, name: &str) -> BridgeResult<bool> {
        Ok(settle("caches.has", self.caches.has(name)).await?.is_truthy())
    }

    async fn keys(&self) -> BridgeResult<Vec<String>> {
        let names = Array::from(&settle("caches.keys", self.caches.keys()).await?);
        Ok(names.iter().filter_map(|name| name.as_string()).collect())
    }
}

/// One opened `Cache`.
pub struct WasmCacheStore {
    cache: Cache,
}

#[async_trait(?Send)]
impl CacheStore for WasmCacheStore {
    async fn keys(&self) -> BridgeResult<Vec<String>> {
        let requests = Array::from(&settle("cache.keys", self.cache.keys()).await?);
        Ok(requests
            .iter()
            .filter_map(|request| request.dyn_into::<Request>().ok())
            .map(|request| request.url())
            .collect())
    }

    async fn get(&self, url: &str) -> BridgeResult<Option<HttpResponse>> {
        let matched = settle("cache.match", self.cache.match_with_str(url)).await?;
        match matched.dyn_into::<Response>() {
            Ok(response) => response_from_js(&response).await.map(Some),
            // `match` resolves to undefined on a miss
            Err(_) => Ok(None),
        }
    }

    async fn put(&self, url: &str, response: HttpResponse) -> BridgeResult<()> {
        let js_response = response_to_js(&response)?;
        settle("cache.put", self.cache.put_with_str(url, &js_response))
            .await
            .map_err(|err| {
                warn!(url, error = %err, "cache.put failed");
                err
            })?;
        Ok(())
    }

    async fn delete(&self, url: &str) -> BridgeResult<bool> {
        Ok(settle("cache.delete", self.cache.delete_with_str(url))
            .await?
            .is_truthy())
    }
}
