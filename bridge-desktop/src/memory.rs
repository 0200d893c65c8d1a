//! In-process cache storage
//!
//! Partitions live for the lifetime of the `MemoryCacheStorage`. Useful for
//! embedded hosts that don't need persistence and as a test double for the
//! browser `CacheStorage` API.

use async_trait::async_trait;
use bridge_traits::{
    cache::{CacheStorage, CacheStore},
    error::Result,
    http::HttpResponse,
};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// In-memory registry of named partitions.
#[derive(Default)]
pub struct MemoryCacheStorage {
    partitions: RwLock<HashMap<String, Arc<MemoryCacheStore>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct handle to an existing partition, without creating it.
    pub fn partition(&self, name: &str) -> Option<Arc<MemoryCacheStore>> {
        self.partitions.read().get(name).cloned()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>> {
        let store: Arc<dyn CacheStore> = self
            .partitions
            .write()
            .entry(name.to_string())
            .or_default()
            .clone();
        Ok(store)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.partitions.write().remove(name).is_some())
    }

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.partitions.read().contains_key(name))
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.partitions.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// One in-memory partition. Keys iterate in URL order.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<BTreeMap<String, HttpResponse>>,
}

impl MemoryCacheStore {
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }

    async fn get(&self, url: &str) -> Result<Option<HttpResponse>> {
        Ok(self.entries.read().get(url).cloned())
    }

    async fn put(&self, url: &str, response: HttpResponse) -> Result<()> {
        self.entries.write().insert(url.to_string(), response);
        Ok(())
    }

    async fn delete(&self, url: &str) -> Result<bool> {
        Ok(self.entries.write().remove(url).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_creates_and_reuses_partition() {
        let storage = MemoryCacheStorage::new();
        assert!(!storage.has("content").await.unwrap());

        let first = storage.open("content").await.unwrap();
        first
            .put("https://app.test/main.js", HttpResponse::new(200, "js"))
            .await
            .unwrap();

        let second = storage.open("content").await.unwrap();
        assert!(second.contains("https://app.test/main.js").await.unwrap());
        assert_eq!(storage.keys().await.unwrap(), vec!["content".to_string()]);
    }

    #[tokio::test]
    async fn test_deleted_partition_is_detached() {
        let storage = MemoryCacheStorage::new();
        let old = storage.open("temp").await.unwrap();
        old.put("https://app.test/a.js", HttpResponse::new(200, "a"))
            .await
            .unwrap();

        assert!(storage.delete("temp").await.unwrap());
        assert!(!storage.delete("temp").await.unwrap());

        let fresh = storage.open("temp").await.unwrap();
        assert!(fresh.keys().await.unwrap().is_empty());
        // The old handle still sees its own entries, the registry does not.
        assert_eq!(old.keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_put_replaces_and_delete_reports_presence() {
        let storage = MemoryCacheStorage::new();
        let store = storage.open("content").await.unwrap();
        let url = "https://app.test/";

        store.put(url, HttpResponse::new(200, "v1")).await.unwrap();
        store.put(url, HttpResponse::new(200, "v2")).await.unwrap();
        assert_eq!(store.get(url).await.unwrap().unwrap().body, "v2");

        assert!(store.delete(url).await.unwrap());
        assert!(!store.delete(url).await.unwrap());
        assert!(storage.partition("content").unwrap().is_empty());
    }
}
