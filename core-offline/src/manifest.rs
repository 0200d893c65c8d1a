//! Persisted snapshot of the Resource Table that was last applied.
//!
//! Stored as one JSON response in the manifest partition, keyed by the
//! manifest URL (origin + "/" + manifest key).

use crate::error::{OfflineError, Result};
use crate::shell::ResourceTable;
use bridge_traits::{cache::CacheStore, http::HttpResponse};
use std::sync::Arc;
use tracing::debug;

pub struct ManifestRecord {
    store: Arc<dyn CacheStore>,
    url: String,
}

impl ManifestRecord {
    pub fn new(store: Arc<dyn CacheStore>, url: impl Into<String>) -> Self {
        Self {
            store,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Previously applied table, or `None` before the first activation.
    ///
    /// # Errors
    ///
    /// `Manifest` when a record exists but does not parse.
    pub async fn read(&self) -> Result<Option<ResourceTable>> {
        let Some(response) = self.store.get(&self.url).await? else {
            debug!(url = %self.url, "No manifest record");
            return Ok(None);
        };

        serde_json::from_slice(&response.body)
            .map(Some)
            .map_err(|e| OfflineError::Manifest(format!("Unreadable record at {}: {}", self.url, e)))
    }

    /// Replace the record with `table`.
    pub async fn write(&self, table: &ResourceTable) -> Result<()> {
        let body = serde_json::to_vec(table)
            .map_err(|e| OfflineError::Manifest(format!("Failed to encode record: {}", e)))?;
        let response = HttpResponse::new(200, body).with_header("content-type", "application/json");
        self.store.put(&self.url, response).await?;
        debug!(url = %self.url, entries = table.len(), "Manifest record written");
        Ok(())
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use bridge_desktop::MemoryCacheStorage;
    use bridge_traits::cache::CacheStorage;

    const URL: &str = "https://app.test/manifest";

    #[tokio::test]
    async fn test_absent_record_reads_none() {
        let storage = MemoryCacheStorage::new();
        let record = ManifestRecord::new(storage.open("manifest").await.unwrap(), URL);
        assert!(record.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let storage = MemoryCacheStorage::new();
        let record = ManifestRecord::new(storage.open("manifest").await.unwrap(), URL);
        let table: ResourceTable = [("a.js", "h1"), ("/", "h0")].into_iter().collect();

        record.write(&table).await.unwrap();
        assert_eq!(record.read().await.unwrap(), Some(table));
        assert_eq!(storage.partition("manifest").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_error() {
        let storage = MemoryCacheStorage::new();
        let store = storage.open("manifest").await.unwrap();
        store
            .put(URL, HttpResponse::new(200, "<html>not json</html>"))
            .await
            .unwrap();

        let record = ManifestRecord::new(store, URL);
        assert!(matches!(
            record.read().await,
            Err(OfflineError::Manifest(_))
        ));
    }
}
