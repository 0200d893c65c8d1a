//! Named Cache Partitions
//!
//! Abstracts the key/value response store a host exposes to a worker:
//! - Browser service worker: the `CacheStorage` / `Cache` API
//! - Desktop: a directory of serialized responses
//! - Tests and embedded hosts: in-process maps
//!
//! Entries are keyed by absolute request URL. A partition handle obtained from
//! [`CacheStorage::open`] stays usable after the partition is deleted but is
//! detached: later `open` calls with the same name return a fresh, empty
//! partition.

use std::sync::Arc;

use crate::error::Result;
use crate::http::HttpResponse;
use crate::platform::PlatformSendSync;

/// Registry of named cache partitions.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::cache::CacheStorage;
///
/// async fn wipe(storage: &dyn CacheStorage) -> Result<()> {
///     for name in storage.keys().await? {
///         storage.delete(&name).await?;
///     }
///     Ok(())
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CacheStorage: PlatformSendSync {
    /// Open a partition, creating it if it doesn't exist.
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>>;

    /// Delete a partition and all of its entries.
    ///
    /// Returns `false` when no partition with that name existed.
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Check whether a partition exists.
    async fn has(&self, name: &str) -> Result<bool>;

    /// List the names of all existing partitions.
    async fn keys(&self) -> Result<Vec<String>>;
}

/// A single named partition of request URL -> response entries.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CacheStore: PlatformSendSync {
    /// Request URLs of every stored entry.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Look up the response stored for `url`.
    async fn get(&self, url: &str) -> Result<Option<HttpResponse>>;

    /// Store `response` under `url`, replacing any previous entry.
    async fn put(&self, url: &str, response: HttpResponse) -> Result<()>;

    /// Remove the entry for `url`. Returns `false` if nothing was stored.
    async fn delete(&self, url: &str) -> Result<bool>;

    /// Check whether an entry exists for `url`.
    async fn contains(&self, url: &str) -> Result<bool> {
        Ok(self.get(url).await?.is_some())
    }
}
