//! # Worker Configuration Module
//!
//! Provides configuration management for the offline cache worker.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! `WorkerConfig` that holds every bridge the worker talks to plus the names
//! of its cache partitions. The builder fails fast when a required bridge is
//! missing so a misconfigured host never reaches the install phase.
//!
//! ## Required Dependencies
//!
//! - `WorkerHost` - Origin and lifecycle control (no portable default exists)
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `HttpClient` - Network fetches (desktop default: reqwest)
//! - `CacheStorage` - Cache partitions (desktop default: filesystem store)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults for
//! `HttpClient` and `CacheStorage` are injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{CacheNames, WorkerConfig};
//! use std::sync::Arc;
//!
//! let config = WorkerConfig::builder()
//!     .worker_host(Arc::new(MyHost))
//!     .cache_storage(Arc::new(MyCacheStorage))
//!     .http_client(Arc::new(MyHttpClient))
//!     .cache_names(CacheNames::with_prefix("my-app"))
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::WorkerConfig;
//!
//! // No WorkerHost: fails with an actionable CapabilityMissing error
//! let config = WorkerConfig::builder()
//!     .build()
//!     .expect("Should fail - missing worker host");
//! ```

use crate::error::{Error, Result};
use bridge_traits::{CacheStorage, HttpClient, WorkerHost};
use std::sync::Arc;

/// Default name of the scratch partition filled during install.
pub const DEFAULT_TEMP_CACHE: &str = "app-shell-temp";
/// Default name of the durable partition consulted on fetch.
pub const DEFAULT_CONTENT_CACHE: &str = "app-shell-content";
/// Default name of the partition holding the manifest record.
pub const DEFAULT_MANIFEST_CACHE: &str = "app-shell-manifest";
/// Default entry key of the manifest record, resolved against the origin.
pub const DEFAULT_MANIFEST_KEY: &str = "manifest";

/// Names of the three cache partitions the worker owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    /// Scratch area populated during install, merged and discarded on activate
    pub temp: String,
    /// Durable store consulted on fetch
    pub content: String,
    /// Holds the last applied resource table snapshot
    pub manifest: String,
}

impl Default for CacheNames {
    fn default() -> Self {
        Self {
            temp: DEFAULT_TEMP_CACHE.to_string(),
            content: DEFAULT_CONTENT_CACHE.to_string(),
            manifest: DEFAULT_MANIFEST_CACHE.to_string(),
        }
    }
}

impl CacheNames {
    /// Derive all three names from an application prefix,
    /// e.g. `my-app` -> `my-app-temp`, `my-app-content`, `my-app-manifest`.
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            temp: format!("{}-temp", prefix),
            content: format!("{}-content", prefix),
            manifest: format!("{}-manifest", prefix),
        }
    }

    /// All partition names, in the order they are wiped on reset.
    pub fn all(&self) -> [&str; 3] {
        [&self.content, &self.temp, &self.manifest]
    }

    fn validate(&self) -> Result<()> {
        for name in self.all() {
            if name.trim().is_empty() {
                return Err(Error::Config(
                    "Cache partition names cannot be empty".to_string(),
                ));
            }
        }

        if self.temp == self.content || self.temp == self.manifest || self.content == self.manifest
        {
            return Err(Error::Config(format!(
                "Cache partition names must be distinct (temp: {}, content: {}, manifest: {})",
                self.temp, self.content, self.manifest
            )));
        }

        Ok(())
    }
}

/// Worker configuration.
///
/// Holds all bridges and settings required by the offline cache manager.
/// Use [`WorkerConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct WorkerConfig {
    /// Network access used for install, lazy population and online-first fetches
    pub http_client: Arc<dyn HttpClient>,

    /// Named cache partitions
    pub cache_storage: Arc<dyn CacheStorage>,

    /// Origin and lifecycle control
    pub worker_host: Arc<dyn WorkerHost>,

    /// Partition names
    pub cache_names: CacheNames,

    /// Entry key of the manifest record within the manifest partition
    pub manifest_key: String,
}

impl std::fmt::Debug for WorkerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerConfig")
            .field("http_client", &"HttpClient { ... }")
            .field("cache_storage", &"CacheStorage { ... }")
            .field("worker_host", &"WorkerHost { ... }")
            .field("cache_names", &self.cache_names)
            .field("manifest_key", &self.manifest_key)
            .finish()
    }
}

impl WorkerConfig {
    /// Creates a new builder for constructing a `WorkerConfig`.
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Partition names are non-empty and distinct
    /// - The manifest key is non-empty
    pub fn validate(&self) -> Result<()> {
        self.cache_names.validate()?;

        if self.manifest_key.trim().is_empty() {
            return Err(Error::Config("Manifest key cannot be empty".to_string()));
        }

        Ok(())
    }
}

fn worker_host_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "WorkerHost".to_string(),
        message: "WorkerHost implementation is required for origin resolution and lifecycle control. \
                 Browser: inject bridge_wasm::ServiceWorkerHost. \
                 Desktop: inject bridge_desktop::HeadlessWorkerHost with the deployment origin."
            .to_string(),
    }
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| {
        Error::Internal(format!("Failed to initialize default HttpClient: {}", e))
    })?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: ensure the 'desktop-shims' feature is enabled. \
                 Browser: inject bridge_wasm::WorkerFetchClient."
            .to_string(),
    })
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn provide_default_cache_storage() -> Result<Arc<dyn CacheStorage>> {
    use bridge_desktop::FsCacheStorage;

    let storage: Arc<dyn CacheStorage> = Arc::new(FsCacheStorage::new());
    Ok(storage)
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn provide_default_cache_storage() -> Result<Arc<dyn CacheStorage>> {
    Err(Error::CapabilityMissing {
        capability: "CacheStorage".to_string(),
        message: "No CacheStorage implementation provided. \
                 Desktop: ensure the 'desktop-shims' feature is enabled. \
                 Browser: inject bridge_wasm::WasmCacheStorage."
            .to_string(),
    })
}

/// Builder for constructing [`WorkerConfig`] instances.
#[derive(Default)]
pub struct WorkerConfigBuilder {
    http_client: Option<Arc<dyn HttpClient>>,
    cache_storage: Option<Arc<dyn CacheStorage>>,
    worker_host: Option<Arc<dyn WorkerHost>>,
    cache_names: Option<CacheNames>,
    manifest_key: Option<String>,
}

impl WorkerConfigBuilder {
    /// Sets the HTTP client.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the cache storage.
    pub fn cache_storage(mut self, storage: Arc<dyn CacheStorage>) -> Self {
        self.cache_storage = Some(storage);
        self
    }

    /// Sets the worker host (required).
    pub fn worker_host(mut self, host: Arc<dyn WorkerHost>) -> Self {
        self.worker_host = Some(host);
        self
    }

    /// Overrides the partition names.
    ///
    /// Default: [`DEFAULT_TEMP_CACHE`], [`DEFAULT_CONTENT_CACHE`],
    /// [`DEFAULT_MANIFEST_CACHE`]
    pub fn cache_names(mut self, names: CacheNames) -> Self {
        self.cache_names = Some(names);
        self
    }

    /// Overrides the manifest entry key. Default: [`DEFAULT_MANIFEST_KEY`]
    pub fn manifest_key(mut self, key: impl Into<String>) -> Self {
        self.manifest_key = Some(key.into());
        self
    }

    /// Builds the final `WorkerConfig`, validating all settings.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` when no `WorkerHost` is set, or when `HttpClient` /
    ///   `CacheStorage` are missing without the `desktop-shims` feature
    /// - `Config` when partition names or the manifest key are invalid
    pub fn build(self) -> Result<WorkerConfig> {
        let worker_host = self.worker_host.ok_or_else(worker_host_missing_error)?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let cache_storage = match self.cache_storage {
            Some(storage) => storage,
            None => provide_default_cache_storage()?,
        };

        let config = WorkerConfig {
            http_client,
            cache_storage,
            worker_host,
            cache_names: self.cache_names.unwrap_or_default(),
            manifest_key: self
                .manifest_key
                .unwrap_or_else(|| DEFAULT_MANIFEST_KEY.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_desktop::{HeadlessWorkerHost, MemoryCacheStorage};
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{HttpRequest, HttpResponse};

    struct OfflineHttpClient;

    #[async_trait]
    impl HttpClient for OfflineHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(BridgeError::Network("offline".to_string()))
        }
    }

    fn complete_builder() -> WorkerConfigBuilder {
        WorkerConfig::builder()
            .worker_host(Arc::new(HeadlessWorkerHost::new("https://app.test")))
            .cache_storage(Arc::new(MemoryCacheStorage::new()))
            .http_client(Arc::new(OfflineHttpClient))
    }

    #[test]
    fn test_builder_applies_defaults() {
        let config = complete_builder().build().unwrap();
        assert_eq!(config.cache_names, CacheNames::default());
        assert_eq!(config.manifest_key, DEFAULT_MANIFEST_KEY);
        assert_eq!(config.worker_host.origin(), "https://app.test");
    }

    #[test]
    fn test_missing_worker_host_is_capability_error() {
        let result = WorkerConfig::builder()
            .cache_storage(Arc::new(MemoryCacheStorage::new()))
            .http_client(Arc::new(OfflineHttpClient))
            .build();

        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "WorkerHost")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other),
        }
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_missing_storage_without_shims() {
        let result = WorkerConfig::builder()
            .worker_host(Arc::new(HeadlessWorkerHost::new("https://app.test")))
            .http_client(Arc::new(OfflineHttpClient))
            .build();

        assert!(matches!(
            result,
            Err(Error::CapabilityMissing { ref capability, .. }) if capability == "CacheStorage"
        ));
    }

    #[test]
    fn test_prefixed_cache_names() {
        let names = CacheNames::with_prefix("shop");
        assert_eq!(names.temp, "shop-temp");
        assert_eq!(names.content, "shop-content");
        assert_eq!(names.manifest, "shop-manifest");

        let config = complete_builder().cache_names(names.clone()).build().unwrap();
        assert_eq!(config.cache_names, names);
    }

    #[test]
    fn test_rejects_colliding_partition_names() {
        let names = CacheNames {
            temp: "same".to_string(),
            content: "same".to_string(),
            manifest: "manifest".to_string(),
        };
        let result = complete_builder().cache_names(names).build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_empty_manifest_key() {
        let result = complete_builder().manifest_key("  ").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_debug_hides_bridges() {
        let config = complete_builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("HttpClient { ... }"));
        assert!(debug.contains("app-shell-content"));
    }
}
