//! Cache storage persisted on the local filesystem using Tokio
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/<sha256(partition name)>/partition.json      {"name": ...}
//! <root>/<sha256(partition name)>/<sha256(url)>.entry  serialized response
//! ```
//!
//! Entry files are written to a temporary sibling and renamed into place, so a
//! crash never leaves a half-written response behind.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bridge_traits::{
    cache::{CacheStorage, CacheStore},
    error::{BridgeError, Result},
    http::HttpResponse,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, warn};

const PARTITION_META: &str = "partition.json";
const ENTRY_EXTENSION: &str = "entry";

#[derive(Debug, Serialize, Deserialize)]
struct PartitionMeta {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    url: String,
    status: u16,
    headers: HashMap<String, String>,
    /// Base64 encoded body
    body: String,
}

impl StoredEntry {
    fn from_response(url: &str, response: &HttpResponse) -> Self {
        Self {
            url: url.to_string(),
            status: response.status,
            headers: response.headers.clone(),
            body: STANDARD.encode(&response.body),
        }
    }

    fn into_response(self) -> Result<HttpResponse> {
        let body = STANDARD
            .decode(self.body.as_bytes())
            .map_err(|e| BridgeError::Storage(format!("Corrupt entry for {}: {}", self.url, e)))?;
        Ok(HttpResponse {
            status: self.status,
            headers: self.headers,
            body: Bytes::from(body),
        })
    }
}

fn digest_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

fn storage_error(context: &str, path: &Path, e: impl std::fmt::Display) -> BridgeError {
    BridgeError::Storage(format!("{} {}: {}", context, path.display(), e))
}

/// Atomic file write (write to temp, then rename)
async fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, data).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

/// Filesystem-backed [`CacheStorage`].
pub struct FsCacheStorage {
    root: PathBuf,
}

impl FsCacheStorage {
    /// Storage rooted in the platform cache directory
    pub fn new() -> Self {
        let root = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("shell-cache")
            .join("partitions");
        Self { root }
    }

    /// Storage rooted at a custom directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_dir(&self, name: &str) -> PathBuf {
        self.root.join(digest_hex(name))
    }
}

impl Default for FsCacheStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStorage for FsCacheStorage {
    async fn open(&self, name: &str) -> Result<Arc<dyn CacheStore>> {
        let dir = self.partition_dir(name);
        let meta_path = dir.join(PARTITION_META);

        if !fs::try_exists(&meta_path).await? {
            fs::create_dir_all(&dir).await?;
            let meta = serde_json::to_vec(&PartitionMeta {
                name: name.to_string(),
            })
            .map_err(|e| storage_error("Failed to encode", &meta_path, e))?;
            atomic_write(&meta_path, &meta).await?;
            debug!(partition = name, "Created cache partition");
        }

        let store: Arc<dyn CacheStore> = Arc::new(FsCacheStore { dir });
        Ok(store)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let dir = self.partition_dir(name);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(partition = name, "Deleted cache partition");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(fs::try_exists(self.partition_dir(name).join(PARTITION_META)).await?)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(names),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let meta_path = entry.path().join(PARTITION_META);
            let Ok(data) = fs::read(&meta_path).await else {
                continue;
            };
            match serde_json::from_slice::<PartitionMeta>(&data) {
                Ok(meta) => names.push(meta.name),
                Err(e) => warn!(path = ?meta_path, error = %e, "Skipping unreadable partition"),
            }
        }

        names.sort();
        Ok(names)
    }
}

/// One partition directory.
///
/// Once the partition is deleted the handle is detached: reads come back
/// empty and writes fail.
pub struct FsCacheStore {
    dir: PathBuf,
}

impl FsCacheStore {
    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir
            .join(digest_hex(url))
            .with_extension(ENTRY_EXTENSION)
    }

    async fn read_entry(path: &Path) -> Result<Option<StoredEntry>> {
        let data = match fs::read(path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(BridgeError::Io(e)),
        };
        serde_json::from_slice(&data)
            .map(Some)
            .map_err(|e| storage_error("Failed to decode", path, e))
    }
}

#[async_trait]
impl CacheStore for FsCacheStore {
    async fn keys(&self) -> Result<Vec<String>> {
        let mut urls = Vec::new();
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(urls),
            Err(e) => return Err(BridgeError::Io(e)),
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            if let Some(stored) = Self::read_entry(&path).await? {
                urls.push(stored.url);
            }
        }

        urls.sort();
        Ok(urls)
    }

    async fn get(&self, url: &str) -> Result<Option<HttpResponse>> {
        match Self::read_entry(&self.entry_path(url)).await? {
            // Digest collisions are not expected, but never serve another URL's body.
            Some(stored) if stored.url == url => stored.into_response().map(Some),
            _ => Ok(None),
        }
    }

    async fn put(&self, url: &str, response: HttpResponse) -> Result<()> {
        if !fs::try_exists(self.dir.join(PARTITION_META)).await? {
            return Err(BridgeError::Storage(format!(
                "Cache partition at {} was deleted",
                self.dir.display()
            )));
        }

        let path = self.entry_path(url);
        let data = serde_json::to_vec(&StoredEntry::from_response(url, &response))
            .map_err(|e| storage_error("Failed to encode", &path, e))?;
        atomic_write(&path, &data).await
    }

    async fn delete(&self, url: &str) -> Result<bool> {
        match fs::remove_file(self.entry_path(url)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BridgeError::Io(e)),
        }
    }
}
