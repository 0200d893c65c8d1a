//! # Offline Cache Manager
//!
//! Owns the three cache partitions and reacts to the worker lifecycle.
//!
//! ## Workflow
//!
//! ### Install
//! 1. Ask the host to skip the waiting phase
//! 2. Fetch every Core Set path, bypassing intermediate HTTP caches
//! 3. Stage all responses in the temp partition (nothing is stored if any fetch fails)
//!
//! ### Activate
//! 1. Open the content, temp and manifest partitions
//! 2. Read the manifest record
//! 3. No record: recreate content, merge temp, drop temp, write record, claim clients
//! 4. Record present: evict content entries whose path left the table or whose
//!    fingerprint changed since the record was written
//! 5. Merge temp into content, overwriting survivors
//! 6. Drop temp
//! 7. Write the current table as the new record
//! 8. Claim clients
//!
//! Any failure in steps 1-8 deletes all three partitions and is reported as
//! [`ReconciliationOutcome::Reset`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_offline::{OfflineCacheManager, ReconciliationOutcome, ShellManifest};
//!
//! let shell = ShellManifest::from_static(&[("/", "h0"), ("main.js", "h1")], &["main.js"])?;
//! let manager = OfflineCacheManager::new(config, shell);
//!
//! manager.install().await?;
//! match manager.activate().await {
//!     ReconciliationOutcome::Success(report) => println!("{} entries evicted", report.removed),
//!     ReconciliationOutcome::Reset { reason } => eprintln!("caches wiped: {}", reason),
//! }
//! ```

use crate::error::{OfflineError, Result};
use crate::manifest::ManifestRecord;
use crate::message::WorkerMessage;
use crate::paths::{resource_url, stored_path};
use crate::shell::ShellManifest;
use bridge_traits::{
    cache::{CacheStorage, CacheStore},
    http::{HttpClient, HttpRequest, HttpResponse, RequestCache},
    worker::WorkerHost,
};
use core_runtime::config::{CacheNames, WorkerConfig};
use core_runtime::events::{CacheEvent, EventBus, LifecycleEvent, WorkerEvent};
use core_runtime::logging::redact_url;
use futures::future::try_join_all;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Core paths staged in the temp partition.
    pub staged: usize,
}

/// What reconciliation did to the content partition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// No manifest record existed; content was recreated from scratch.
    pub first_run: bool,
    /// Entries evicted because their path left the table or their fingerprint changed.
    pub removed: usize,
    /// Entries kept from the previous version.
    pub retained: usize,
    /// Entries copied from the temp partition.
    pub merged: usize,
}

/// Outcome of [`OfflineCacheManager::activate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    Success(ReconciliationReport),
    /// Reconciliation failed and every managed partition was deleted.
    Reset { reason: String },
}

impl ReconciliationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ReconciliationOutcome::Success(_))
    }
}

/// Cache-lifecycle manager for one deployed shell version.
pub struct OfflineCacheManager {
    pub(crate) http: Arc<dyn HttpClient>,
    pub(crate) storage: Arc<dyn CacheStorage>,
    pub(crate) host: Arc<dyn WorkerHost>,
    pub(crate) names: CacheNames,
    manifest_key: String,
    pub(crate) shell: ShellManifest,
    events: Option<EventBus>,
}

impl std::fmt::Debug for OfflineCacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineCacheManager")
            .field("names", &self.names)
            .field("manifest_key", &self.manifest_key)
            .field("resources", &self.shell.resources().len())
            .field("core", &self.shell.core().len())
            .finish()
    }
}

impl OfflineCacheManager {
    pub fn new(config: WorkerConfig, shell: ShellManifest) -> Self {
        Self {
            http: config.http_client,
            storage: config.cache_storage,
            host: config.worker_host,
            names: config.cache_names,
            manifest_key: config.manifest_key,
            shell,
            events: None,
        }
    }

    /// Publish lifecycle and cache events on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn shell(&self) -> &ShellManifest {
        &self.shell
    }

    pub fn cache_names(&self) -> &CacheNames {
        &self.names
    }

    /// URL the manifest record is stored under for the current origin.
    pub fn manifest_url(&self) -> String {
        resource_url(&self.host.origin(), &self.manifest_key)
    }

    pub(crate) fn emit(&self, event: WorkerEvent) {
        if let Some(bus) = &self.events {
            // No subscribers is fine
            let _ = bus.emit(event);
        }
    }

    /// Fetch `url`, treating any non-ok status as a failure.
    async fn fetch_ok(&self, url: &str, cache: RequestCache) -> Result<HttpResponse> {
        let response = self
            .http
            .execute(HttpRequest::get(url).cache_mode(cache))
            .await?;
        if !response.is_success() {
            return Err(OfflineError::BadStatus {
                url: redact_url(url).to_string(),
                status: response.status,
            });
        }
        Ok(response)
    }

    /// Fetch every URL concurrently and store them only if all succeeded.
    async fn fetch_all_into(
        &self,
        store: &dyn CacheStore,
        urls: Vec<String>,
        cache: RequestCache,
    ) -> Result<usize> {
        let responses = try_join_all(urls.iter().map(|url| self.fetch_ok(url, cache))).await?;
        for (url, response) in urls.iter().zip(responses) {
            store.put(url, response).await?;
        }
        Ok(urls.len())
    }

    /// Stage the Core Set in the temp partition.
    ///
    /// # Errors
    ///
    /// Fails if any core fetch fails at the transport level or returns a
    /// non-ok status; the temp partition is left untouched in that case.
    #[instrument(skip(self), fields(core = self.shell.core().len()))]
    pub async fn install(&self) -> Result<InstallReport> {
        if let Err(e) = self.host.skip_waiting().await {
            warn!(error = %e, "skip_waiting failed during install");
        }

        let origin = self.host.origin();
        let urls: Vec<String> = self
            .shell
            .core()
            .iter()
            .map(|path| resource_url(&origin, path))
            .collect();

        let temp = self.storage.open(&self.names.temp).await?;
        let staged = self
            .fetch_all_into(temp.as_ref(), urls, RequestCache::Reload)
            .await
            .map_err(|e| {
                error!(error = %e, "Install failed");
                e
            })?;

        info!(staged, "App shell installed");
        self.emit(WorkerEvent::Lifecycle(LifecycleEvent::Installed {
            core_paths: staged,
        }));
        Ok(InstallReport { staged })
    }

    /// Reconcile the content partition against the manifest record.
    ///
    /// Never fails: an error during reconciliation wipes all partitions and
    /// is returned as [`ReconciliationOutcome::Reset`].
    #[instrument(skip(self))]
    pub async fn activate(&self) -> ReconciliationOutcome {
        match self.reconcile().await {
            Ok(report) => {
                info!(
                    first_run = report.first_run,
                    removed = report.removed,
                    retained = report.retained,
                    merged = report.merged,
                    "App shell activated"
                );
                self.emit(WorkerEvent::Lifecycle(LifecycleEvent::Activated {
                    removed: report.removed,
                    merged: report.merged,
                    first_run: report.first_run,
                }));
                ReconciliationOutcome::Success(report)
            }
            Err(e) => {
                let reason = e.to_string();
                error!(error = %reason, "Failed to upgrade offline cache, resetting");
                self.reset().await;
                self.emit(WorkerEvent::Cache(CacheEvent::Reset {
                    reason: reason.clone(),
                }));
                ReconciliationOutcome::Reset { reason }
            }
        }
    }

    async fn reconcile(&self) -> Result<ReconciliationReport> {
        let origin = self.host.origin();
        let mut content = self.storage.open(&self.names.content).await?;
        let temp = self.storage.open(&self.names.temp).await?;
        let record = ManifestRecord::new(
            self.storage.open(&self.names.manifest).await?,
            resource_url(&origin, &self.manifest_key),
        );

        let mut report = ReconciliationReport::default();
        match record.read().await? {
            None => {
                // Unmanaged leftovers from an older worker are not trusted
                self.storage.delete(&self.names.content).await?;
                content = self.storage.open(&self.names.content).await?;
                report.first_run = true;
            }
            Some(previous) => {
                let current = self.shell.resources();
                for url in content.keys().await? {
                    let unchanged = stored_path(&origin, &url).is_some_and(|path| {
                        matches!(
                            (current.get(&path), previous.get(&path)),
                            (Some(new), Some(old)) if new == old
                        )
                    });
                    if unchanged {
                        report.retained += 1;
                    } else {
                        debug!(url = redact_url(&url), "Evicting stale entry");
                        content.delete(&url).await?;
                        report.removed += 1;
                    }
                }
            }
        }

        for url in temp.keys().await? {
            if let Some(response) = temp.get(&url).await? {
                content.put(&url, response).await?;
                report.merged += 1;
            }
        }
        self.storage.delete(&self.names.temp).await?;

        record.write(self.shell.resources()).await?;

        if let Err(e) = self.host.claim_clients().await {
            warn!(error = %e, "Failed to claim clients");
        }

        Ok(report)
    }

    /// Delete every managed partition. Failures are logged and skipped so
    /// one bad partition does not keep the others alive.
    async fn reset(&self) {
        for name in self.names.all() {
            if let Err(e) = self.storage.delete(name).await {
                warn!(partition = name, error = %e, "Failed to delete cache partition");
            }
        }
    }

    /// Fetch and store every Resource Table entry missing from content.
    ///
    /// Returns how many entries were downloaded. All-or-nothing: one failed
    /// fetch stores nothing.
    #[instrument(skip(self))]
    pub async fn download_offline(&self) -> Result<usize> {
        let origin = self.host.origin();
        let content = self.storage.open(&self.names.content).await?;

        let present: HashSet<String> = content
            .keys()
            .await?
            .iter()
            .filter_map(|url| stored_path(&origin, url))
            .collect();
        let missing: Vec<String> = self
            .shell
            .resources()
            .paths()
            .filter(|path| !present.contains(*path))
            .map(|path| resource_url(&origin, path))
            .collect();

        if missing.is_empty() {
            debug!("Content already holds every resource");
            return Ok(0);
        }

        let downloaded = self
            .fetch_all_into(content.as_ref(), missing, RequestCache::Default)
            .await?;
        info!(downloaded, "Offline download completed");
        self.emit(WorkerEvent::Cache(CacheEvent::OfflineDownloadCompleted {
            downloaded,
        }));
        Ok(downloaded)
    }

    /// React to a page message.
    pub async fn handle_message(&self, message: WorkerMessage) -> Result<()> {
        debug!(message = %message, "Worker message");
        match message {
            WorkerMessage::SkipWaiting => {
                self.emit(WorkerEvent::Lifecycle(LifecycleEvent::SkipWaitingRequested));
                self.host.skip_waiting().await?;
            }
            WorkerMessage::DownloadOffline => {
                self.download_offline().await?;
            }
        }
        Ok(())
    }

    /// Parse and handle a raw message payload. Unknown payloads are ignored
    /// and return `Ok(false)`.
    pub async fn handle_message_payload(&self, payload: &str) -> Result<bool> {
        match WorkerMessage::parse(payload) {
            Some(message) => {
                self.handle_message(message).await?;
                Ok(true)
            }
            None => {
                debug!(payload, "Ignoring unknown worker message");
                Ok(false)
            }
        }
    }
}
