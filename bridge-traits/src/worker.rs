//! Worker Lifecycle Abstraction
//!
//! The handful of host-global operations a cache worker drives during its
//! lifecycle: where it is deployed, and how it takes control of pages.

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Host environment of a cache worker.
///
/// - Browser: `ServiceWorkerGlobalScope` (`location.origin`, `skipWaiting()`,
///   `clients.claim()`)
/// - Desktop / tests: a headless host with a fixed origin
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait WorkerHost: PlatformSendSync {
    /// Deployment origin without a trailing slash, e.g. `https://app.example.com`.
    fn origin(&self) -> String;

    /// Activate this worker version without waiting for old clients to close.
    async fn skip_waiting(&self) -> Result<()>;

    /// Take control of every open client page.
    async fn claim_clients(&self) -> Result<()>;
}
