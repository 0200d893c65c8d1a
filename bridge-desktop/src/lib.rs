//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for native hosts
//! (macOS, Windows, Linux) that run the offline cache worker outside a
//! browser, plus in-process doubles used by tests.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `CacheStorage` persisted under the platform cache directory
//!   using `tokio::fs`
//! - `CacheStorage` kept in process memory
//! - `WorkerHost` as a headless host with a fixed origin
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{FsCacheStorage, HeadlessWorkerHost, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let storage = FsCacheStorage::new();
//!     let host = HeadlessWorkerHost::new("https://app.example.com");
//!
//!     // Hand these to core_runtime::config::WorkerConfig
//!     Ok(())
//! }
//! ```

mod cache_storage;
mod host;
mod http;
mod memory;

pub use cache_storage::{FsCacheStorage, FsCacheStore};
pub use host::HeadlessWorkerHost;
pub use http::ReqwestHttpClient;
pub use memory::{MemoryCacheStorage, MemoryCacheStore};
