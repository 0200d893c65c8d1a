//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host that runs
//! the offline cache worker.
//!
//! ## Overview
//!
//! This crate defines the contract between the cache-lifecycle core and
//! platform-specific implementations. Each trait represents a capability the
//! core requires but that is provided differently per platform (browser
//! service worker, desktop shell, test harness).
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - `fetch`-like request execution
//!
//! ### Storage
//! - [`CacheStorage`](cache::CacheStorage) - Registry of named cache partitions
//! - [`CacheStore`](cache::CacheStore) - URL -> response entries of one partition
//!
//! ### Lifecycle
//! - [`WorkerHost`](worker::WorkerHost) - Origin, `skipWaiting`, client claiming
//!
//! ### Utilities
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform        | Implementation Crate | Status |
//! |-----------------|---------------------|--------|
//! | Desktop         | `bridge-desktop`    | ✅ |
//! | Service worker  | `bridge-wasm`       | ✅ |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Report transport failures as `BridgeError::Network` so callers can tell
//!   "offline" apart from storage faults
//! - Include error context (URL, partition name)
//!
//! ## Thread Safety
//!
//! On native targets all bridge traits require `Send + Sync`. On `wasm32` the
//! bound is dropped (see [`platform`]) because browser handles are
//! single-threaded.

pub mod cache;
pub mod error;
pub mod http;
pub mod logging;
pub mod platform;
pub mod worker;

pub use error::BridgeError;

// Re-export commonly used types
pub use cache::{CacheStorage, CacheStore};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RequestCache};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use worker::WorkerHost;
