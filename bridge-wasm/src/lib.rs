//! WebAssembly Bridge Implementations
//!
//! Service-worker implementations of the bridge traits defined in
//! `bridge-traits`, built on `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target
//! and must run inside a `ServiceWorkerGlobalScope`. It compiles to nothing on
//! native targets.
//!
//! # Implementations
//!
//! - `WorkerFetchClient`: the worker's `fetch`, honouring fetch cache modes
//! - `WasmCacheStorage` / `WasmCacheStore`: the Cache Storage API
//! - `ServiceWorkerHost`: `location.origin`, `skipWaiting()`, `clients.claim()`
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{ServiceWorkerHost, WasmCacheStorage, WorkerFetchClient};
//! use std::sync::Arc;
//!
//! let config = WorkerConfig::builder()
//!     .http_client(Arc::new(WorkerFetchClient::new()?))
//!     .cache_storage(Arc::new(WasmCacheStorage::new()?))
//!     .worker_host(Arc::new(ServiceWorkerHost::new()?))
//!     .build()?;
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod cache_storage;
pub mod convert;
pub mod error;
pub mod host;
pub mod http;

// Re-export commonly used types
pub use cache_storage::{WasmCacheStorage, WasmCacheStore};
pub use error::{WasmError, WasmResult};
pub use host::ServiceWorkerHost;
pub use http::WorkerFetchClient;

use wasm_bindgen::JsCast;
use web_sys::ServiceWorkerGlobalScope;

/// The global scope of the running service worker.
pub fn worker_scope() -> WasmResult<ServiceWorkerGlobalScope> {
    js_sys::global()
        .dyn_into::<ServiceWorkerGlobalScope>()
        .map_err(|_| WasmError::Unsupported("not running in a service worker".to_string()))
}
