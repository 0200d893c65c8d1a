//! # Offline Cache Manager
//!
//! Keeps a compiled web application shell available offline from inside a
//! service worker (or any host that provides the same cache primitives).
//!
//! ## Overview
//!
//! A deployment ships a [`ShellManifest`]: a Resource Table mapping every
//! shell path to a content fingerprint, and a Core Set of paths needed for a
//! minimal offline start. The [`OfflineCacheManager`] then:
//!
//! - **install**: stages the Core Set in a temp partition
//! - **activate**: evicts entries whose fingerprint changed since the last
//!   applied manifest, merges the staged files and records the new manifest
//! - **fetch**: serves shell assets cache-first and the root document
//!   online-first; everything else passes through
//! - **message**: `skipWaiting` and `downloadOffline` control messages
//!
//! All platform access goes through `bridge-traits`, so the same manager runs
//! in a browser (`wasm` feature) and natively against `bridge-desktop`.

pub mod error;
pub mod fetch;
pub mod manager;
pub mod manifest;
pub mod message;
pub mod paths;
pub mod shell;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

pub use error::{OfflineError, Result};
pub use fetch::FetchRoute;
pub use manager::{InstallReport, OfflineCacheManager, ReconciliationOutcome, ReconciliationReport};
pub use manifest::ManifestRecord;
pub use message::WorkerMessage;
pub use paths::ROOT_PATH;
pub use shell::{CoreSet, ResourceTable, ShellManifest};
