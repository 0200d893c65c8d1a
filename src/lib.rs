//! Workspace facade crate.
//!
//! Host applications depend on `shell-cache-workspace` and pick a platform
//! feature instead of wiring the individual crates (`core-runtime`,
//! `core-offline`) themselves.
//!
//! - `desktop-shims` (default): native bridges (reqwest, filesystem cache storage)
//! - `wasm`: browser service-worker bridges and event registration

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_offline as offline;

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_runtime as runtime;
