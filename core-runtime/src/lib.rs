//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the offline cache worker:
//! - Logging and tracing infrastructure
//! - Configuration management (bridge injection, partition names)
//! - Worker event bus
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the cache-lifecycle core depends
//! on. It establishes how bridges are injected, the logging conventions, and
//! how lifecycle outcomes are broadcast to observers.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
