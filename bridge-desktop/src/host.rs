//! Headless worker host
//!
//! There are no client pages to claim outside a browser; the host records the
//! lifecycle calls so embedding applications (and tests) can observe them.

use async_trait::async_trait;
use bridge_traits::{error::Result, worker::WorkerHost};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Worker host with a fixed deployment origin.
#[derive(Debug)]
pub struct HeadlessWorkerHost {
    origin: String,
    skip_waiting_calls: AtomicUsize,
    claim_calls: AtomicUsize,
}

impl HeadlessWorkerHost {
    /// Create a host for `origin`. A trailing slash is dropped.
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        Self {
            origin,
            skip_waiting_calls: AtomicUsize::new(0),
            claim_calls: AtomicUsize::new(0),
        }
    }

    /// Number of times the worker asked to skip the waiting phase.
    pub fn skip_waiting_count(&self) -> usize {
        self.skip_waiting_calls.load(Ordering::SeqCst)
    }

    /// Number of times the worker claimed its clients.
    pub fn claim_count(&self) -> usize {
        self.claim_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkerHost for HeadlessWorkerHost {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    async fn skip_waiting(&self) -> Result<()> {
        self.skip_waiting_calls.fetch_add(1, Ordering::SeqCst);
        debug!(origin = %self.origin, "skip_waiting");
        Ok(())
    }

    async fn claim_clients(&self) -> Result<()> {
        self.claim_calls.fetch_add(1, Ordering::SeqCst);
        debug!(origin = %self.origin, "claim_clients");
        Ok(())
    }
}
