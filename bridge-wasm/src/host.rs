//! `WorkerHost` for a real `ServiceWorkerGlobalScope`.

use crate::error::js_error;
use crate::worker_scope;
use async_trait::async_trait;
use bridge_traits::{error::Result as BridgeResult, worker::WorkerHost};
use wasm_bindgen_futures::JsFuture;
use web_sys::ServiceWorkerGlobalScope;

/// Lifecycle operations of the running service worker.
pub struct ServiceWorkerHost {
    scope: ServiceWorkerGlobalScope,
}

impl ServiceWorkerHost {
    /// Bind to the current worker scope.
    pub fn new() -> BridgeResult<Self> {
        Ok(Self {
            scope: worker_scope()?,
        })
    }

    /// The underlying global scope, for attaching event listeners.
    pub fn scope(&self) -> &ServiceWorkerGlobalScope {
        &self.scope
    }
}

#[async_trait(?Send)]
impl WorkerHost for ServiceWorkerHost {
    fn origin(&self) -> String {
        self.scope.location().origin()
    }

    async fn skip_waiting(&self) -> BridgeResult<()> {
        let promise = self
            .scope
            .skip_waiting()
            .map_err(|err| js_error("skipWaiting", err))?;
        JsFuture::from(promise)
            .await
            .map_err(|err| js_error("skipWaiting", err))?;
        Ok(())
    }

    async fn claim_clients(&self) -> BridgeResult<()> {
        JsFuture::from(self.scope.clients().claim())
            .await
            .map_err(|err| js_error("clients.claim", err))?;
        Ok(())
    }
}
