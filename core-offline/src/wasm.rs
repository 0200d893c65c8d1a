//! Service-worker event wiring.
//!
//! Exposes `startOfflineWorker(resources, core)` to the worker script and
//! attaches `install`, `activate`, `fetch` and `message` listeners that drive
//! an [`OfflineCacheManager`].
//!
//! ```js
//! import init, { startOfflineWorker } from "./core_offline.js";
//!
//! await init();
//! startOfflineWorker(RESOURCES, ["main.dart.js", "index.html", "assets/NOTICES"]);
//! ```

use crate::error::OfflineError;
use crate::fetch::FetchRoute;
use crate::manager::{OfflineCacheManager, ReconciliationOutcome};
use crate::shell::{CoreSet, ResourceTable, ShellManifest};
use bridge_traits::logging::LogLevel;
use bridge_wasm::{convert, worker_scope, ServiceWorkerHost, WasmCacheStorage, WorkerFetchClient};
use core_runtime::config::WorkerConfig;
use core_runtime::logging::{init_logging, LoggingConfig};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{ExtendableEvent, ExtendableMessageEvent, FetchEvent};

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Build a manager for `resources`/`core` and start listening for worker events.
#[wasm_bindgen(js_name = startOfflineWorker)]
pub fn start_offline_worker(resources: JsValue, core: JsValue) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // A second start in the same scope keeps the first subscriber
    let _ = init_logging(LoggingConfig::default().with_level(LogLevel::Info));

    let resources: ResourceTable = serde_wasm_bindgen::from_value(resources)?;
    let core: Vec<String> = serde_wasm_bindgen::from_value(core)?;
    let shell = ShellManifest::new(resources, CoreSet::from(core)).map_err(to_js)?;

    let config = WorkerConfig::builder()
        .http_client(Arc::new(WorkerFetchClient::new().map_err(to_js)?))
        .cache_storage(Arc::new(WasmCacheStorage::new().map_err(to_js)?))
        .worker_host(Arc::new(ServiceWorkerHost::new().map_err(to_js)?))
        .build()
        .map_err(to_js)?;

    register(OfflineCacheManager::new(config, shell))
}

/// Attach the manager to the worker's lifecycle and fetch events.
pub fn register(manager: OfflineCacheManager) -> Result<(), JsValue> {
    let scope = worker_scope().map_err(to_js)?;
    let manager = Rc::new(manager);

    let on_install = {
        let manager = Rc::clone(&manager);
        Closure::<dyn FnMut(ExtendableEvent)>::new(move |event: ExtendableEvent| {
            let manager = Rc::clone(&manager);
            let promise = future_to_promise(async move {
                manager.install().await.map_err(to_js)?;
                Ok(JsValue::UNDEFINED)
            });
            if let Err(err) = event.wait_until(&promise) {
                warn!(error = ?err, "waitUntil rejected for install");
            }
        })
    };

    let on_activate = {
        let manager = Rc::clone(&manager);
        Closure::<dyn FnMut(ExtendableEvent)>::new(move |event: ExtendableEvent| {
            let manager = Rc::clone(&manager);
            let promise = future_to_promise(async move {
                // A failed upgrade has already wiped the partitions; activation proceeds
                if let ReconciliationOutcome::Reset { reason } = manager.activate().await {
                    debug!(%reason, "Activated with empty caches");
                }
                Ok(JsValue::UNDEFINED)
            });
            if let Err(err) = event.wait_until(&promise) {
                warn!(error = ?err, "waitUntil rejected for activate");
            }
        })
    };

    let on_fetch = {
        let manager = Rc::clone(&manager);
        Closure::<dyn FnMut(FetchEvent)>::new(move |event: FetchEvent| {
            let request = match convert::request_from_js(&event.request()) {
                Ok(request) => request,
                // Methods the bridge cannot model are never intercepted
                Err(_) => return,
            };
            let route = manager.route(&request);
            if route == FetchRoute::Passthrough {
                return;
            }

            let manager = Rc::clone(&manager);
            let promise = future_to_promise(async move {
                let response = manager
                    .respond(request, route)
                    .await
                    .map_err(to_js)?
                    .ok_or_else(|| to_js("intercepted request produced no response"))?;
                convert::response_to_js(&response)
                    .map(JsValue::from)
                    .map_err(to_js)
            });
            if let Err(err) = event.respond_with(&promise) {
                warn!(error = ?err, "respondWith rejected");
            }
        })
    };

    let on_message = {
        let manager = Rc::clone(&manager);
        Closure::<dyn FnMut(ExtendableMessageEvent)>::new(move |event: ExtendableMessageEvent| {
            let Some(payload) = event.data().as_string() else {
                return;
            };
            let manager = Rc::clone(&manager);
            let promise = future_to_promise(async move {
                manager
                    .handle_message_payload(&payload)
                    .await
                    .map_err(|e: OfflineError| {
                        warn!(error = %e, "Worker message failed");
                        to_js(e)
                    })?;
                Ok(JsValue::UNDEFINED)
            });
            if let Err(err) = event.wait_until(&promise) {
                warn!(error = ?err, "waitUntil rejected for message");
            }
        })
    };

    scope.add_event_listener_with_callback("install", on_install.as_ref().unchecked_ref())?;
    scope.add_event_listener_with_callback("activate", on_activate.as_ref().unchecked_ref())?;
    scope.add_event_listener_with_callback("fetch", on_fetch.as_ref().unchecked_ref())?;
    scope.add_event_listener_with_callback("message", on_message.as_ref().unchecked_ref())?;

    // Listeners live as long as the worker
    on_install.forget();
    on_activate.forget();
    on_fetch.forget();
    on_message.forget();

    Ok(())
}
