//! Error types for WebAssembly bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in WebAssembly bridge implementations
#[derive(Error, Debug)]
pub enum WasmError {
    /// JavaScript error from web-sys
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// The global scope lacks a required API
    #[error("Unsupported environment: {0}")]
    Unsupported(String),
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::Unsupported(what) => BridgeError::NotAvailable(what),
            WasmError::JavaScript(message) => BridgeError::OperationFailed(message),
        }
    }
}

impl From<JsValue> for WasmError {
    fn from(js_value: JsValue) -> Self {
        WasmError::JavaScript(js_message(&js_value))
    }
}

/// Human-readable message of a thrown JavaScript value.
pub fn js_message(js_value: &JsValue) -> String {
    if let Some(message) = js_value.as_string() {
        message
    } else if let Some(error) = js_value.dyn_ref::<js_sys::Error>() {
        error.message().into()
    } else {
        format!("{:?}", js_value)
    }
}

/// Storage failure with context.
pub(crate) fn storage_error(context: &str, err: JsValue) -> BridgeError {
    BridgeError::Storage(format!("{}: {}", context, js_message(&err)))
}

/// Generic JavaScript failure with context.
pub(crate) fn js_error(context: &str, err: JsValue) -> BridgeError {
    BridgeError::OperationFailed(format!("{}: {}", context, js_message(&err)))
}

/// `fetch` only rejects when no response was produced at all.
pub(crate) fn network_error(err: JsValue) -> BridgeError {
    BridgeError::Network(js_message(&err))
}
