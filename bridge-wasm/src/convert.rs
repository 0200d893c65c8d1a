//! Conversions between `web-sys` fetch types and the bridge's owned
//! request/response values.

use crate::error::js_error;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    http::{HttpMethod, HttpRequest, HttpResponse, RequestCache},
};
use bytes::Bytes;
use js_sys::{try_iter, Array, Uint8Array};
use std::collections::HashMap;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response, ResponseInit};

/// Statuses the Fetch standard forbids a body for.
const NULL_BODY_STATUSES: [u16; 4] = [101, 204, 205, 304];

/// Snapshot an intercepted request. The body is not read; only GET requests
/// are ever served by the worker.
pub fn request_from_js(request: &Request) -> BridgeResult<HttpRequest> {
    let method = request.method();
    let method = HttpMethod::parse(&method)
        .ok_or_else(|| BridgeError::OperationFailed(format!("unsupported method {}", method)))?;

    let mut converted = HttpRequest::new(method, request.url());
    converted.headers = collect_headers(&request.headers())?;
    Ok(converted)
}

/// Build a `Request` ready to hand to `fetch`.
pub fn request_to_js(request: &HttpRequest) -> BridgeResult<Request> {
    let init = RequestInit::new();
    init.set_method(request.method.as_str());
    init.set_cache(cache_mode_to_js(request.cache));

    if let Some(body) = &request.body {
        let body_array = Uint8Array::from(body.as_ref());
        init.set_body(&JsValue::from(body_array));
    }

    init.set_headers(&headers_to_js(&request.headers)?);

    Request::new_with_str_and_init(&request.url, &init)
        .map_err(|err| js_error("build request", err))
}

/// Build a `Response` suitable for `respondWith` or `Cache.put`.
pub fn response_to_js(response: &HttpResponse) -> BridgeResult<Response> {
    let init = ResponseInit::new();
    init.set_status(response.status);
    init.set_headers(&headers_to_js(&response.headers)?);

    let mut bytes = response.body.to_vec();
    let body = if NULL_BODY_STATUSES.contains(&response.status) {
        None
    } else {
        Some(bytes.as_mut_slice())
    };

    Response::new_with_opt_u8_array_and_init(body, &init)
        .map_err(|err| js_error("build response", err))
}

/// Read a `Response` fully into memory.
pub async fn response_from_js(response: &Response) -> BridgeResult<HttpResponse> {
    let promise = response
        .array_buffer()
        .map_err(|err| js_error("response.array_buffer", err))?;
    let buffer = JsFuture::from(promise)
        .await
        .map_err(|err| js_error("response buffer", err))?;
    let array = Uint8Array::new(&buffer);
    let mut bytes = vec![0u8; array.length() as usize];
    array.copy_to(&mut bytes);

    Ok(HttpResponse {
        status: response.status(),
        headers: collect_headers(&response.headers())?,
        body: Bytes::from(bytes),
    })
}

/// Map a bridge cache mode onto the Fetch `RequestCache` enum.
pub fn cache_mode_to_js(cache: RequestCache) -> web_sys::RequestCache {
    match cache {
        RequestCache::Default => web_sys::RequestCache::Default,
        RequestCache::Reload => web_sys::RequestCache::Reload,
        RequestCache::NoCache => web_sys::RequestCache::NoCache,
        RequestCache::NoStore => web_sys::RequestCache::NoStore,
    }
}

fn headers_to_js(headers: &HashMap<String, String>) -> BridgeResult<Headers> {
    let js_headers = Headers::new().map_err(|err| js_error("create headers", err))?;
    for (key, value) in headers {
        js_headers
            .set(key, value)
            .map_err(|err| js_error("set header", err))?;
    }
    Ok(js_headers)
}

fn collect_headers(headers: &Headers) -> BridgeResult<HashMap<String, String>> {
    let iterator = try_iter(&JsValue::from(headers.clone()))
        .map_err(|err| js_error("iterate headers", err))?
        .ok_or_else(|| BridgeError::OperationFailed("Headers iterator unavailable".into()))?;

    let mut map = HashMap::new();
    for entry in iterator {
        let entry = entry.map_err(|err| js_error("header iteration", err))?;
        let pair = Array::from(&entry);
        if pair.length() >= 2 {
            if let (Some(key), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                map.insert(key, value);
            }
        }
    }

    Ok(map)
}
