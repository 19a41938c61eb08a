// wasm32-only plumbing: fetch against the backend API and localStorage access.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response, Storage};

use crate::catalog::CatalogRequest;
use crate::error::CarouselError;

fn network(err: JsValue) -> CarouselError {
    CarouselError::Network(
        err.as_string()
            .unwrap_or_else(|| format!("{err:?}")),
    )
}

/// Send `request` to `api_base` and return the response body.
/// Transport failures are `Network` errors; statuses go through
/// `CatalogRequest::resolve_response`.
pub async fn send(api_base: &str, request: &CatalogRequest) -> Result<String, CarouselError> {
    let window = web_sys::window().ok_or_else(|| CarouselError::Network("no window".to_string()))?;
    let url = request.url(api_base);

    let opts = RequestInit::new();
    opts.set_method(request.method());
    let body = request.body()?;
    if let Some(body) = &body {
        opts.set_body(&JsValue::from_str(body));
    }

    let req = Request::new_with_str_and_init(&url, &opts).map_err(network)?;
    if body.is_some() {
        req.headers()
            .set("Content-Type", "application/json")
            .map_err(network)?;
    }

    tracing::debug!(method = request.method(), %url, "api request");
    let value = JsFuture::from(window.fetch_with_request(&req))
        .await
        .map_err(network)?;
    let resp: Response = value.dyn_into().map_err(network)?;

    // The body is read before the status check; envelope routes carry their
    // error message in it.
    let text = JsFuture::from(resp.text().map_err(network)?)
        .await
        .map_err(network)?
        .as_string()
        .unwrap_or_default();
    let result = request.resolve_response(resp.status(), &resp.status_text(), text);
    if let Err(err) = &result {
        tracing::error!(method = request.method(), %url, error = %err, "api request failed");
    }
    result
}

fn local_storage() -> Option<Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn load_item(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

pub fn store_item(key: &str, value: &str) {
    let stored = local_storage().map(|s| s.set_item(key, value));
    if !matches!(stored, Some(Ok(()))) {
        tracing::warn!(key, "could not write to localStorage");
    }
}

/// Simulated playback progress for "continue watching", 20 to 80 percent.
pub fn random_progress() -> u8 {
    (20.0 + (js_sys::Math::random() * 60.0).floor()) as u8
}
