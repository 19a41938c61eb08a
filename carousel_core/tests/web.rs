// Browser-side checks for the JS facade, including the error paths that need a real JsValue.
// Run with `wasm-pack test --headless --chrome`.
#![cfg(target_arch = "wasm32")]

use carousel_core::Carousel;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const MOVIES: &str = r#"[{"title":"Alien"},{"title":"Heat"},{"title":"Ran"}]"#;

#[wasm_bindgen_test]
fn rejects_bad_config() {
    let err = Carousel::new(r#"{"physics":{"friction":1.5}}"#).err().unwrap();
    assert!(err.as_string().unwrap().contains("friction"));
}

#[wasm_bindgen_test]
fn malformed_catalog_is_an_error() {
    let mut c = Carousel::new("{}").unwrap();
    let err = c.load_catalog("{not json", 1000.0, 0.0).unwrap_err();
    assert!(err.as_string().unwrap().starts_with("Malformed movie catalog"));
}

#[wasm_bindgen_test]
fn start_before_entry_is_rejected() {
    let mut c = Carousel::new("{}").unwrap();
    c.load_catalog(MOVIES, 1000.0, 0.0).unwrap();
    assert!(c.start().is_err());
}

#[wasm_bindgen_test]
fn stale_handle_is_rejected() {
    let mut c = Carousel::new("{}").unwrap();
    c.load_catalog(MOVIES, 1000.0, 0.0).unwrap();
    c.begin_warmup().unwrap();
    c.finish_warmup().unwrap();
    c.begin_entry(0.0).unwrap();
    c.entry_frame(1000.0).unwrap();
    let handle = c.start().unwrap();
    assert!(c.cancel(handle));
    let err = c.frame(handle, 16.0).unwrap_err();
    assert!(err.as_string().unwrap().contains("no longer scheduled"));
}

#[wasm_bindgen_test]
fn unknown_tab_is_rejected() {
    let mut c = Carousel::new("{}").unwrap();
    assert!(c.switch_tab("extras").is_err());
}

#[wasm_bindgen_test]
fn entry_waits_for_warmup() {
    let mut c = Carousel::new("{}").unwrap();
    c.load_catalog(MOVIES, 1000.0, 0.0).unwrap();
    let err = c.begin_entry(0.0).unwrap_err();
    assert!(err.as_string().unwrap().contains("warm-up"));
}
