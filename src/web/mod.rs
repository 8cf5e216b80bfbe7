//! Browser surface: web-sys adapters and the wasm-bindgen runtime
//!
//! Everything that calls into JS lives here, so the engine modules stay
//! testable natively.

pub mod document;
pub mod loader;
pub mod runtime;

pub use document::*;
pub use loader::*;
pub use runtime::*;

use wasm_bindgen::JsValue;

pub(crate) fn log(message: &str) {
    web_sys::console::log_1(&format!("[TermSwap] {}", message).into());
}

pub(crate) fn warn(message: &str) {
    web_sys::console::warn_1(&format!("[TermSwap] {}", message).into());
}

/// Best-effort text for a thrown JS value
pub(crate) fn js_error_message(error: &JsValue) -> String {
    error.as_string().unwrap_or_else(|| format!("{:?}", error))
}
