//! Concurrent loading of dictionary sources and stored settings
//!
//! Every source fetch and the settings read start together; each writes its
//! own slot, and the loader waits for all of them. A failure only empties
//! its own slot's contribution.

use js_sys::{Array, Function, Promise};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};
use web_sys::Response;

use crate::replacer::dictionary::parse_source;
use crate::replacer::error::EngineError;
use crate::web::js_error_message;

type Slot = Rc<RefCell<Option<Result<Value, EngineError>>>>;

/// Results of the launch-time load
pub struct LoadedInputs {
    pub settings: Result<Value, EngineError>,
    /// One entry per configured source, in configured order
    pub sources: Vec<Result<Value, EngineError>>,
}

fn fetch_error(location: &str, message: String) -> EngineError {
    EngineError::SourceFetch {
        location: location.to_string(),
        message,
    }
}

/// Fetch and decode one dictionary source
pub async fn fetch_source(location: &str) -> Result<Value, EngineError> {
    let window = web_sys::window().ok_or_else(|| fetch_error(location, "no window".to_string()))?;

    let response = JsFuture::from(window.fetch_with_str(location))
        .await
        .map_err(|e| fetch_error(location, js_error_message(&e)))?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| fetch_error(location, "fetch did not return a Response".to_string()))?;
    if !response.ok() {
        return Err(fetch_error(location, format!("HTTP {}", response.status())));
    }

    let body = response
        .text()
        .map_err(|e| fetch_error(location, js_error_message(&e)))?;
    let text = JsFuture::from(body)
        .await
        .map_err(|e| fetch_error(location, js_error_message(&e)))?
        .as_string()
        .ok_or_else(|| fetch_error(location, "response body is not text".to_string()))?;

    parse_source(location, &text)
}

/// Call the host's settings reader (sync value or Promise) and decode the result
pub async fn read_settings(reader: &Function) -> Result<Value, EngineError> {
    let returned = reader
        .call0(&JsValue::NULL)
        .map_err(|e| EngineError::SettingsRead(js_error_message(&e)))?;
    let resolved = JsFuture::from(Promise::resolve(&returned))
        .await
        .map_err(|e| EngineError::SettingsRead(js_error_message(&e)))?;
    serde_wasm_bindgen::from_value(resolved).map_err(|e| EngineError::SettingsRead(e.to_string()))
}

fn spawn_into<F>(slot: &Slot, pending: &Array, task: F)
where
    F: std::future::Future<Output = Result<Value, EngineError>> + 'static,
{
    let slot = Rc::clone(slot);
    pending.push(&future_to_promise(async move {
        *slot.borrow_mut() = Some(task.await);
        Ok(JsValue::UNDEFINED)
    }));
}

/// Read settings and fetch every source concurrently
pub async fn load_inputs(sources: &[String], reader: &Function) -> LoadedInputs {
    let pending = Array::new();

    let settings_slot: Slot = Rc::default();
    let reader = reader.clone();
    spawn_into(&settings_slot, &pending, async move { read_settings(&reader).await });

    let source_slots: Vec<Slot> = sources.iter().map(|_| Rc::default()).collect();
    for (location, slot) in sources.iter().zip(&source_slots) {
        let location = location.clone();
        spawn_into(slot, &pending, async move { fetch_source(&location).await });
    }

    // every task resolves; failures are recorded in the slots
    let _ = JsFuture::from(Promise::all(&pending)).await;

    let settings = settings_slot
        .take()
        .unwrap_or_else(|| Err(EngineError::SettingsRead("settings were not read".to_string())));
    let sources = sources
        .iter()
        .zip(source_slots)
        .map(|(location, slot)| {
            slot.take()
                .unwrap_or_else(|| Err(fetch_error(location, "fetch did not complete".to_string())))
        })
        .collect();

    LoadedInputs { settings, sources }
}
