//! ReplacerRuntime: the per-page lifecycle exposed to JavaScript
//!
//! `launch` loads the sources and settings concurrently, builds the engine,
//! runs the first full pass and starts watching the document. The host then
//! forwards settings-changed notifications through `onMessage` or
//! `onSettingsChanged`.

use js_sys::{Array, Function, Promise, Reflect};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::future_to_promise;
use web_sys::{MutationObserver, MutationObserverInit};

use crate::dom::tree::{MutationRecord, TextTree};
use crate::replacer::config::EngineConfig;
use crate::replacer::engine::{Engine, EngineStats};
use crate::replacer::gate::ActivationState;
use crate::replacer::walker::WalkStats;
use crate::web::document::{convert_record, WebDocument};
use crate::web::loader::{load_inputs, read_settings};
use crate::web::{log, warn};

// =============================================================================
// Stats
// =============================================================================

/// Counters since launch, returned by `getStats()`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStats {
    pub engine: EngineStats,
    pub sources_loaded: usize,
    pub sources_failed: usize,
    pub initial_pass: Option<WalkStats>,
    pub batches: usize,
    pub batches_ignored: usize,
    pub nodes_rewritten: usize,
    pub settings_reads_failed: usize,
}

// =============================================================================
// Shared state
// =============================================================================

/// State reachable from the observer callback and settings handlers
struct Shared {
    engine: Engine,
    gate: RefCell<ActivationState>,
    document: RefCell<WebDocument>,
    stats: RefCell<RuntimeStats>,
}

impl Shared {
    fn handle_batch(&self, records: &Array) {
        let batch: Vec<MutationRecord<web_sys::Node>> = records
            .iter()
            .filter_map(|r| r.dyn_into::<web_sys::MutationRecord>().ok())
            .map(|r| convert_record(&r))
            .collect();

        let outcome = {
            let gate = self.gate.borrow();
            let mut document = self.document.borrow_mut();
            self.engine.on_mutation_batch(&mut *document, &gate, &batch)
        };

        let mut stats = self.stats.borrow_mut();
        stats.batches += 1;
        if outcome.ignored {
            stats.batches_ignored += 1;
        }
        stats.nodes_rewritten += outcome.rewritten;
    }

    async fn handle_settings_changed(&self, reader: &Function) -> Option<WalkStats> {
        let read = read_settings(reader).await;

        let result = {
            let mut gate = self.gate.borrow_mut();
            let mut document = self.document.borrow_mut();
            self.engine.on_settings_changed(&mut *document, &mut gate, read)
        };

        let mut stats = self.stats.borrow_mut();
        match result {
            Ok(pass) => {
                if let Some(pass) = pass {
                    stats.nodes_rewritten += pass.rewritten;
                }
                pass
            }
            Err(e) => {
                stats.settings_reads_failed += 1;
                warn(&format!("Settings re-read failed, keeping previous state: {}", e));
                None
            }
        }
    }
}

// =============================================================================
// Runtime
// =============================================================================

/// A launched replacer bound to the current page
#[wasm_bindgen]
pub struct ReplacerRuntime {
    shared: Rc<Shared>,
    /// No settings at launch, or nothing to substitute
    dormant: bool,
    read_settings: Function,
    settings_message_type: String,
    observer: Option<MutationObserver>,
    on_mutations: Option<Closure<dyn FnMut(Array, MutationObserver)>>,
}

/// Start the replacer on the current page.
///
/// `config` may be `undefined` for defaults. `readSettings` is called with no
/// arguments and returns the stored settings object or a Promise of it.
#[wasm_bindgen(js_name = launch)]
pub async fn launch(config: JsValue, read_settings: Function) -> Result<ReplacerRuntime, JsValue> {
    let config: EngineConfig = if config.is_undefined() || config.is_null() {
        EngineConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
    let host = window.location().host().unwrap_or_default();

    let inputs = load_inputs(&config.dictionary_sources, &read_settings).await;

    let mut sources_failed = 0;
    for source in &inputs.sources {
        if let Err(e) = source {
            sources_failed += 1;
            warn(&e.to_string());
        }
    }
    let sources_loaded = inputs.sources.len() - sources_failed;

    let engine = Engine::from_sources(inputs.sources, &config.matcher);
    if let Some(e) = engine.compile_error() {
        warn(&e.to_string());
    }

    let mut settings_failed = 0;
    let gate = match &inputs.settings {
        Ok(settings) => ActivationState::from_settings(&host, settings),
        Err(e) => {
            settings_failed = 1;
            warn(&format!("{}; staying inactive on this page", e));
            ActivationState::new(&host)
        }
    };
    let dormant = inputs.settings.is_err() || !engine.is_ready();

    let stats = RuntimeStats {
        engine: engine.stats(),
        sources_loaded,
        sources_failed,
        initial_pass: None,
        batches: 0,
        batches_ignored: 0,
        nodes_rewritten: 0,
        settings_reads_failed: settings_failed,
    };

    let shared = Rc::new(Shared {
        engine,
        gate: RefCell::new(gate),
        document: RefCell::new(WebDocument::new(document)),
        stats: RefCell::new(stats),
    });

    let mut runtime = ReplacerRuntime {
        shared,
        dormant,
        read_settings,
        settings_message_type: config.settings_message_type,
        observer: None,
        on_mutations: None,
    };

    if runtime.dormant {
        log(&format!(
            "Dormant on '{}' ({} terms)",
            host,
            runtime.shared.engine.dictionary().len()
        ));
        return Ok(runtime);
    }

    runtime.initial_pass();
    runtime.observe()?;
    Ok(runtime)
}

impl ReplacerRuntime {
    fn initial_pass(&mut self) {
        let pass = {
            let gate = self.shared.gate.borrow();
            let mut document = self.shared.document.borrow_mut();
            self.shared.engine.apply_now(&mut *document, &gate)
        };

        let engine_stats = self.shared.engine.stats();
        let mut stats = self.shared.stats.borrow_mut();
        stats.initial_pass = pass;
        if let Some(pass) = pass {
            stats.nodes_rewritten += pass.rewritten;
        }

        log(&format!(
            "Ready: {} terms, {} matcher, {} nodes rewritten in {}us",
            engine_stats.term_count,
            engine_stats
                .strategy
                .map(|s| s.to_string())
                .unwrap_or_else(|| "no".to_string()),
            pass.map_or(0, |p| p.rewritten),
            pass.map_or(0, |p| p.elapsed_us),
        ));
    }

    /// Watch the scan root for added nodes and text edits
    fn observe(&mut self) -> Result<(), JsValue> {
        let shared = Rc::clone(&self.shared);
        let callback = Closure::wrap(Box::new(move |records: Array, _observer: MutationObserver| {
            shared.handle_batch(&records);
        }) as Box<dyn FnMut(Array, MutationObserver)>);

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_character_data(true);
        options.set_subtree(true);

        let root = self.shared.document.borrow().scan_root();
        observer.observe_with_options(&root, &options)?;

        self.observer = Some(observer);
        self.on_mutations = Some(callback);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }
}

#[wasm_bindgen]
impl ReplacerRuntime {
    /// Re-read settings and run a full pass if the page is active.
    ///
    /// Resolves to the pass stats, or `null` when nothing ran.
    #[wasm_bindgen(js_name = onSettingsChanged)]
    pub fn on_settings_changed(&self) -> Promise {
        if self.dormant {
            return Promise::resolve(&JsValue::NULL);
        }
        let shared = Rc::clone(&self.shared);
        let reader = self.read_settings.clone();
        future_to_promise(async move {
            let pass = shared.handle_settings_changed(&reader).await;
            Ok(match pass {
                Some(pass) => serde_wasm_bindgen::to_value(&pass).unwrap_or(JsValue::NULL),
                None => JsValue::NULL,
            })
        })
    }

    /// Route a runtime message; only the settings-changed type is handled.
    #[wasm_bindgen(js_name = onMessage)]
    pub fn on_message(&self, message: JsValue) -> Option<Promise> {
        let kind = Reflect::get(&message, &JsValue::from_str("type")).ok()?;
        if kind.as_string().as_deref() != Some(self.settings_message_type.as_str()) {
            return None;
        }
        Some(self.on_settings_changed())
    }

    /// True when substitution would currently run on this page
    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        !self.dormant && self.shared.gate.borrow().is_active()
    }

    #[wasm_bindgen(js_name = isDormant)]
    pub fn is_dormant(&self) -> bool {
        self.dormant
    }

    #[wasm_bindgen(js_name = getStats)]
    pub fn get_stats(&self) -> JsValue {
        let stats = self.shared.stats.borrow().clone();
        serde_wasm_bindgen::to_value(&stats).unwrap_or(JsValue::NULL)
    }

    /// Stop watching the document
    pub fn stop(&mut self) {
        self.disconnect();
        log("Stopped");
    }
}

impl Drop for ReplacerRuntime {
    fn drop(&mut self) {
        self.disconnect();
    }
}
