//! TermSwap: live whole-word substitution for rendered web pages
//!
//! A Rust/WASM content script that rewrites the visible text of a page by
//! replacing dictionary terms with their counterparts, keeping the case shape
//! of each occurrence, and keeps rewriting as the page changes.
//!
//! # Architecture
//!
//! ## Engine (`replacer`)
//! - `dictionary.rs` - Dictionary: merged term pairs, first source wins per key
//! - `pattern.rs` - CompiledMatcher: one case-insensitive whole-word matcher
//! - `casing.rs` - Case preservation for replacements
//! - `classifier.rs` - Which text nodes are eligible for rewriting
//! - `walker.rs` - Full-document and subtree passes
//! - `watcher.rs` - Mutation batches and settings changes
//! - `gate.rs` - ActivationState: enabled flag + per-host disable list
//! - `config.rs` - EngineConfig / MatcherConfig
//!
//! ## Documents (`dom`)
//! - `tree.rs` - TextTree: the node-access interface the engine scans
//! - `virtual_dom.rs` - VirtualDocument: in-memory document with mutation records
//!
//! ## Browser (`web`)
//! - `document.rs` - WebDocument: TextTree over web-sys nodes
//! - `loader.rs` - Concurrent source fetches and settings read
//! - `runtime.rs` - ReplacerRuntime: launch, observer, message routing
//!
//! # Usage (WASM)
//! ```javascript,ignore
//! import init, { launch } from 'termswap';
//!
//! await init();
//!
//! const runtime = await launch(
//!   { dictionarySources: [chrome.runtime.getURL('src/wordmap.json')] },
//!   () => chrome.storage.sync.get({ enabled: true, disabledHosts: [] })
//! );
//!
//! chrome.runtime.onMessage.addListener((msg) => { runtime.onMessage(msg); });
//!
//! console.log(runtime.getStats());  // term count, initial pass, batches
//! ```

pub mod dom;
pub mod replacer;
pub mod web;

pub use dom::*;
pub use replacer::*;
pub use web::*;

use wasm_bindgen::prelude::*;

// When the `wee_alloc` feature is enabled, use `wee_alloc` as the global
// allocator for smaller WASM bundle size.
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    format!("termswap v{}", env!("CARGO_PKG_VERSION"))
}
