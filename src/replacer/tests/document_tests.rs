//! Full-pass scenarios over a VirtualDocument

use serde_json::json;

use crate::dom::tree::TextTree;
use crate::dom::virtual_dom::{NodeId, VirtualDocument};
use crate::replacer::config::MatcherConfig;
use crate::replacer::engine::Engine;
use crate::replacer::error::EngineError;
use crate::replacer::gate::ActivationState;

fn engine() -> Engine {
    Engine::from_sources(
        vec![
            Ok(json!([["cat", "dog"], ["foo", "bar"]])),
            Ok(json!([["Cat", "lion"], ["colour", "color"]])),
        ],
        &MatcherConfig::default(),
    )
}

/// A page with one prose paragraph and every kind of skip zone
fn page() -> (VirtualDocument, NodeId, Vec<NodeId>) {
    let (mut doc, body) = VirtualDocument::with_body();
    let p = doc.append_element(body, "p");
    let prose = doc.append_text(p, "The cat likes foo.");

    let mut skipped = Vec::new();
    for tag in ["script", "style", "noscript", "iframe", "textarea", "code", "pre", "kbd", "samp"] {
        let el = doc.append_element(body, tag);
        skipped.push(doc.append_text(el, "cat foo"));
    }
    let editor = doc.append_element(body, "div");
    doc.set_content_editable(editor, Some(true));
    let span = doc.append_element(editor, "span");
    skipped.push(doc.append_text(span, "cat foo"));

    doc.take_records();
    (doc, prose, skipped)
}

// ============================================================================
// Skip zones
// ============================================================================

#[test]
fn test_skip_zones_untouched() {
    let (mut doc, prose, skipped) = page();

    engine().apply_now(&mut doc, &ActivationState::new("example.com"));

    assert_eq!(doc.text(&prose).unwrap(), "The dog likes bar.");
    for node in skipped {
        assert_eq!(doc.text(&node).unwrap(), "cat foo");
    }
}

#[test]
fn test_merge_precedence_in_document() {
    let (mut doc, body) = VirtualDocument::with_body();
    let t = doc.append_text(body, "Cat");

    engine().replace_in_document(&mut doc);

    // "cat" from the first source wins over "Cat" -> "lion"
    assert_eq!(doc.text(&t).unwrap(), "Dog");
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_second_pass_is_noop() {
    let (mut doc, prose, _) = page();
    let e = engine();
    let gate = ActivationState::new("");

    let first = e.apply_now(&mut doc, &gate).unwrap();
    let snapshot = doc.text_content(doc.scan_root());
    doc.take_records();

    let second = e.apply_now(&mut doc, &gate).unwrap();

    assert_eq!(first.rewritten, 1);
    assert_eq!(second.rewritten, 0);
    assert_eq!(doc.text_content(doc.scan_root()), snapshot);
    assert_eq!(doc.text(&prose).unwrap(), "The dog likes bar.");
    assert!(doc.take_records().is_empty());
}

// ============================================================================
// Deactivation
// ============================================================================

#[test]
fn test_globally_disabled_touches_nothing() {
    let (mut doc, prose, _) = page();
    let gate = ActivationState::from_settings("example.com", &json!({ "enabled": false }));

    assert!(engine().apply_now(&mut doc, &gate).is_none());
    assert_eq!(doc.text(&prose).unwrap(), "The cat likes foo.");
}

#[test]
fn test_host_disabled_touches_nothing() {
    let (mut doc, prose, _) = page();
    let gate = ActivationState::from_settings(
        "example.com",
        &json!({ "enabled": true, "disabledHosts": ["example.com"] }),
    );

    assert!(engine().apply_now(&mut doc, &gate).is_none());
    assert_eq!(doc.text(&prose).unwrap(), "The cat likes foo.");
}

// ============================================================================
// Empty dictionary
// ============================================================================

#[test]
fn test_all_sources_failed() {
    let (mut doc, prose, _) = page();
    let e = Engine::from_sources(
        vec![
            Err(EngineError::SourceFetch {
                location: "src/wordmap.json".to_string(),
                message: "404".to_string(),
            }),
            Ok(json!([["too-short"]])),
        ],
        &MatcherConfig::default(),
    );

    assert!(!e.is_ready());
    assert!(e.matcher().is_none());
    assert!(e.apply_now(&mut doc, &ActivationState::new("")).is_none());
    assert_eq!(doc.text(&prose).unwrap(), "The cat likes foo.");
}

#[test]
fn test_document_without_root_element() {
    let mut doc = VirtualDocument::new();
    let stray = doc.append_text(NodeId::DOCUMENT, "cat");

    let stats = engine().replace_in_document(&mut doc);

    // no parent element, so not eligible
    assert_eq!(stats.visited, 0);
    assert_eq!(doc.text(&stray).unwrap(), "cat");
}
