//! Mutation watcher: incremental substitution driven by change batches
//!
//! The two handler entry points the host calls after launch:
//! - [`Engine::on_mutation_batch`] for each batch of DOM changes
//! - [`Engine::on_settings_changed`] when the stored settings change
//!
//! Work per batch is proportional to the batch, never to the document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dom::tree::{MutationRecord, NodeKind, TextTree};
use crate::replacer::engine::Engine;
use crate::replacer::error::EngineError;
use crate::replacer::gate::ActivationState;
use crate::replacer::walker::WalkStats;

/// What happened to one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// The whole batch was skipped (gate closed or engine dormant)
    pub ignored: bool,
    pub records: usize,
    /// Text nodes overwritten, including those inside added subtrees
    pub rewritten: usize,
}

impl Engine {
    /// Process one mutation batch synchronously.
    ///
    /// The gate is checked once for the whole batch. Added text nodes and
    /// changed text nodes are classified and rewritten; added elements get a
    /// subtree walk. Everything else is ignored.
    pub fn on_mutation_batch<T: TextTree>(
        &self,
        tree: &mut T,
        gate: &ActivationState,
        batch: &[MutationRecord<T::Node>],
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome {
            ignored: false,
            records: batch.len(),
            rewritten: 0,
        };
        if !gate.is_active() || !self.is_ready() {
            outcome.ignored = true;
            return outcome;
        }

        for record in batch {
            match record {
                MutationRecord::ChildList { added } => {
                    for node in added {
                        match tree.kind(node) {
                            NodeKind::Text => {
                                if self.replace_node(tree, node) {
                                    outcome.rewritten += 1;
                                }
                            }
                            NodeKind::Element => {
                                outcome.rewritten += self.replace_in_subtree(tree, node).rewritten;
                            }
                            NodeKind::Other => {}
                        }
                    }
                }
                MutationRecord::CharacterData { target } => {
                    if tree.kind(target) == NodeKind::Text && self.replace_node(tree, target) {
                        outcome.rewritten += 1;
                    }
                }
                MutationRecord::Other => {}
            }
        }
        outcome
    }

    /// Apply a settings re-read and, if the gate is open, run a full pass.
    ///
    /// A failed read keeps the previous gate state and touches nothing.
    pub fn on_settings_changed<T: TextTree>(
        &self,
        tree: &mut T,
        gate: &mut ActivationState,
        read: Result<Value, EngineError>,
    ) -> Result<Option<WalkStats>, EngineError> {
        gate.refresh(read)?;
        Ok(self.apply_now(tree, gate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::virtual_dom::VirtualDocument;
    use crate::replacer::config::MatcherConfig;
    use serde_json::json;

    fn engine() -> Engine {
        Engine::from_sources(vec![Ok(json!([["cat", "dog"]]))], &MatcherConfig::default())
    }

    #[test]
    fn test_added_text_node() {
        let (mut doc, body) = VirtualDocument::with_body();
        let t = doc.append_text(body, "a cat");
        let batch = doc.take_records();

        let outcome = engine().on_mutation_batch(&mut doc, &ActivationState::new("a.com"), &batch);

        assert_eq!(doc.text(&t).unwrap(), "a dog");
        assert_eq!(outcome.rewritten, 1);
        assert!(!outcome.ignored);
    }

    #[test]
    fn test_added_element_subtree() {
        let (mut doc, body) = VirtualDocument::with_body();
        let div = doc.create_element("div");
        let a = doc.append_text(div, "cat one");
        let pre = doc.append_element(div, "pre");
        let b = doc.append_text(pre, "cat two");
        doc.append_child(body, div);
        let batch = doc.take_records();
        assert_eq!(batch.len(), 1);

        let outcome = engine().on_mutation_batch(&mut doc, &ActivationState::new(""), &batch);

        assert_eq!(doc.text(&a).unwrap(), "dog one");
        assert_eq!(doc.text(&b).unwrap(), "cat two");
        assert_eq!(outcome.rewritten, 1);
    }

    #[test]
    fn test_character_data_change() {
        let (mut doc, body) = VirtualDocument::with_body();
        let t = doc.append_text(body, "quiet");
        doc.take_records();

        doc.set_text(&t, "loud cat");
        let batch = doc.take_records();
        engine().on_mutation_batch(&mut doc, &ActivationState::new(""), &batch);

        assert_eq!(doc.text(&t).unwrap(), "loud dog");
    }

    #[test]
    fn test_comment_ignored() {
        let (mut doc, body) = VirtualDocument::with_body();
        let c = doc.create_comment("cat");
        doc.append_child(body, c);
        let batch = doc.take_records();

        let outcome = engine().on_mutation_batch(&mut doc, &ActivationState::new(""), &batch);
        assert_eq!(doc.data(c), Some("cat"));
        assert_eq!(outcome.rewritten, 0);
    }

    #[test]
    fn test_inactive_batch_ignored_whole() {
        let (mut doc, body) = VirtualDocument::with_body();
        let t = doc.append_text(body, "cat");
        let batch = doc.take_records();
        let gate = ActivationState::from_settings("a.com", &json!({ "disabledHosts": ["a.com"] }));

        let outcome = engine().on_mutation_batch(&mut doc, &gate, &batch);

        assert!(outcome.ignored);
        assert_eq!(doc.text(&t).unwrap(), "cat");
    }

    #[test]
    fn test_settings_change_reenables_and_scans() {
        let (mut doc, body) = VirtualDocument::with_body();
        let t = doc.append_text(body, "cat");
        let mut gate = ActivationState::from_settings("a.com", &json!({ "enabled": false }));
        let e = engine();

        assert!(e.apply_now(&mut doc, &gate).is_none());
        let stats = e
            .on_settings_changed(&mut doc, &mut gate, Ok(json!({ "enabled": true })))
            .unwrap()
            .unwrap();

        assert_eq!(stats.rewritten, 1);
        assert_eq!(doc.text(&t).unwrap(), "dog");
    }

    #[test]
    fn test_settings_read_failure_keeps_gate() {
        let (mut doc, body) = VirtualDocument::with_body();
        let t = doc.append_text(body, "cat");
        let mut gate = ActivationState::from_settings("a.com", &json!({ "enabled": false }));

        let result = engine().on_settings_changed(
            &mut doc,
            &mut gate,
            Err(EngineError::SettingsRead("quota".to_string())),
        );

        assert!(result.is_err());
        assert!(!gate.is_active());
        assert_eq!(doc.text(&t).unwrap(), "cat");
    }
}
