//! Full-document walker
//!
//! Enumerates eligible, non-blank text nodes under a root in document order
//! and rewrites each one whose substituted text differs. Node collection
//! finishes before any write, so rewriting cannot disturb the traversal.

use serde::{Deserialize, Serialize};

use crate::dom::tree::TextTree;
use crate::replacer::classifier::is_eligible;
use crate::replacer::engine::Engine;
use crate::replacer::gate::ActivationState;

/// Counters for one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalkStats {
    /// Eligible text nodes examined
    pub visited: usize,
    /// Nodes whose text was overwritten
    pub rewritten: usize,
    pub elapsed_us: u64,
}

impl WalkStats {
    pub fn merge(&mut self, other: WalkStats) {
        self.visited += other.visited;
        self.rewritten += other.rewritten;
        self.elapsed_us += other.elapsed_us;
    }
}

impl Engine {
    /// Substitute one text node in place if it is eligible.
    ///
    /// Returns true when the node was overwritten.
    pub fn replace_node<T: TextTree>(&self, tree: &mut T, node: &T::Node) -> bool {
        if !is_eligible(tree.parent_element(node).as_ref()) {
            return false;
        }
        self.rewrite(tree, node)
    }

    /// Rewrite without classifying; callers have already checked eligibility.
    fn rewrite<T: TextTree>(&self, tree: &mut T, node: &T::Node) -> bool {
        let Some(before) = tree.text(node) else {
            return false;
        };
        let after = self.replace_text(&before);
        if after == before {
            return false;
        }
        tree.set_text(node, &after);
        true
    }

    /// Walk every eligible non-blank text node below `root`.
    pub fn replace_in_subtree<T: TextTree>(&self, tree: &mut T, root: &T::Node) -> WalkStats {
        let started = instant::Instant::now();
        let mut stats = WalkStats::default();
        if !self.is_ready() {
            return stats;
        }

        let targets: Vec<T::Node> = tree
            .text_descendants(root)
            .into_iter()
            .filter(|node| {
                tree.text(node).is_some_and(|t| !t.trim().is_empty())
                    && is_eligible(tree.parent_element(node).as_ref())
            })
            .collect();

        for node in &targets {
            stats.visited += 1;
            if self.rewrite(tree, node) {
                stats.rewritten += 1;
            }
        }

        stats.elapsed_us = started.elapsed().as_micros() as u64;
        stats
    }

    /// One pass over the whole document from its scan root
    pub fn replace_in_document<T: TextTree>(&self, tree: &mut T) -> WalkStats {
        let root = tree.scan_root();
        self.replace_in_subtree(tree, &root)
    }

    /// Gated full pass: `None` when the gate is closed or the engine dormant.
    pub fn apply_now<T: TextTree>(&self, tree: &mut T, gate: &ActivationState) -> Option<WalkStats> {
        if !gate.is_active() || !self.is_ready() {
            return None;
        }
        Some(self.replace_in_document(tree))
    }
}
