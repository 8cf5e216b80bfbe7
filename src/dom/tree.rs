//! TextTree: the node-access seam between the engine and a document
//!
//! The engine only reads node kinds, text values, and parent element facts,
//! and only ever writes text values. Anything that can answer those
//! questions (the live browser DOM, an in-memory document) can be scanned.

use serde::{Deserialize, Serialize};

use crate::replacer::classifier::ElementInfo;

/// The node kinds the engine distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Text,
    Element,
    /// Documents, comments, doctypes, processing instructions
    Other,
}

/// One reported change, as delivered in a mutation batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRecord<N> {
    /// Nodes inserted somewhere under the observed root
    ChildList { added: Vec<N> },
    /// The value of an existing character-data node changed
    CharacterData { target: N },
    /// Anything else (attribute changes); ignored by the watcher
    Other,
}

/// Read/write access to a document's nodes
pub trait TextTree {
    type Node: Clone;

    fn kind(&self, node: &Self::Node) -> NodeKind;

    /// Text value of a text node (`None` for other kinds)
    fn text(&self, node: &Self::Node) -> Option<String>;

    /// Overwrite a text node's value in place
    fn set_text(&mut self, node: &Self::Node, text: &str);

    /// Facts about the node's parent, if the parent is an element
    fn parent_element(&self, node: &Self::Node) -> Option<ElementInfo>;

    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Root element, else body, else the document itself
    fn scan_root(&self) -> Self::Node;

    /// All text nodes strictly below `root`, in document order
    fn text_descendants(&self, root: &Self::Node) -> Vec<Self::Node> {
        let mut found = Vec::new();
        let mut stack: Vec<Self::Node> = self.children(root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            match self.kind(&node) {
                NodeKind::Text => found.push(node),
                _ => stack.extend(self.children(&node).into_iter().rev()),
            }
        }
        found
    }
}
