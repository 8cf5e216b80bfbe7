//! VirtualDocument: arena-backed in-memory document
//!
//! A small DOM with the parts the engine touches: elements, text, comments,
//! inherited `contenteditable`, and a MutationObserver-like record queue.
//! Changes to nodes connected to the document are queued as
//! [`MutationRecord`]s and drained with [`VirtualDocument::take_records`].

use std::fmt;

use crate::dom::tree::{MutationRecord, NodeKind, TextTree};
use crate::replacer::classifier::ElementInfo;

/// Dense node handle (index into the arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const DOCUMENT: NodeId = NodeId(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Element {
        tag: String,
        /// `Some` when the attribute is set, `None` to inherit
        content_editable: Option<bool>,
    },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct VNode {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// In-memory document with mutation recording
#[derive(Debug, Clone)]
pub struct VirtualDocument {
    nodes: Vec<VNode>,
    records: Vec<MutationRecord<NodeId>>,
}

impl Default for VirtualDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualDocument {
    /// An empty document (no root element)
    pub fn new() -> Self {
        Self {
            nodes: vec![VNode {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
            records: Vec::new(),
        }
    }

    /// `<html><body></body></html>`; returns the document and its body
    pub fn with_body() -> (Self, NodeId) {
        let mut doc = Self::new();
        let html = doc.append_element(NodeId::DOCUMENT, "html");
        let body = doc.append_element(html, "body");
        doc.take_records();
        (doc, body)
    }

    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(VNode {
            data,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_string(),
            content_editable: None,
        })
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Comment(text.to_string()))
    }

    /// Move `child` under `parent` as its last child.
    ///
    /// Queues a child-list record when `parent` is connected.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(old) = self.nodes[child.index()].parent {
            self.nodes[old.index()].children.retain(|&c| c != child);
        }
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);

        if self.is_connected(parent) {
            self.records.push(MutationRecord::ChildList { added: vec![child] });
        }
    }

    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let el = self.create_element(tag);
        self.append_child(parent, el);
        el
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.create_text(text);
        self.append_child(parent, node);
        node
    }

    /// Set (`Some`) or clear (`None`) an element's `contenteditable` attribute
    pub fn set_content_editable(&mut self, element: NodeId, value: Option<bool>) {
        if let NodeData::Element { content_editable, .. } = &mut self.nodes[element.index()].data {
            *content_editable = value;
        }
        if self.is_connected(element) {
            self.records.push(MutationRecord::Other);
        }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == NodeId::DOCUMENT {
                return true;
            }
            current = self.nodes[id.index()].parent;
        }
        false
    }

    /// First element child of the document
    pub fn document_element(&self) -> Option<NodeId> {
        self.nodes[0]
            .children
            .iter()
            .copied()
            .find(|&c| matches!(self.nodes[c.index()].data, NodeData::Element { .. }))
    }

    /// The `<body>` child of the root element
    pub fn body(&self) -> Option<NodeId> {
        let html = self.document_element()?;
        self.nodes[html.index()].children.iter().copied().find(|&c| {
            matches!(&self.nodes[c.index()].data, NodeData::Element { tag, .. } if tag.eq_ignore_ascii_case("body"))
        })
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, node: NodeId) -> String {
        if let NodeData::Text(s) = &self.nodes[node.index()].data {
            return s.clone();
        }
        self.text_descendants(&node)
            .iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    /// Character data of a text or comment node
    pub fn data(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.index()].data {
            NodeData::Text(s) | NodeData::Comment(s) => Some(s),
            _ => None,
        }
    }

    /// Resolve `contenteditable` through ancestors
    fn is_editable(&self, element: NodeId) -> bool {
        let mut current = Some(element);
        while let Some(id) = current {
            match &self.nodes[id.index()].data {
                NodeData::Element { content_editable: Some(value), .. } => return *value,
                NodeData::Element { .. } => current = self.nodes[id.index()].parent,
                _ => return false,
            }
        }
        false
    }

    /// Drain queued mutation records (one batch)
    pub fn take_records(&mut self) -> Vec<MutationRecord<NodeId>> {
        std::mem::take(&mut self.records)
    }
}

// =============================================================================
// TextTree
// =============================================================================

impl TextTree for VirtualDocument {
    type Node = NodeId;

    fn kind(&self, node: &NodeId) -> NodeKind {
        match self.nodes[node.index()].data {
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Document | NodeData::Comment(_) => NodeKind::Other,
        }
    }

    fn text(&self, node: &NodeId) -> Option<String> {
        match &self.nodes[node.index()].data {
            NodeData::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn set_text(&mut self, node: &NodeId, text: &str) {
        let changed = match &mut self.nodes[node.index()].data {
            NodeData::Text(s) => {
                *s = text.to_string();
                true
            }
            _ => false,
        };
        if changed && self.is_connected(*node) {
            self.records.push(MutationRecord::CharacterData { target: *node });
        }
    }

    fn parent_element(&self, node: &NodeId) -> Option<ElementInfo> {
        let parent = self.nodes[node.index()].parent?;
        match &self.nodes[parent.index()].data {
            NodeData::Element { tag, .. } => Some(ElementInfo {
                tag: tag.clone(),
                content_editable: self.is_editable(parent),
            }),
            _ => None,
        }
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.nodes[node.index()].children.clone()
    }

    fn scan_root(&self) -> NodeId {
        self.document_element()
            .or_else(|| self.body())
            .unwrap_or(NodeId::DOCUMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_order() {
        let (mut doc, body) = VirtualDocument::with_body();
        let p = doc.append_element(body, "p");
        let a = doc.append_text(p, "one");
        let span = doc.append_element(p, "span");
        let b = doc.append_text(span, "two");
        let c = doc.append_text(body, "three");

        assert_eq!(doc.text_descendants(&doc.scan_root()), vec![a, b, c]);
        assert_eq!(doc.text_content(body), "onetwothree");
    }

    #[test]
    fn test_scan_root_fallback() {
        let doc = VirtualDocument::new();
        assert_eq!(doc.scan_root(), NodeId::DOCUMENT);

        let (doc, body) = VirtualDocument::with_body();
        assert_eq!(doc.body(), Some(body));
        assert_ne!(doc.scan_root(), NodeId::DOCUMENT);
    }

    #[test]
    fn test_records_only_when_connected() {
        let (mut doc, body) = VirtualDocument::with_body();

        let div = doc.create_element("div");
        let text = doc.append_text(div, "detached");
        doc.set_text(&text, "still detached");
        assert!(doc.take_records().is_empty());

        doc.append_child(body, div);
        doc.set_text(&text, "connected");
        assert_eq!(
            doc.take_records(),
            vec![
                MutationRecord::ChildList { added: vec![div] },
                MutationRecord::CharacterData { target: text },
            ]
        );
    }

    #[test]
    fn test_editable_inherited() {
        let (mut doc, body) = VirtualDocument::with_body();
        let editor = doc.append_element(body, "div");
        doc.set_content_editable(editor, Some(true));
        let inner = doc.append_element(editor, "b");
        let text = doc.append_text(inner, "x");
        let locked = doc.append_element(editor, "span");
        doc.set_content_editable(locked, Some(false));
        let locked_text = doc.append_text(locked, "y");

        assert!(doc.parent_element(&text).unwrap().content_editable);
        assert!(!doc.parent_element(&locked_text).unwrap().content_editable);
    }

    #[test]
    fn test_comments_are_not_text() {
        let (mut doc, body) = VirtualDocument::with_body();
        let comment = doc.create_comment("note");
        doc.append_child(body, comment);
        doc.take_records();

        assert_eq!(doc.text(&comment), None);
        doc.set_text(&comment, "changed");
        assert_eq!(doc.data(comment), Some("note"));
        assert!(doc.take_records().is_empty());
    }

    #[test]
    fn test_parent_element_of_document_child() {
        let mut doc = VirtualDocument::new();
        let text = doc.append_text(NodeId::DOCUMENT, "stray");
        assert!(doc.parent_element(&text).is_none());
    }
}
