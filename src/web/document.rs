//! WebDocument: TextTree over the live browser DOM

use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Node};

use crate::dom::tree::{MutationRecord, NodeKind, TextTree};
use crate::replacer::classifier::ElementInfo;

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;

/// The page's document seen through the engine's node interface
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl TextTree for WebDocument {
    type Node = Node;

    fn kind(&self, node: &Node) -> NodeKind {
        match node.node_type() {
            Node::TEXT_NODE => NodeKind::Text,
            Node::ELEMENT_NODE => NodeKind::Element,
            _ => NodeKind::Other,
        }
    }

    fn text(&self, node: &Node) -> Option<String> {
        if node.node_type() != Node::TEXT_NODE {
            return None;
        }
        Some(node.node_value().unwrap_or_default())
    }

    fn set_text(&mut self, node: &Node, text: &str) {
        node.set_node_value(Some(text));
    }

    fn parent_element(&self, node: &Node) -> Option<ElementInfo> {
        let parent = node.parent_element()?;
        let content_editable = parent
            .dyn_ref::<HtmlElement>()
            .is_some_and(|el| el.is_content_editable());
        Some(ElementInfo {
            tag: parent.tag_name(),
            content_editable,
        })
    }

    fn children(&self, node: &Node) -> Vec<Node> {
        let list = node.child_nodes();
        (0..list.length()).filter_map(|i| list.item(i)).collect()
    }

    fn scan_root(&self) -> Node {
        self.document
            .document_element()
            .map(Node::from)
            .or_else(|| self.document.body().map(Node::from))
            .unwrap_or_else(|| self.document.clone().into())
    }

    /// Text nodes via a TreeWalker; manual walk if one cannot be created.
    fn text_descendants(&self, root: &Node) -> Vec<Node> {
        let Ok(walker) = self.document.create_tree_walker_with_what_to_show(root, SHOW_TEXT) else {
            return walk_text_nodes(self, root);
        };
        let mut found = Vec::new();
        while let Ok(Some(node)) = walker.next_node() {
            found.push(node);
        }
        found
    }
}

fn walk_text_nodes(tree: &WebDocument, root: &Node) -> Vec<Node> {
    let mut found = Vec::new();
    for child in tree.children(root) {
        match tree.kind(&child) {
            NodeKind::Text => found.push(child),
            _ => found.extend(walk_text_nodes(tree, &child)),
        }
    }
    found
}

/// Convert one observer record into the engine's record type
pub fn convert_record(record: &web_sys::MutationRecord) -> MutationRecord<Node> {
    match record.type_().as_str() {
        "childList" => {
            let list = record.added_nodes();
            MutationRecord::ChildList {
                added: (0..list.length()).filter_map(|i| list.item(i)).collect(),
            }
        }
        "characterData" => match record.target() {
            Some(target) => MutationRecord::CharacterData { target },
            None => MutationRecord::Other,
        },
        _ => MutationRecord::Other,
    }
}
