//! Subtree classifier: which text nodes may be rewritten
//!
//! A text node is eligible only when its parent element holds prose. Script
//! and style containers, form controls, code-like containers, and editable
//! regions are left alone. Eligibility is decided fresh on every call.

use serde::{Deserialize, Serialize};

/// What the classifier needs to know about a text node's parent element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Tag name in any case (`"PRE"`, `"pre"`)
    pub tag: String,
    /// Whether the element is user-editable
    pub content_editable: bool,
}

impl ElementInfo {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            content_editable: false,
        }
    }

    pub fn editable(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            content_editable: true,
        }
    }
}

/// Tags whose text content is never prose
const SKIPPED_TAGS: &[&str] = &[
    // script / style containers
    "script", "style", "noscript", "iframe",
    // text controls
    "textarea", "input",
    // code-like containers
    "code", "pre", "kbd", "samp",
];

/// True when a tag is one of the skipped containers (case-insensitive)
pub fn is_skipped_tag(tag: &str) -> bool {
    SKIPPED_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
}

/// Decide whether a text node with this parent may be rewritten.
///
/// `None` means the node has no parent element (detached, or a direct child
/// of the document).
pub fn is_eligible(parent: Option<&ElementInfo>) -> bool {
    match parent {
        None => false,
        Some(el) => !is_skipped_tag(&el.tag) && !el.content_editable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prose_parents_eligible() {
        for tag in ["p", "DIV", "span", "li", "h1", "a", "td"] {
            assert!(is_eligible(Some(&ElementInfo::new(tag))), "{} should be eligible", tag);
        }
    }

    #[test]
    fn test_orphan_ineligible() {
        assert!(!is_eligible(None));
    }

    #[test]
    fn test_skipped_tags_any_case() {
        for tag in [
            "script", "STYLE", "NoScript", "iframe", "TEXTAREA", "input", "code", "PRE", "kbd", "Samp",
        ] {
            assert!(!is_eligible(Some(&ElementInfo::new(tag))), "{} should be skipped", tag);
        }
    }

    #[test]
    fn test_editable_parent_ineligible() {
        assert!(!is_eligible(Some(&ElementInfo::editable("div"))));
    }

    #[test]
    fn test_similar_names_not_skipped() {
        // prefix-only matches must not count
        assert!(is_eligible(Some(&ElementInfo::new("codex"))));
        assert!(is_eligible(Some(&ElementInfo::new("preview"))));
    }
}
