//! Dictionary: merged, deduplicated term pairs
//!
//! Sources are JSON documents holding rows of `[source, target, ...]`.
//! Rows are coerced to text, merged in source order, and deduplicated by the
//! lowercase source term. The first definition of a key wins.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::replacer::error::EngineError;

// =============================================================================
// Types
// =============================================================================

/// A single source → target mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermPair {
    pub source: String,
    pub target: String,
}

/// Ordered mapping from lowercase source term to its pair
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    /// Pairs in first-seen order (this is the alternation order)
    pairs: Vec<TermPair>,
    /// Lowercase source → index into `pairs`
    index: HashMap<String, usize>,
}

// =============================================================================
// Dictionary
// =============================================================================

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge fetched sources in order. A failed source contributes nothing.
    pub fn from_sources<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Result<Value, EngineError>>,
    {
        let mut dictionary = Self::new();
        for source in sources {
            if let Ok(value) = source {
                dictionary.extend_from_value(&value);
            }
        }
        dictionary
    }

    /// Append every valid row of one decoded source document.
    ///
    /// Returns the number of pairs that were actually added.
    pub fn extend_from_value(&mut self, value: &Value) -> usize {
        let Value::Array(rows) = value else {
            return 0;
        };
        let mut added = 0;
        for pair in rows.iter().filter_map(row_to_pair) {
            if self.insert(pair) {
                added += 1;
            }
        }
        added
    }

    /// Insert a pair unless its lowercase source is already defined.
    pub fn insert(&mut self, pair: TermPair) -> bool {
        let source = pair.source.trim();
        if source.is_empty() {
            return false;
        }
        let key = source.to_lowercase();
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key, self.pairs.len());
        self.pairs.push(TermPair {
            source: source.to_string(),
            target: pair.target,
        });
        true
    }

    /// Case-insensitive lookup of a matched literal
    pub fn lookup(&self, matched: &str) -> Option<&TermPair> {
        self.index
            .get(&matched.to_lowercase())
            .map(|&idx| &self.pairs[idx])
    }

    pub fn pairs(&self) -> &[TermPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Decode the raw text of one source document.
pub fn parse_source(location: &str, text: &str) -> Result<Value, EngineError> {
    serde_json::from_str(text).map_err(|e| EngineError::SourceParse {
        location: location.to_string(),
        message: e.to_string(),
    })
}

// =============================================================================
// Row coercion
// =============================================================================

/// Turn `[source, target, ...]` into a pair; anything shorter is discarded.
fn row_to_pair(row: &Value) -> Option<TermPair> {
    let Value::Array(cells) = row else {
        return None;
    };
    if cells.len() < 2 {
        return None;
    }
    let source = coerce_text(&cells[0]);
    if source.trim().is_empty() {
        return None;
    }
    Some(TermPair {
        source,
        target: coerce_text(&cells[1]),
    })
}

/// Stringify a JSON value the way a script runtime would.
fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 0.0 => "0".to_string(),
            // f64 Display: shortest round-trip digits, zero padded, no exponent
            Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{}", f),
            _ => n.to_string(),
        },
        Value::Array(items) => items.iter().map(coerce_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
