//! Engine: the immutable dictionary + matcher pair built once per page
//!
//! An engine without a matcher (empty dictionary, or no pattern could be
//! compiled) is dormant: every text passes through untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;

use crate::replacer::casing::preserve_case;
use crate::replacer::config::MatcherConfig;
use crate::replacer::dictionary::Dictionary;
use crate::replacer::error::EngineError;
use crate::replacer::pattern::{BoundaryStrategy, CompiledMatcher};

/// Summary for diagnostics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub term_count: usize,
    pub strategy: Option<BoundaryStrategy>,
    pub is_ready: bool,
}

/// Dictionary plus compiled matcher
#[derive(Debug, Clone)]
pub struct Engine {
    dictionary: Dictionary,
    matcher: Option<CompiledMatcher>,
    /// Why the matcher is missing, when compilation failed
    compile_error: Option<EngineError>,
}

impl Engine {
    /// Compile the matcher for a finished dictionary.
    ///
    /// An empty dictionary skips compilation entirely.
    pub fn new(dictionary: Dictionary, config: &MatcherConfig) -> Self {
        if dictionary.is_empty() {
            return Self {
                dictionary,
                matcher: None,
                compile_error: None,
            };
        }
        match CompiledMatcher::compile(&dictionary, config) {
            Ok(matcher) => Self {
                dictionary,
                matcher: Some(matcher),
                compile_error: None,
            },
            Err(e) => Self {
                dictionary,
                matcher: None,
                compile_error: Some(e),
            },
        }
    }

    /// Merge fetched source documents and compile
    pub fn from_sources<I>(sources: I, config: &MatcherConfig) -> Self
    where
        I: IntoIterator<Item = Result<Value, EngineError>>,
    {
        Self::new(Dictionary::from_sources(sources), config)
    }

    /// True when a matcher exists and substitution can happen
    pub fn is_ready(&self) -> bool {
        self.matcher.is_some()
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn matcher(&self) -> Option<&CompiledMatcher> {
        self.matcher.as_ref()
    }

    pub fn compile_error(&self) -> Option<&EngineError> {
        self.compile_error.as_ref()
    }

    /// Substitute every whole-word dictionary term in `text`.
    ///
    /// Borrows the input when nothing changed.
    pub fn replace_text<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.matcher {
            Some(matcher) => matcher.replace_all(text, |m| self.replacement_for(m)),
            None => Cow::Borrowed(text),
        }
    }

    /// Case-shaped target for one matched literal; unknown literals pass through.
    pub fn replacement_for(&self, matched: &str) -> String {
        match self.dictionary.lookup(matched) {
            Some(pair) => preserve_case(matched, &pair.target),
            None => matched.to_string(),
        }
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            term_count: self.dictionary.len(),
            strategy: self.matcher.as_ref().map(|m| m.strategy()),
            is_ready: self.is_ready(),
        }
    }
}
