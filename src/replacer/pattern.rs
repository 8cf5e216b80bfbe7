//! Pattern compiler: one alternation over every dictionary key
//!
//! Keys are matched as whole words: a match may not be preceded or followed
//! by a letter, digit, or underscore. The trailing boundary is part of the
//! compiled pattern; the `regex` crate has no look-behind, so the leading
//! boundary is checked against the character before each candidate.
//!
//! # Semantics
//! - Leftmost-first: at the leftmost viable position, the earliest-listed key
//!   wins (not the longest). Dictionary order is alternation order.
//! - When the preferred key at a position fails the trailing boundary, the
//!   automaton falls through to later keys at the same position.
//! - Two strategies: `UnicodeBoundary` (`\p{L}`, `\p{N}` and `_` are word
//!   characters, Unicode case folding) and `AsciiBoundary` (ASCII word chars,
//!   ASCII-only case folding, smaller automaton). Unicode is tried first;
//!   ASCII is the fallback.
//! - Combining marks (`\p{M}`) are not word characters, so a key may end just
//!   before a vowel sign in scripts such as Devanagari.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::ops::Range;

use crate::replacer::config::MatcherConfig;
use crate::replacer::dictionary::Dictionary;
use crate::replacer::error::EngineError;

// =============================================================================
// Types
// =============================================================================

/// How word boundaries and case folding are decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryStrategy {
    #[default]
    UnicodeBoundary,
    AsciiBoundary,
}

impl fmt::Display for BoundaryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnicodeBoundary => write!(f, "unicode-boundary"),
            Self::AsciiBoundary => write!(f, "ascii-boundary"),
        }
    }
}

impl BoundaryStrategy {
    /// Body of the word-character class, without brackets
    fn word_class(&self) -> &'static str {
        match self {
            Self::UnicodeBoundary => r"\p{L}\p{N}_",
            Self::AsciiBoundary => r"A-Za-z0-9_",
        }
    }
}

/// Compiled whole-word matcher over all dictionary keys
#[derive(Debug, Clone)]
pub struct CompiledMatcher {
    /// `(k1|k2|...)(?:[^word]|\z)`; group 1 is the key
    regex: Regex,
    /// A single word character, for the leading boundary
    word: Regex,
    strategy: BoundaryStrategy,
    term_count: usize,
}

// =============================================================================
// Compilation
// =============================================================================

impl CompiledMatcher {
    /// Compile with the configured strategy, falling back to ASCII if the
    /// Unicode pattern cannot be built.
    pub fn compile(dictionary: &Dictionary, config: &MatcherConfig) -> Result<Self, EngineError> {
        match config.boundary {
            BoundaryStrategy::UnicodeBoundary => {
                Self::with_strategy(dictionary, BoundaryStrategy::UnicodeBoundary, config.size_limit)
                    .or_else(|_| {
                        Self::with_strategy(dictionary, BoundaryStrategy::AsciiBoundary, config.size_limit)
                    })
            }
            BoundaryStrategy::AsciiBoundary => {
                Self::with_strategy(dictionary, BoundaryStrategy::AsciiBoundary, config.size_limit)
            }
        }
    }

    /// Compile with exactly one strategy (no fallback)
    pub fn with_strategy(
        dictionary: &Dictionary,
        strategy: BoundaryStrategy,
        size_limit: usize,
    ) -> Result<Self, EngineError> {
        if dictionary.is_empty() {
            return Err(EngineError::PatternCompile {
                strategy,
                message: "dictionary is empty".to_string(),
            });
        }

        let keys = dictionary.pairs().iter().map(|p| p.source.as_str());
        let (alternation, case_insensitive) = match strategy {
            BoundaryStrategy::UnicodeBoundary => {
                (keys.map(regex::escape).collect::<Vec<_>>().join("|"), true)
            }
            BoundaryStrategy::AsciiBoundary => {
                (keys.map(ascii_folded).collect::<Vec<_>>().join("|"), false)
            }
        };
        let pattern = format!(r"({})(?:[^{}]|\z)", alternation, strategy.word_class());

        let build = |pattern: &str, case_insensitive: bool| {
            RegexBuilder::new(pattern)
                .case_insensitive(case_insensitive)
                .size_limit(size_limit)
                .build()
                .map_err(|e| EngineError::PatternCompile {
                    strategy,
                    message: e.to_string(),
                })
        };
        let regex = build(&pattern, case_insensitive)?;
        let word = build(&format!(r"^[{}]$", strategy.word_class()), false)?;

        Ok(Self {
            regex,
            word,
            strategy,
            term_count: dictionary.len(),
        })
    }

    pub fn strategy(&self) -> BoundaryStrategy {
        self.strategy
    }

    pub fn term_count(&self) -> usize {
        self.term_count
    }
}

/// Escape a key with ASCII letters spelled as two-case classes.
fn ascii_folded(key: &str) -> String {
    let mut out = String::with_capacity(key.len() * 4);
    for c in key.chars() {
        if c.is_ascii_alphabetic() {
            out.push('[');
            out.push(c.to_ascii_lowercase());
            out.push(c.to_ascii_uppercase());
            out.push(']');
        } else {
            let mut buf = [0u8; 4];
            out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
        }
    }
    out
}

// =============================================================================
// Matching
// =============================================================================

impl CompiledMatcher {
    /// Iterate non-overlapping whole-word matches, left to right.
    pub fn find_iter<'m, 't>(&'m self, text: &'t str) -> Matches<'m, 't> {
        Matches {
            matcher: self,
            text,
            pos: 0,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find_iter(text).next().is_some()
    }

    /// Replace every match with `replacer(matched)`; borrows when nothing matched.
    pub fn replace_all<'t, F>(&self, text: &'t str, mut replacer: F) -> Cow<'t, str>
    where
        F: FnMut(&str) -> String,
    {
        let mut out = String::new();
        let mut last = 0;
        let mut replaced = false;
        for range in self.find_iter(text) {
            out.push_str(&text[last..range.start]);
            out.push_str(&replacer(&text[range.clone()]));
            last = range.end;
            replaced = true;
        }
        if !replaced {
            return Cow::Borrowed(text);
        }
        out.push_str(&text[last..]);
        Cow::Owned(out)
    }

    fn is_word_char(&self, c: char) -> bool {
        let mut buf = [0u8; 4];
        self.word.is_match(c.encode_utf8(&mut buf))
    }

    fn boundary_before(&self, text: &str, start: usize) -> bool {
        match text[..start].chars().next_back() {
            Some(c) => !self.is_word_char(c),
            None => true,
        }
    }
}

/// Iterator over whole-word match ranges (byte offsets)
pub struct Matches<'m, 't> {
    matcher: &'m CompiledMatcher,
    text: &'t str,
    pos: usize,
}

impl<'m, 't> Iterator for Matches<'m, 't> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos <= self.text.len() {
            let captures = self.matcher.regex.captures_at(self.text, self.pos)?;
            let key = captures.get(1)?;
            let start = key.start();

            if self.matcher.boundary_before(self.text, start) {
                // the trailing boundary char stays available to the next match
                self.pos = key.end();
                return Some(key.range());
            }

            self.pos = start
                + self.text[start..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);
        }
        None
    }
}

// =============================================================================
// Tests
// =============================================================================
