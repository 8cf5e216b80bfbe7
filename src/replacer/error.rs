//! Error types for the replacement engine.
//!
//! None of these are fatal: callers log them and continue with less
//! (a smaller dictionary, the ASCII pattern, the previous settings).

use crate::replacer::pattern::BoundaryStrategy;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    SourceFetch { location: String, message: String },
    SourceParse { location: String, message: String },
    PatternCompile { strategy: BoundaryStrategy, message: String },
    SettingsRead(String),
    InvalidConfig(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::SourceFetch { location, message } => {
                write!(f, "Failed to fetch dictionary source {}: {}", location, message)
            }
            EngineError::SourceParse { location, message } => {
                write!(f, "Failed to parse dictionary source {}: {}", location, message)
            }
            EngineError::PatternCompile { strategy, message } => {
                write!(f, "Failed to compile {} pattern: {}", strategy, message)
            }
            EngineError::SettingsRead(msg) => write!(f, "Failed to read settings: {}", msg),
            EngineError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}
