// termswap/src/replacer/config.rs
//
// Configuration types for the replacement engine

use serde::{Deserialize, Serialize};

use crate::replacer::error::EngineError;
use crate::replacer::pattern::BoundaryStrategy;

/// Default regex program size limit (16 MiB)
pub const DEFAULT_SIZE_LIMIT: usize = 16 * (1 << 20);

/// Message type broadcast when the stored settings change
pub const DEFAULT_SETTINGS_MESSAGE: &str = "JbSettingsChanged";

/// Dictionary files bundled with the extension
pub const DEFAULT_SOURCES: [&str; 2] = ["src/wordmap.json", "src/wordmapPL.json"];

/// Pattern compiler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatcherConfig {
    /// Preferred boundary strategy; Unicode falls back to ASCII on failure
    pub boundary: BoundaryStrategy,

    /// Compiled program size limit in bytes
    pub size_limit: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            boundary: BoundaryStrategy::UnicodeBoundary,
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

/// Engine configuration, passed in from the extension at launch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Dictionary locations, merged in this order (first definition wins)
    pub dictionary_sources: Vec<String>,

    /// `type` field of the broadcast that triggers a settings re-read
    pub settings_message_type: String,

    pub matcher: MatcherConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dictionary_sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            settings_message_type: DEFAULT_SETTINGS_MESSAGE.to_string(),
            matcher: MatcherConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.settings_message_type.trim().is_empty() {
            return Err(EngineError::InvalidConfig(
                "settingsMessageType must not be empty".to_string(),
            ));
        }
        if self.matcher.size_limit == 0 {
            return Err(EngineError::InvalidConfig(
                "matcher.sizeLimit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
