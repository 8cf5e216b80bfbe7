//! Activation gate: global on/off switch plus per-host disable list
//!
//! Settings live in the extension's storage as `{ enabled, disabledHosts }`.
//! The gate decodes that object leniently and is consulted before every
//! full pass and every mutation batch.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::replacer::error::EngineError;

/// Enabled flag and disabled hosts for the current page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationState {
    enabled: bool,
    disabled_hosts: HashSet<String>,
    /// `location.host` of the page (may include a port)
    host: String,
}

impl ActivationState {
    /// Enabled everywhere until settings say otherwise
    pub fn new(host: &str) -> Self {
        Self {
            enabled: true,
            disabled_hosts: HashSet::new(),
            host: host.to_string(),
        }
    }

    /// Build from a stored settings object
    pub fn from_settings(host: &str, settings: &Value) -> Self {
        let mut state = Self::new(host);
        state.apply_settings(settings);
        state
    }

    /// Replace the flags with a freshly read settings object.
    ///
    /// `enabled` is on unless stored as literal `false`. `disabledHosts` that
    /// is not a list counts as empty; only text entries are kept.
    pub fn apply_settings(&mut self, settings: &Value) {
        self.enabled = !matches!(settings.get("enabled"), Some(Value::Bool(false)));
        self.disabled_hosts = match settings.get("disabledHosts") {
            Some(Value::Array(hosts)) => hosts
                .iter()
                .filter_map(|h| h.as_str().map(str::to_string))
                .collect(),
            _ => HashSet::new(),
        };
    }

    /// Apply a settings re-read; a failed read keeps the previous state.
    pub fn refresh(&mut self, read: Result<Value, EngineError>) -> Result<(), EngineError> {
        let settings = read?;
        self.apply_settings(&settings);
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        if !self.enabled {
            return false;
        }
        self.host.is_empty() || !self.disabled_hosts.contains(&self.host)
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_host_disabled(&self, host: &str) -> bool {
        self.disabled_hosts.contains(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_active() {
        assert!(ActivationState::new("example.com").is_active());
        assert!(ActivationState::from_settings("example.com", &json!({})).is_active());
    }

    #[test]
    fn test_globally_disabled() {
        let state = ActivationState::from_settings("example.com", &json!({ "enabled": false }));
        assert!(!state.is_active());
    }

    #[test]
    fn test_only_literal_false_disables() {
        for value in [json!(null), json!(0), json!("false"), json!(true)] {
            let state = ActivationState::from_settings("a.com", &json!({ "enabled": value }));
            assert!(state.enabled());
        }
    }

    #[test]
    fn test_host_disabled() {
        let state = ActivationState::from_settings(
            "example.com",
            &json!({ "enabled": true, "disabledHosts": ["other.org", "example.com"] }),
        );
        assert!(!state.is_active());

        let other = ActivationState::from_settings("news.site", &json!({ "disabledHosts": ["example.com"] }));
        assert!(other.is_active());
    }

    #[test]
    fn test_host_compared_exactly() {
        // no www stripping, port is part of the host
        let settings = json!({ "disabledHosts": ["example.com"] });
        assert!(ActivationState::from_settings("www.example.com", &settings).is_active());
        assert!(ActivationState::from_settings("example.com:8080", &settings).is_active());
    }

    #[test]
    fn test_empty_host_skips_list() {
        let state = ActivationState::from_settings("", &json!({ "disabledHosts": [""] }));
        assert!(state.is_active());
    }

    #[test]
    fn test_malformed_host_list() {
        let state = ActivationState::from_settings("a.com", &json!({ "disabledHosts": "a.com" }));
        assert!(state.is_active());

        let state = ActivationState::from_settings("1", &json!({ "disabledHosts": [1, null, "b.com"] }));
        assert!(state.is_active());
        assert!(state.is_host_disabled("b.com"));
    }

    #[test]
    fn test_failed_refresh_keeps_state() {
        let mut state = ActivationState::from_settings("a.com", &json!({ "enabled": false }));

        let result = state.refresh(Err(EngineError::SettingsRead("storage unavailable".to_string())));
        assert!(result.is_err());
        assert!(!state.is_active());

        state.refresh(Ok(json!({ "enabled": true }))).unwrap();
        assert!(state.is_active());
    }
}
