// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for ask-gemini
//!
//! Handles loading settings from ~/.ask-gemini/settings.json

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::llm::GenerationParameters;

mod io;
mod validation;

pub use validation::validate_generation;

/// Main settings structure, stored in ~/.ask-gemini/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Gemini API connection settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Defaults applied to every session
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Sampling parameters; absent fields use the service defaults
    #[serde(default)]
    pub generation: GenerationParameters,
}

/// Gemini API connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL for the API (for proxies and tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Session defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Model for single prompts (registry text default when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Model for chat sessions (registry chat default when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_model: Option<String>,

    /// Number of past turns included in each prompt
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Switch to a capable model when the requested one cannot handle the input.
    /// When false such requests are rejected.
    #[serde(default = "default_true")]
    pub allow_model_substitution: bool,

    /// Where generated images are written (current directory when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_dir: Option<PathBuf>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            model: None,
            chat_model: None,
            history_window: default_history_window(),
            allow_model_substitution: true,
            artifact_dir: None,
        }
    }
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_history_window() -> usize {
    5
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.gemini.api_key_env, "GEMINI_API_KEY");
        assert_eq!(settings.gemini.timeout_secs, 60);
        assert!(settings.gemini.api_key.is_none());
        assert_eq!(settings.defaults.history_window, 5);
        assert!(settings.defaults.allow_model_substitution);
        assert!(settings.generation.temperature.is_none());
    }

    #[test]
    fn test_settings_partial_json_uses_defaults() {
        let json = r#"{"defaults": {"history_window": 2}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();

        assert_eq!(settings.defaults.history_window, 2);
        assert!(settings.defaults.allow_model_substitution);
        assert_eq!(
            settings.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn test_settings_generation_roundtrip() {
        let mut settings = Settings::default();
        settings.generation.temperature = Some(0.9);
        settings.generation.max_output_tokens = Some(2048);

        let json = serde_json::to_string(&settings).unwrap();
        let parsed: Settings = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.generation.temperature, Some(0.9));
        assert_eq!(parsed.generation.max_output_tokens, Some(2048));
        assert!(parsed.generation.top_k.is_none());
    }
}
