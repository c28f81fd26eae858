// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use crate::error::{AskError, Result};
use crate::llm::GenerationParameters;

use super::Settings;

impl Settings {
    /// Get the Gemini API key, checking the env var first.
    pub fn get_api_key(&self) -> Option<String> {
        // Priority: env var > config file.
        std::env::var(&self.gemini.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.gemini.api_key.clone())
    }

    /// Like [`Settings::get_api_key`], but a missing key is a configuration error.
    pub fn require_api_key(&self) -> Result<String> {
        self.get_api_key().ok_or_else(|| {
            AskError::Config(format!(
                "the {} environment variable is not set. Obtain an API key from the Gemini \
                 documentation and export it, e.g. export {}='YOUR_API_KEY'",
                self.gemini.api_key_env, self.gemini.api_key_env
            ))
        })
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.gemini.timeout_secs == 0 {
            return Err(AskError::Config(
                "gemini.timeout_secs must be at least 1".to_string(),
            ));
        }
        validate_generation(&self.generation)
    }
}

/// Check generation parameters against the ranges the service accepts.
pub fn validate_generation(params: &GenerationParameters) -> Result<()> {
    if let Some(t) = params.temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err(AskError::Config(format!(
                "temperature must be between 0 and 2, got {}",
                t
            )));
        }
    }
    if let Some(p) = params.top_p {
        if !(0.0..=1.0).contains(&p) {
            return Err(AskError::Config(format!(
                "top_p must be between 0 and 1, got {}",
                p
            )));
        }
    }
    if params.top_k == Some(0) {
        return Err(AskError::Config("top_k must be at least 1".to_string()));
    }
    if params.max_output_tokens == Some(0) {
        return Err(AskError::Config(
            "max_output_tokens must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_defaults_ok() {
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut settings = Settings::default();
        settings.gemini.timeout_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_generation_ranges() {
        let ok = GenerationParameters {
            temperature: Some(0.9),
            top_p: Some(1.0),
            top_k: Some(1),
            max_output_tokens: Some(2048),
        };
        assert!(validate_generation(&ok).is_ok());

        let hot = GenerationParameters {
            temperature: Some(2.5),
            ..Default::default()
        };
        assert!(validate_generation(&hot).is_err());

        let bad_p = GenerationParameters {
            top_p: Some(-0.1),
            ..Default::default()
        };
        assert!(validate_generation(&bad_p).is_err());

        let zero_k = GenerationParameters {
            top_k: Some(0),
            ..Default::default()
        };
        assert!(validate_generation(&zero_k).is_err());
    }

    #[test]
    fn test_api_key_from_config_when_env_missing() {
        let mut settings = Settings::default();
        settings.gemini.api_key_env = "ASK_GEMINI_TEST_UNSET_VAR_1".to_string();
        settings.gemini.api_key = Some("from-config".to_string());

        assert_eq!(settings.get_api_key().as_deref(), Some("from-config"));
    }

    #[test]
    fn test_require_api_key_missing() {
        let mut settings = Settings::default();
        settings.gemini.api_key_env = "ASK_GEMINI_TEST_UNSET_VAR_2".to_string();

        let err = settings.require_api_key().unwrap_err();
        assert!(matches!(err, AskError::Config(_)));
        assert!(err.to_string().contains("ASK_GEMINI_TEST_UNSET_VAR_2"));
    }
}
