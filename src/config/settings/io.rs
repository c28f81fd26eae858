// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::{Path, PathBuf};

use crate::error::{AskError, Result};

use super::Settings;

impl Settings {
    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        Self::app_home().join("settings.json")
    }

    /// Load settings from the default path.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load settings from a specific path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content).map_err(|e| {
            AskError::Config(format!("invalid settings file {}: {}", path.display(), e))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Get the application home directory (~/.ask-gemini or $ASK_GEMINI_HOME).
    pub fn app_home() -> PathBuf {
        if let Ok(home) = std::env::var("ASK_GEMINI_HOME") {
            return PathBuf::from(home);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".ask-gemini")
    }

    /// Get the history file path.
    pub fn history_path() -> PathBuf {
        Self::app_home().join("history.json")
    }

    /// Get the general context file path.
    pub fn general_context_path() -> PathBuf {
        Self::app_home().join(".ask_context.general")
    }

    /// Get the local (per project) context file path.
    pub fn local_context_path() -> PathBuf {
        PathBuf::from(".ask_context.local")
    }

    /// Directory generated images are written to.
    pub fn artifact_dir(&self) -> PathBuf {
        self.defaults
            .artifact_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Ensure the application home exists.
    pub fn ensure_directories() -> Result<()> {
        std::fs::create_dir_all(Self::app_home())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&temp_dir.path().join("nope.json")).unwrap();
        assert_eq!(settings.gemini.timeout_secs, 60);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"gemini": {"timeout_secs": 10}, "defaults": {"model": "gemini-1.5-pro"}}"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.gemini.timeout_secs, 10);
        assert_eq!(settings.defaults.model.as_deref(), Some("gemini-1.5-pro"));
    }

    #[test]
    fn test_load_invalid_json_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, AskError::Config(_)));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, r#"{"generation": {"temperature": 7.5}}"#).unwrap();

        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_artifact_dir_default() {
        let settings = Settings::default();
        assert_eq!(settings.artifact_dir(), PathBuf::from("."));
    }
}
