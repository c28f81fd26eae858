// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use tempfile::TempDir;

use ask_gemini::config::{validate_generation, Settings};
use ask_gemini::context::{load_blocks, ContextScope, FileContextProvider};
use ask_gemini::error::AskError;
use ask_gemini::history::{HistoryRecord, HistoryStore};
use ask_gemini::llm::GenerationParameters;

#[test]
fn test_settings_api_key_priority() {
    // Use a custom env var name to avoid test pollution
    let mut settings = Settings::default();
    settings.gemini.api_key_env = "ASK_GEMINI_TEST_KEY_PRIORITY".to_string();
    settings.gemini.api_key = Some("config-key".to_string());

    std::env::remove_var("ASK_GEMINI_TEST_KEY_PRIORITY");
    assert_eq!(settings.get_api_key(), Some("config-key".to_string()));

    std::env::set_var("ASK_GEMINI_TEST_KEY_PRIORITY", "env-key");
    assert_eq!(settings.get_api_key(), Some("env-key".to_string()));
    std::env::remove_var("ASK_GEMINI_TEST_KEY_PRIORITY");
}

#[test]
fn test_missing_api_key_is_config_error() {
    let mut settings = Settings::default();
    settings.gemini.api_key_env = "ASK_GEMINI_TEST_KEY_MISSING".to_string();
    std::env::remove_var("ASK_GEMINI_TEST_KEY_MISSING");

    let err = settings.require_api_key().unwrap_err();
    assert!(matches!(err, AskError::Config(_)));
    assert!(err.to_string().contains("ASK_GEMINI_TEST_KEY_MISSING"));
}

#[test]
fn test_settings_file_overrides_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    std::fs::write(
        &path,
        r#"{
            "gemini": {"base_url": "http://localhost:8080", "timeout_secs": 10},
            "defaults": {"chat_model": "gemini-1.5-pro", "allow_model_substitution": false},
            "generation": {"temperature": 0.4, "top_k": 32}
        }"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();

    assert_eq!(settings.gemini.base_url, "http://localhost:8080");
    assert_eq!(settings.gemini.timeout_secs, 10);
    assert_eq!(settings.defaults.chat_model.as_deref(), Some("gemini-1.5-pro"));
    assert!(!settings.defaults.allow_model_substitution);
    assert_eq!(settings.defaults.history_window, 5);
    assert_eq!(settings.generation.temperature, Some(0.4));
    assert_eq!(settings.generation.top_k, Some(32));
}

#[test]
fn test_settings_out_of_range_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");
    std::fs::write(&path, r#"{"generation": {"top_p": 1.5}}"#).unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(matches!(err, AskError::Config(_)));
}

#[test]
fn test_validate_generation_ranges() {
    let ok = GenerationParameters {
        temperature: Some(2.0),
        top_p: Some(0.0),
        top_k: Some(1),
        max_output_tokens: Some(1),
    };
    assert!(validate_generation(&ok).is_ok());

    for bad in [
        GenerationParameters {
            temperature: Some(-0.1),
            ..Default::default()
        },
        GenerationParameters {
            top_k: Some(0),
            ..Default::default()
        },
        GenerationParameters {
            max_output_tokens: Some(0),
            ..Default::default()
        },
    ] {
        assert!(validate_generation(&bad).is_err(), "{:?} should fail", bad);
    }
}

#[test]
fn test_context_files_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let provider = FileContextProvider::with_paths(
        temp_dir.path().join("home/.ask_context.general"),
        temp_dir.path().join(".ask_context.local"),
    );

    assert!(load_blocks(&provider).unwrap().is_empty());

    provider.write(ContextScope::Local, "Project uses Rust.\n").unwrap();
    provider.write(ContextScope::General, "Answer briefly.").unwrap();

    let blocks = load_blocks(&provider).unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].scope, ContextScope::General);
    assert_eq!(blocks[1].text, "Project uses Rust.");

    assert!(provider.clear(ContextScope::General).unwrap());
    assert!(!provider.clear(ContextScope::General).unwrap());
    assert_eq!(load_blocks(&provider).unwrap().len(), 1);
}

#[test]
fn test_history_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");

    {
        let mut store = HistoryStore::open_at(&path).unwrap();
        for i in 0..3 {
            store
                .append_and_persist(HistoryRecord::new(
                    "gemini-pro",
                    format!("q{}", i),
                    format!("a{}", i),
                ))
                .unwrap();
        }
    }

    let store = HistoryStore::open_at(&path).unwrap();
    assert_eq!(store.len(), 3);
    let window = store.read_window(2);
    assert_eq!(window[0].prompt, "q1");
    assert_eq!(window[1].prompt, "q2");
}

#[test]
fn test_corrupt_history_starts_empty() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");
    std::fs::write(&path, "[{\"not\": \"a record\"").unwrap();

    let store = HistoryStore::open_at(&path).unwrap();
    assert!(store.is_empty());
}
