// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::PathBuf;

use clap::Parser;
use ask_gemini::cli::{
    Cli, Commands, ContextArgs, ContextCommands, HistoryArgs, HistoryCommands, ScopeArg,
};

#[test]
fn test_parse_chat_command() {
    let cli = Cli::try_parse_from(["ask-gemini", "chat"]).expect("Valid command parsing");
    assert!(matches!(cli.command, Some(Commands::Chat(_))));
}

#[test]
fn test_parse_chat_with_model_and_files() {
    let cli = Cli::try_parse_from([
        "ask-gemini",
        "chat",
        "-m",
        "gemini-1.5-pro",
        "-f",
        "notes.md",
        "--history-window",
        "0",
    ])
    .expect("Valid command parsing");

    if let Some(Commands::Chat(chat_args)) = cli.command {
        assert_eq!(chat_args.model.as_deref(), Some("gemini-1.5-pro"));
        assert_eq!(chat_args.files, vec![PathBuf::from("notes.md")]);
        assert_eq!(chat_args.history_window, Some(0));
        assert!(chat_args.generation.temperature.is_none());
    } else {
        panic!("Expected Chat command");
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "ask-gemini",
        "ask",
        "hello",
        "-vv",
        "--config",
        "/tmp/settings.json",
    ])
    .expect("Valid command parsing");

    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/settings.json")));
}

#[test]
fn test_ask_defaults() {
    let cli = Cli::try_parse_from(["ask-gemini", "ask", "hi"]).expect("Valid command parsing");
    let Some(Commands::Ask(args)) = cli.command else {
        panic!("Expected Ask command");
    };

    assert!(args.model.is_none());
    assert!(args.files.is_empty());
    assert!(args.image.is_none());
    assert!(!args.generate_image);
    assert!(!args.stream);
    assert!(!args.no_history);
    assert_eq!(args.generation.to_parameters(), Default::default());
}

#[test]
fn test_non_numeric_temperature_rejected() {
    assert!(Cli::try_parse_from(["ask-gemini", "ask", "--temperature", "warm", "hi"]).is_err());
}

#[test]
fn test_parse_models_command() {
    let cli = Cli::try_parse_from(["ask-gemini", "models"]).expect("Valid command parsing");
    assert!(matches!(cli.command, Some(Commands::Models)));
}

#[test]
fn test_parse_history_commands() {
    let cli = Cli::try_parse_from(["ask-gemini", "history", "show"]).expect("Valid command parsing");
    assert!(matches!(
        cli.command,
        Some(Commands::History(HistoryArgs {
            command: HistoryCommands::Show { limit: 10 }
        }))
    ));

    let cli = Cli::try_parse_from(["ask-gemini", "history", "clear"]).expect("Valid command parsing");
    assert!(matches!(
        cli.command,
        Some(Commands::History(HistoryArgs {
            command: HistoryCommands::Clear
        }))
    ));
}

#[test]
fn test_context_show_without_scope() {
    let cli = Cli::try_parse_from(["ask-gemini", "context", "show"]).expect("Valid command parsing");
    assert!(matches!(
        cli.command,
        Some(Commands::Context(ContextArgs {
            command: ContextCommands::Show { scope: None }
        }))
    ));
}

#[test]
fn test_context_clear_defaults_to_local() {
    let cli = Cli::try_parse_from(["ask-gemini", "context", "clear"]).expect("Valid command parsing");
    assert!(matches!(
        cli.command,
        Some(Commands::Context(ContextArgs {
            command: ContextCommands::Clear {
                scope: ScopeArg::Local
            }
        }))
    ));
}

#[test]
fn test_unknown_scope_rejected() {
    assert!(Cli::try_parse_from(["ask-gemini", "context", "clear", "--scope", "global"]).is_err());
}

#[test]
fn test_unknown_command_rejected() {
    assert!(Cli::try_parse_from(["ask-gemini", "summon"]).is_err());
}
