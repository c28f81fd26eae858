// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! ask-gemini - talk to Google Gemini from your terminal
//!
//! Entry point for the ask-gemini CLI application.

use clap::Parser;

use ask_gemini::cli::{ChatArgs, Cli, Commands};
use ask_gemini::config::Settings;
use ask_gemini::error::Result;

#[path = "main/cli_commands.rs"]
mod cli_commands;
#[path = "main/terminal.rs"]
mod terminal;

use cli_commands::{run_ask, run_chat, run_context_command, run_history_command, run_models};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG still takes precedence over -v.
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if cli.verbose > 0 {
        if let Ok(directive) = "ask_gemini=debug".parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        // Output errors from here are unreportable anyway.
        let _ = terminal::print_error(&e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    Settings::ensure_directories()?;

    match cli.command {
        None => run_chat(ChatArgs::default(), settings).await,
        Some(Commands::Chat(args)) => run_chat(args, settings).await,
        Some(Commands::Ask(args)) => run_ask(args, settings, cli.verbose).await,
        Some(Commands::History(args)) => run_history_command(args),
        Some(Commands::Context(args)) => run_context_command(args),
        Some(Commands::Models) => {
            run_models();
            Ok(())
        }
    }
}
