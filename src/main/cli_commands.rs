// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use ask_gemini::chat::{run_single_shot, ChatSession, SingleShotRequest, TurnEngine};
use ask_gemini::cli::{
    AskArgs, ChatArgs, ContextArgs, ContextCommands, GenerationArgs, HistoryArgs, HistoryCommands,
};
use ask_gemini::config::{validate_generation, Settings};
use ask_gemini::context::{load_blocks, ContextProvider, ContextScope, FileContextProvider};
use ask_gemini::error::Result;
use ask_gemini::history::HistoryStore;
use ask_gemini::llm::{GeminiClient, InputImage, RequestShape};
use ask_gemini::models::{Capability, ModelCapabilityRegistry};
use ask_gemini::prompt::read_files_as_text;

use super::terminal::TerminalUi;

/// Engine wired to the Gemini API with settings, context and CLI overrides
fn build_engine(
    settings: &Settings,
    generation: &GenerationArgs,
    history_window: Option<usize>,
    stream: bool,
) -> Result<TurnEngine> {
    let api_key = settings.require_api_key()?;

    let params = settings.generation.merged_with(&generation.to_parameters());
    validate_generation(&params)?;

    let context = load_blocks(&FileContextProvider::new())?;
    let client = GeminiClient::new(
        api_key,
        settings.gemini.base_url.clone(),
        Duration::from_secs(settings.gemini.timeout_secs),
    );

    Ok(TurnEngine::new(Arc::new(client), settings.artifact_dir())
        .with_history_window(history_window.unwrap_or(settings.defaults.history_window))
        .with_context(context)
        .with_generation(params)
        .with_substitution(settings.defaults.allow_model_substitution)
        .with_streaming(stream))
}

pub(super) async fn run_ask(args: AskArgs, settings: Settings, verbose: u8) -> Result<()> {
    let prompt = args.prompt_text();
    let file_text = read_files_as_text(&args.files)?;
    let image = args.image.as_deref().map(InputImage::load).transpose()?;

    // With no model configured, start from the default for what the input needs
    // rather than substituting away from the text default.
    let registry = ModelCapabilityRegistry::builtin();
    let capability = RequestShape::select(image.is_some(), args.generate_image)
        .required_capability()
        .unwrap_or(Capability::Text);
    let model = args
        .model
        .clone()
        .or_else(|| settings.defaults.model.clone())
        .unwrap_or_else(|| registry.default_for(capability).id);

    if verbose > 0 {
        eprintln!("[verbose] model: {}, stream: {}", model, args.stream);
    }

    let engine = build_engine(&settings, &args.generation, args.history_window, args.stream)?;
    let mut history = HistoryStore::open()?;
    let request = SingleShotRequest {
        prompt,
        file_text,
        image,
        generate_image: args.generate_image,
        use_history: !args.no_history,
    };

    let mut ui = TerminalUi::plain();
    let outcome = run_single_shot(&engine, &mut history, &model, &request, &mut ui).await;
    ui.finish_response()?;
    outcome?;
    Ok(())
}

pub(super) async fn run_chat(args: ChatArgs, settings: Settings) -> Result<()> {
    let engine = build_engine(&settings, &args.generation, args.history_window, true)?;
    let model = args
        .model
        .clone()
        .or_else(|| settings.defaults.chat_model.clone())
        .unwrap_or_else(|| engine.registry().chat_default().id);
    let file_text = read_files_as_text(&args.files)?;

    let history = HistoryStore::open()?;
    let mut session = ChatSession::new(engine, history, model).with_file_text(file_text);

    print_welcome(session.model(), session.turns().len())?;

    let mut ui = TerminalUi::chat();
    let stdin = io::stdin();
    session.run(stdin.lock(), &mut ui).await?;

    println!("Goodbye!");
    Ok(())
}

fn print_welcome(model: &str, seeded_turns: usize) -> Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    println!("\nask-gemini chat ({})", model);
    stdout.execute(ResetColor)?;
    if seeded_turns > 0 {
        println!("Continuing with {} turn(s) from history.", seeded_turns);
    }
    println!("Type 'exit' or 'quit' to leave.\n");
    stdout.flush()?;
    Ok(())
}

pub(super) fn run_history_command(args: HistoryArgs) -> Result<()> {
    let mut store = HistoryStore::open()?;

    match args.command {
        HistoryCommands::Show { limit } => {
            let records = store.read_window(limit);
            if records.is_empty() {
                println!("\nNo history yet.\n");
                return Ok(());
            }

            println!("\nRecent turns ({} of {}):\n", records.len(), store.len());
            for record in records {
                let mut stdout = io::stdout();
                stdout.execute(SetForegroundColor(Color::DarkGrey))?;
                println!(
                    "[{}] {}",
                    record.timestamp.format("%Y-%m-%d %H:%M"),
                    record.model
                );
                stdout.execute(ResetColor)?;
                println!("you: {}", record.prompt);
                println!("gemini: {}\n", record.response);
            }
        }

        HistoryCommands::Clear => {
            let count = store.len();
            store.clear()?;
            println!("Cleared {} turn(s) from {}", count, store.path().display());
        }
    }

    Ok(())
}

pub(super) fn run_context_command(args: ContextArgs) -> Result<()> {
    let provider = FileContextProvider::new();

    match args.command {
        ContextCommands::Show { scope } => {
            let scopes = match scope {
                Some(scope) => vec![ContextScope::from(scope)],
                None => vec![ContextScope::General, ContextScope::Local],
            };
            for scope in scopes {
                let path = provider.path(scope).display().to_string();
                match provider.read(scope)? {
                    Some(text) => println!("[{}] {}\n{}\n", scope, path, text),
                    None => println!("[{}] {}\n(none)\n", scope, path),
                }
            }
        }

        ContextCommands::Set { text, scope } => {
            let scope = ContextScope::from(scope);
            provider.write(scope, &text)?;
            println!("Saved {} context to {}", scope, provider.path(scope).display());
        }

        ContextCommands::Clear { scope } => {
            let scope = ContextScope::from(scope);
            if provider.clear(scope)? {
                println!("Cleared {} context", scope);
            } else {
                println!("No {} context to clear", scope);
            }
        }
    }

    Ok(())
}

pub(super) fn run_models() {
    let registry = ModelCapabilityRegistry::builtin();

    println!("\nKnown models:\n");
    for model in registry.models() {
        let mut caps = vec!["text"];
        if model.supports_vision {
            caps.push("vision");
        }
        if model.supports_image_generation {
            caps.push("image generation");
        }
        let marker = if model.is_chat_default { " (chat default)" } else { "" };
        println!("  {:<45} {}{}", model.id, caps.join(", "), marker);
    }
    println!();
}
