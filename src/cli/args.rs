// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::context::ContextScope;
use crate::llm::GenerationParameters;

/// ask-gemini - talk to Google Gemini from your terminal
#[derive(Parser, Debug)]
#[command(name = "ask-gemini")]
#[command(version, about = "Talk to Google Gemini from your terminal")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session (default when no command given)
    Chat(ChatArgs),

    /// Ask a single question
    Ask(AskArgs),

    /// Show or clear the conversation history
    History(HistoryArgs),

    /// Manage context prepended to every prompt
    Context(ContextArgs),

    /// List known models and their capabilities
    Models,
}

/// Sampling overrides shared by `ask` and `chat`
#[derive(clap::Args, Debug, Default, Clone)]
pub struct GenerationArgs {
    /// Sampling temperature (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Nucleus sampling probability (0.0-1.0)
    #[arg(long)]
    pub top_p: Option<f32>,

    /// Top-k sampling
    #[arg(long)]
    pub top_k: Option<u32>,

    /// Maximum tokens in the response
    #[arg(long)]
    pub max_output_tokens: Option<u32>,
}

impl GenerationArgs {
    pub fn to_parameters(&self) -> GenerationParameters {
        GenerationParameters {
            temperature: self.temperature,
            top_p: self.top_p,
            top_k: self.top_k,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

/// Arguments for the ask subcommand
#[derive(clap::Args, Debug, Default)]
pub struct AskArgs {
    /// The question or prompt
    #[arg(required = true, num_args = 1..)]
    pub prompt: Vec<String>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Include a text file in the prompt (repeatable)
    #[arg(short, long = "file")]
    pub files: Vec<PathBuf>,

    /// Send an image along with the prompt
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// Ask the model to generate an image
    #[arg(long)]
    pub generate_image: bool,

    /// Stream the response as it is generated
    #[arg(long)]
    pub stream: bool,

    /// Neither read nor record conversation history
    #[arg(long)]
    pub no_history: bool,

    /// Number of past turns to include
    #[arg(long)]
    pub history_window: Option<usize>,
}

impl AskArgs {
    /// The prompt words joined with spaces
    pub fn prompt_text(&self) -> String {
        self.prompt.join(" ")
    }
}

/// Arguments for the chat subcommand
#[derive(clap::Args, Debug, Default)]
pub struct ChatArgs {
    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Include a text file with every turn (repeatable)
    #[arg(short, long = "file")]
    pub files: Vec<PathBuf>,

    /// Number of past turns to include
    #[arg(long)]
    pub history_window: Option<usize>,
}

/// Arguments for history command
#[derive(clap::Args, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    pub command: HistoryCommands,
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// Show recent turns
    Show {
        /// Number of turns to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Delete all recorded turns
    Clear,
}

/// Arguments for context command
#[derive(clap::Args, Debug)]
pub struct ContextArgs {
    #[command(subcommand)]
    pub command: ContextCommands,
}

#[derive(Subcommand, Debug)]
pub enum ContextCommands {
    /// Print the stored context
    Show {
        #[arg(long, value_enum)]
        scope: Option<ScopeArg>,
    },

    /// Replace the stored context
    Set {
        /// Context text
        text: String,

        #[arg(long, value_enum, default_value = "local")]
        scope: ScopeArg,
    },

    /// Remove the stored context
    Clear {
        #[arg(long, value_enum, default_value = "local")]
        scope: ScopeArg,
    },
}

/// Context scope on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    General,
    Local,
}

impl From<ScopeArg> for ContextScope {
    fn from(scope: ScopeArg) -> Self {
        match scope {
            ScopeArg::General => ContextScope::General,
            ScopeArg::Local => ContextScope::Local,
        }
    }
}
