// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! ask-gemini - a terminal client for the Google Gemini API.
//!
//! This crate exposes the request core used by the `ask-gemini` binary:
//! - `prompt`: composes context, history, file text and user input into one prompt
//! - `models`: static capability registry (text, vision, image generation)
//! - `llm`: wire types, request building, HTTP transport, response interpretation
//! - `chat`: the turn engine, single-shot driver and interactive chat session
//! - `context`, `history`: persisted context blocks and conversation log
//! - `config`, `cli`: settings file and command-line definitions

pub mod chat;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod history;
pub mod llm;
pub mod models;
pub mod prompt;

pub use error::{AskError, Result, TransportError};
