// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Interactive chat session
//!
//! Keeps the conversation in memory for the lifetime of the session and
//! appends every successful turn to the persistent history.

use std::io::BufRead;

use crate::chat::engine::{TurnEngine, TurnInput, TurnOutcome};
use crate::error::{AskError, Result};
use crate::history::{HistoryRecord, HistoryStore};
use crate::llm::ResponseObserver;
use crate::prompt::PastTurn;

/// Frontend hooks for the chat loop
pub trait ChatUi: ResponseObserver {
    /// Show the input prompt before a line is read
    fn show_prompt(&mut self) -> Result<()> {
        Ok(())
    }

    fn on_turn_complete(&mut self, _outcome: &TurnOutcome) -> Result<()> {
        Ok(())
    }

    /// A turn failed; the session continues
    fn on_turn_error(&mut self, _error: &AskError) -> Result<()> {
        Ok(())
    }
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatSummary {
    pub completed_turns: usize,
    pub failed_turns: usize,
}

/// State for one interactive session
pub struct ChatSession {
    engine: TurnEngine,
    history: HistoryStore,
    model: String,
    file_text: Option<String>,
    turns: Vec<PastTurn>,
}

impl ChatSession {
    /// Start a session. In-memory turns are seeded once from the persisted
    /// history window.
    pub fn new(engine: TurnEngine, history: HistoryStore, model: impl Into<String>) -> Self {
        let turns = history
            .read_window(engine.history_window())
            .iter()
            .map(PastTurn::from)
            .collect();

        Self {
            engine,
            history,
            model: model.into(),
            file_text: None,
            turns,
        }
    }

    /// Attach file content to every turn of this session
    pub fn with_file_text(mut self, file_text: Option<String>) -> Self {
        self.file_text = file_text;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Turns visible to the model, oldest first
    pub fn turns(&self) -> &[PastTurn] {
        &self.turns
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Run one turn. On failure neither memory nor history changes.
    pub async fn run_turn(
        &mut self,
        prompt: &str,
        observer: &mut dyn ResponseObserver,
    ) -> Result<TurnOutcome> {
        let input = TurnInput {
            prompt,
            file_text: self.file_text.as_deref(),
            ..Default::default()
        };
        let outcome = self
            .engine
            .run_turn(&self.model, input, &self.turns, observer)
            .await?;

        let response = outcome.result.history_text();
        self.history.append_and_persist(HistoryRecord::new(
            outcome.model.clone(),
            prompt,
            response.clone(),
        ))?;
        self.turns.push(PastTurn::new(prompt, response));

        Ok(outcome)
    }

    /// Read lines until EOF or `exit`/`quit`. Turn failures are reported and
    /// the loop continues; only UI errors end it early.
    pub async fn run<R: BufRead, U: ChatUi>(&mut self, input: R, ui: &mut U) -> Result<ChatSummary> {
        let mut summary = ChatSummary::default();
        let mut lines = input.lines();

        loop {
            ui.show_prompt()?;
            let Some(line) = lines.next() else {
                break;
            };
            let line = line?;
            let prompt = line.trim();

            if prompt.is_empty() {
                continue;
            }
            if is_exit_command(prompt) {
                break;
            }

            match self.run_turn(prompt, ui).await {
                Ok(outcome) => {
                    summary.completed_turns += 1;
                    ui.on_turn_complete(&outcome)?;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "chat turn failed");
                    summary.failed_turns += 1;
                    ui.on_turn_error(&e)?;
                }
            }
        }

        tracing::info!(
            completed = summary.completed_turns,
            failed = summary.failed_turns,
            "chat session ended"
        );
        Ok(summary)
    }
}

fn is_exit_command(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}
