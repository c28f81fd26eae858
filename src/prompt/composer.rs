// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Prompt composition
//!
//! Sections always appear in the same order: general context, local context,
//! conversation history, file content, then the user's prompt. The live request
//! goes last. Empty sections are left out entirely.

use crate::context::{ContextBlock, ContextScope};

pub const GENERAL_CONTEXT_LABEL: &str = "[General context]";
pub const LOCAL_CONTEXT_LABEL: &str = "[Local context]";
pub const HISTORY_LABEL: &str = "[Conversation history]";
pub const FILE_LABEL: &str = "[File content]";
pub const USER_PROMPT_LABEL: &str = "[User prompt]";

/// One earlier exchange, as shown to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PastTurn {
    pub prompt: String,
    pub response: String,
}

impl PastTurn {
    pub fn new(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
        }
    }
}

/// Merges the prompt fragments into one text payload
#[derive(Debug, Clone, Copy)]
pub struct PromptComposer {
    history_window: usize,
}

impl PromptComposer {
    /// `history_window` is the number of most recent turns to keep
    pub fn new(history_window: usize) -> Self {
        Self { history_window }
    }

    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Compose the outbound prompt text. Pure; performs no I/O.
    pub fn compose(
        &self,
        user_input: &str,
        context: &[ContextBlock],
        history: &[PastTurn],
        file_text: Option<&str>,
    ) -> String {
        let mut sections: Vec<String> = Vec::with_capacity(5);

        for (scope, label) in [
            (ContextScope::General, GENERAL_CONTEXT_LABEL),
            (ContextScope::Local, LOCAL_CONTEXT_LABEL),
        ] {
            if let Some(block) = context.iter().find(|b| b.scope == scope) {
                push_section(&mut sections, label, &block.text);
            }
        }

        let start = history.len().saturating_sub(self.history_window);
        let rendered_history = history[start..]
            .iter()
            .map(|turn| format!("user: {}\nmodel: {}", turn.prompt.trim(), turn.response.trim()))
            .collect::<Vec<_>>()
            .join("\n");
        push_section(&mut sections, HISTORY_LABEL, &rendered_history);

        if let Some(text) = file_text {
            push_section(&mut sections, FILE_LABEL, text);
        }

        push_section(&mut sections, USER_PROMPT_LABEL, user_input);

        sections.join("\n\n")
    }
}

fn push_section(sections: &mut Vec<String>, label: &str, body: &str) {
    let body = body.trim();
    if !body.is_empty() {
        sections.push(format!("{}\n{}", label, body));
    }
}
