// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io::{self, Write};
use std::path::Path;

use crossterm::{
    style::{Color, ResetColor, SetForegroundColor},
    ExecutableCommand,
};

use ask_gemini::chat::{ChatUi, TurnOutcome};
use ask_gemini::error::{AskError, Result};
use ask_gemini::llm::ResponseObserver;

/// Prints responses to stdout as they arrive
pub(super) struct TerminalUi {
    /// Shown before the first text of each response (chat mode)
    prefix: Option<&'static str>,
    started: bool,
    ends_with_newline: bool,
}

impl TerminalUi {
    pub(super) fn plain() -> Self {
        Self {
            prefix: None,
            started: false,
            ends_with_newline: true,
        }
    }

    pub(super) fn chat() -> Self {
        Self {
            prefix: Some("gemini"),
            ..Self::plain()
        }
    }

    fn begin_response(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        if let Some(prefix) = self.prefix {
            let mut stdout = io::stdout();
            stdout.execute(SetForegroundColor(Color::Cyan))?;
            print!("{}: ", prefix);
            stdout.execute(ResetColor)?;
        }
        Ok(())
    }

    /// Terminate the current response line, if any
    pub(super) fn finish_response(&mut self) -> Result<()> {
        if self.started && !self.ends_with_newline {
            println!();
        }
        self.started = false;
        self.ends_with_newline = true;
        io::stdout().flush()?;
        Ok(())
    }
}

impl ResponseObserver for TerminalUi {
    fn on_text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.begin_response()?;
        print!("{}", text);
        io::stdout().flush()?;
        self.ends_with_newline = text.ends_with('\n');
        Ok(())
    }

    fn on_artifact(&mut self, path: &Path) -> Result<()> {
        self.begin_response()?;
        if !self.ends_with_newline {
            println!();
        }
        let mut stdout = io::stdout();
        stdout.execute(SetForegroundColor(Color::Green))?;
        println!("Image saved to {}", path.display());
        stdout.execute(ResetColor)?;
        self.ends_with_newline = true;
        Ok(())
    }

    fn on_advisory(&mut self, message: &str) -> Result<()> {
        let mut stderr = io::stderr();
        stderr.execute(SetForegroundColor(Color::Yellow))?;
        eprintln!("Note: {}", message);
        stderr.execute(ResetColor)?;
        Ok(())
    }
}

impl ChatUi for TerminalUi {
    fn show_prompt(&mut self) -> Result<()> {
        let mut stdout = io::stdout();
        stdout.execute(SetForegroundColor(Color::Green))?;
        print!("you: ");
        stdout.execute(ResetColor)?;
        stdout.flush()?;
        Ok(())
    }

    fn on_turn_complete(&mut self, _outcome: &TurnOutcome) -> Result<()> {
        self.finish_response()?;
        println!();
        Ok(())
    }

    fn on_turn_error(&mut self, error: &AskError) -> Result<()> {
        self.finish_response()?;
        print_error(error)?;
        println!();
        Ok(())
    }
}

/// Print an error in red to stderr
pub(super) fn print_error(error: &AskError) -> Result<()> {
    let mut stderr = io::stderr();
    stderr.execute(SetForegroundColor(Color::Red))?;
    eprintln!("Error: {}", error);
    stderr.execute(ResetColor)?;
    Ok(())
}
