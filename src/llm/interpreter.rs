// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Response interpretation
//!
//! Complete and streamed responses go through the same path: each chunk is
//! turned into [`ResponseEvent`]s, and the events drive a small state
//! machine that accumulates text, saves binary parts, and notices blocks.
//!
//! ```text
//! Accumulating --PromptBlocked / Safety finish with no output--> Blocked
//! Accumulating --other abnormal finish--> Completed
//! Accumulating --error--> Errored
//! ```

use futures::StreamExt;
use std::path::{Path, PathBuf};

use crate::error::{AskError, Result};
use crate::llm::artifacts::{slugify, ArtifactWriter};
use crate::llm::message::ContentPart;
use crate::llm::transport::ResponseStream;
use crate::llm::wire::GenerateContentResponse;

/// Why generation stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Normal,
    MaxTokens,
    Safety,
    Recitation,
    Other(String),
}

impl FinishReason {
    /// Map the service's finish reason. The unspecified value maps to `None`.
    pub fn from_wire(reason: &str) -> Option<Self> {
        let reason = match reason {
            "" | "FINISH_REASON_UNSPECIFIED" => return None,
            "STOP" => FinishReason::Normal,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" | "IMAGE_SAFETY" => {
                FinishReason::Safety
            }
            "RECITATION" => FinishReason::Recitation,
            other => FinishReason::Other(other.to_string()),
        };
        Some(reason)
    }

    pub fn is_normal(&self) -> bool {
        matches!(self, FinishReason::Normal)
    }
}

impl std::fmt::Display for FinishReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FinishReason::Normal => write!(f, "STOP"),
            FinishReason::MaxTokens => write!(f, "MAX_TOKENS"),
            FinishReason::Safety => write!(f, "SAFETY"),
            FinishReason::Recitation => write!(f, "RECITATION"),
            FinishReason::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// A unit of meaning extracted from a response chunk
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEvent {
    Part(ContentPart),
    Finish(FinishReason),
    PromptBlocked { reason: String },
}

/// Extract events from one chunk (or one complete response).
///
/// Only the first candidate is considered. A prompt block takes precedence
/// over any candidate content in the same chunk.
pub fn events_from_chunk(chunk: GenerateContentResponse) -> Result<Vec<ResponseEvent>> {
    if let Some(reason) = chunk
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.as_deref())
        .filter(|reason| *reason != "BLOCK_REASON_UNSPECIFIED")
    {
        return Ok(vec![ResponseEvent::PromptBlocked {
            reason: reason.to_string(),
        }]);
    }

    let has_metadata = chunk.prompt_feedback.is_some() || chunk.usage_metadata.is_some();
    let Some(candidate) = chunk.candidates.into_iter().next() else {
        if has_metadata {
            // Trailing usage/feedback chunk
            return Ok(Vec::new());
        }
        return Err(AskError::ResponseShape(
            "response contains no candidates".to_string(),
        ));
    };

    if candidate.content.is_none() && candidate.finish_reason.is_none() {
        return Err(AskError::ResponseShape(
            "candidate has neither content nor a finish reason".to_string(),
        ));
    }

    let mut events = Vec::new();
    if let Some(content) = candidate.content {
        for part in content.parts {
            match ContentPart::from_wire(part)? {
                Some(part) => events.push(ResponseEvent::Part(part)),
                None => tracing::debug!("skipping unsupported response part"),
            }
        }
    }
    if let Some(reason) = candidate.finish_reason.as_deref().and_then(FinishReason::from_wire) {
        events.push(ResponseEvent::Finish(reason));
    }
    Ok(events)
}

/// Interpreter lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterState {
    Accumulating,
    Completed,
    Blocked,
    Errored,
}

/// A function invocation requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCallRecord {
    pub name: String,
    pub args: serde_json::Value,
}

/// Outcome of interpreting one response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundResult {
    /// Model text, plus informational lines for function calls and file references
    pub text: String,
    /// Files written for inline binary parts, in arrival order
    pub artifacts: Vec<PathBuf>,
    pub function_calls: Vec<FunctionCallRecord>,
    pub finish_reason: Option<FinishReason>,
    pub blocked: bool,
    pub block_reason: Option<String>,
}

impl InboundResult {
    /// Text recorded in history for this response
    pub fn history_text(&self) -> String {
        let mut lines = Vec::new();
        if !self.text.trim().is_empty() {
            lines.push(self.text.trim().to_string());
        }
        for path in &self.artifacts {
            lines.push(format!("[saved image: {}]", path.display()));
        }
        lines.join("\n")
    }

    fn is_empty(&self) -> bool {
        self.text.is_empty() && self.artifacts.is_empty() && self.function_calls.is_empty()
    }
}

/// Receives output as soon as it is interpreted
pub trait ResponseObserver {
    fn on_text(&mut self, _text: &str) -> Result<()> {
        Ok(())
    }

    fn on_artifact(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }

    /// Non-fatal notices, such as an early stop
    fn on_advisory(&mut self, _message: &str) -> Result<()> {
        Ok(())
    }
}

/// Observer that ignores everything
#[derive(Debug, Default)]
pub struct NullObserver;

impl ResponseObserver for NullObserver {}

/// Turns response chunks into an [`InboundResult`]
pub struct ResponseInterpreter {
    artifacts: ArtifactWriter,
    slug: String,
    state: InterpreterState,
    result: InboundResult,
}

impl ResponseInterpreter {
    /// `prompt` names any saved artifacts
    pub fn new(artifact_dir: impl Into<PathBuf>, prompt: &str) -> Self {
        Self {
            artifacts: ArtifactWriter::new(artifact_dir),
            slug: slugify(prompt),
            state: InterpreterState::Accumulating,
            result: InboundResult::default(),
        }
    }

    pub fn state(&self) -> InterpreterState {
        self.state
    }

    /// Feed one chunk. Events after a terminal state are ignored.
    pub fn feed(
        &mut self,
        chunk: GenerateContentResponse,
        observer: &mut dyn ResponseObserver,
    ) -> Result<()> {
        if self.state != InterpreterState::Accumulating {
            return Ok(());
        }
        let events = events_from_chunk(chunk).map_err(|e| self.fail(e))?;
        for event in events {
            self.apply(event, observer).map_err(|e| self.fail(e))?;
            if self.state != InterpreterState::Accumulating {
                break;
            }
        }
        Ok(())
    }

    fn apply(&mut self, event: ResponseEvent, observer: &mut dyn ResponseObserver) -> Result<()> {
        match event {
            ResponseEvent::Part(ContentPart::Text(text)) => {
                self.result.text.push_str(&text);
                observer.on_text(&text)?;
            }
            ResponseEvent::Part(ContentPart::InlineBinary { data, mime_type })
                if mime_type.starts_with("image/") =>
            {
                let path = self.artifacts.save(&data, &mime_type, &self.slug)?;
                observer.on_artifact(&path)?;
                self.result.artifacts.push(path);
            }
            ResponseEvent::Part(ContentPart::InlineBinary { data, mime_type }) => {
                let note = format!("[inline data] {} ({} bytes, not saved)", mime_type, data.len());
                self.push_note(&note, observer)?;
            }
            ResponseEvent::Part(ContentPart::FileReference { uri, mime_type }) => {
                self.push_note(&format!("[file reference] {} ({})", uri, mime_type), observer)?;
            }
            ResponseEvent::Part(ContentPart::FunctionCall { name, args }) => {
                tracing::info!(function = %name, "model requested a function call");
                let note = format!("[function call] {}({}); no image was produced", name, args);
                self.push_note(&note, observer)?;
                self.result.function_calls.push(FunctionCallRecord { name, args });
            }
            ResponseEvent::Finish(reason) => self.finish_with(reason, observer)?,
            ResponseEvent::PromptBlocked { reason } => {
                tracing::warn!(%reason, "prompt blocked");
                self.result.blocked = true;
                self.result.block_reason = Some(reason);
                self.state = InterpreterState::Blocked;
            }
        }
        Ok(())
    }

    fn finish_with(&mut self, reason: FinishReason, observer: &mut dyn ResponseObserver) -> Result<()> {
        if reason.is_normal() {
            self.result.finish_reason = Some(reason);
            return Ok(());
        }

        tracing::warn!(%reason, "generation stopped early");
        // Saved images and function calls count as partial output too.
        if reason == FinishReason::Safety && self.result.is_empty() {
            self.result.blocked = true;
            self.result.block_reason = Some(reason.to_string());
            self.result.finish_reason = Some(reason);
            self.state = InterpreterState::Blocked;
            return Ok(());
        }

        observer.on_advisory(&format!("response stopped early: {}", reason))?;
        self.result.finish_reason = Some(reason);
        self.state = InterpreterState::Completed;
        Ok(())
    }

    fn push_note(&mut self, note: &str, observer: &mut dyn ResponseObserver) -> Result<()> {
        let line = if self.result.text.is_empty() || self.result.text.ends_with('\n') {
            format!("{}\n", note)
        } else {
            format!("\n{}\n", note)
        };
        self.result.text.push_str(&line);
        observer.on_text(&line)
    }

    fn fail(&mut self, err: AskError) -> AskError {
        self.state = InterpreterState::Errored;
        err
    }

    /// Close out the interpretation
    pub fn finish(self) -> Result<InboundResult> {
        match self.state {
            InterpreterState::Blocked => Ok(self.result),
            InterpreterState::Errored => Err(AskError::ResponseShape(
                "response interpretation already failed".to_string(),
            )),
            InterpreterState::Accumulating | InterpreterState::Completed => {
                if self.result.is_empty() {
                    return Err(AskError::ResponseShape(
                        "the response contained no text, image or function call".to_string(),
                    ));
                }
                Ok(self.result)
            }
        }
    }

    /// Interpret a complete response
    pub fn interpret(
        mut self,
        response: GenerateContentResponse,
        observer: &mut dyn ResponseObserver,
    ) -> Result<InboundResult> {
        self.feed(response, observer)?;
        self.finish()
    }

    /// Interpret a chunk stream, stopping at the first terminal state
    pub async fn interpret_stream(
        mut self,
        mut stream: ResponseStream,
        observer: &mut dyn ResponseObserver,
    ) -> Result<InboundResult> {
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.fail(e))?;
            self.feed(chunk, observer)?;
            if self.state != InterpreterState::Accumulating {
                break;
            }
        }
        self.finish()
    }
}
