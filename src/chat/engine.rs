// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Single-turn orchestration shared by the chat loop and one-shot queries.
//!
//! A turn composes the prompt, builds the request, sends it once, and
//! interprets the reply. Nothing is retried.

use std::path::PathBuf;
use std::sync::Arc;

use crate::context::ContextBlock;
use crate::error::{AskError, Result};
use crate::llm::{
    GenerationParameters, GenerativeTransport, InboundResult, InputImage, ModelSubstitution,
    RequestBuilder, RequestInput, ResponseInterpreter, ResponseObserver,
};
use crate::models::ModelCapabilityRegistry;
use crate::prompt::{PastTurn, PromptComposer};

/// What the user supplied for one turn
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnInput<'a> {
    pub prompt: &'a str,
    /// Concatenated text of attached files
    pub file_text: Option<&'a str>,
    pub image: Option<&'a InputImage>,
    /// Ask the model to produce an image for `prompt`
    pub generate_image: bool,
}

impl<'a> TurnInput<'a> {
    pub fn text(prompt: &'a str) -> Self {
        Self {
            prompt,
            ..Default::default()
        }
    }
}

/// A successfully interpreted turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Model that actually answered
    pub model: String,
    pub substitution: Option<ModelSubstitution>,
    pub result: InboundResult,
}

/// Runs turns against one transport with fixed context and parameters
pub struct TurnEngine {
    transport: Arc<dyn GenerativeTransport>,
    registry: ModelCapabilityRegistry,
    composer: PromptComposer,
    context: Vec<ContextBlock>,
    generation: GenerationParameters,
    allow_substitution: bool,
    artifact_dir: PathBuf,
    stream: bool,
}

impl TurnEngine {
    pub fn new(transport: Arc<dyn GenerativeTransport>, artifact_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            registry: ModelCapabilityRegistry::builtin(),
            composer: PromptComposer::new(5),
            context: Vec::new(),
            generation: GenerationParameters::default(),
            allow_substitution: true,
            artifact_dir: artifact_dir.into(),
            stream: false,
        }
    }

    pub fn with_registry(mut self, registry: ModelCapabilityRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.composer = PromptComposer::new(window);
        self
    }

    pub fn with_context(mut self, context: Vec<ContextBlock>) -> Self {
        self.context = context;
        self
    }

    pub fn with_generation(mut self, generation: GenerationParameters) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_substitution(mut self, allow: bool) -> Self {
        self.allow_substitution = allow;
        self
    }

    /// Receive responses as a chunk stream instead of one body
    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn history_window(&self) -> usize {
        self.composer.history_window()
    }

    pub fn registry(&self) -> &ModelCapabilityRegistry {
        &self.registry
    }

    /// Run one turn.
    ///
    /// A blocked response is returned as [`AskError::ServiceBlocked`] so
    /// callers never mistake it for an answer.
    pub async fn run_turn(
        &self,
        model: &str,
        input: TurnInput<'_>,
        history: &[PastTurn],
        observer: &mut dyn ResponseObserver,
    ) -> Result<TurnOutcome> {
        // Context, history and files alone never make a request.
        if input.prompt.trim().is_empty() && input.image.is_none() {
            return Err(AskError::InvalidInput("the prompt is empty".to_string()));
        }

        let composed = self
            .composer
            .compose(input.prompt, &self.context, history, input.file_text);

        let request_input = RequestInput {
            text: &composed,
            image: input.image,
            image_prompt: input.generate_image.then_some(input.prompt),
        };
        let request = RequestBuilder::new(&self.registry)
            .allow_substitution(self.allow_substitution)
            .build(model, request_input, &self.generation)?;

        if let Some(substitution) = &request.substitution {
            observer.on_advisory(&substitution.to_string())?;
        }

        let interpreter = ResponseInterpreter::new(&self.artifact_dir, input.prompt);
        let result = if self.stream {
            let stream = self.transport.send_stream(&request).await?;
            interpreter.interpret_stream(stream, observer).await?
        } else {
            let response = self.transport.send(&request).await?;
            interpreter.interpret(response, observer)?
        };

        if result.blocked {
            let reason = result
                .block_reason
                .clone()
                .unwrap_or_else(|| "unspecified".to_string());
            let partial_text = (!result.text.is_empty()).then(|| result.text.clone());
            return Err(AskError::ServiceBlocked {
                reason,
                partial_text,
            });
        }

        tracing::debug!(
            model = %request.model,
            chars = result.text.len(),
            artifacts = result.artifacts.len(),
            "turn complete"
        );

        Ok(TurnOutcome {
            model: request.model,
            substitution: request.substitution,
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextScope;
    use crate::error::TransportError;
    use crate::llm::mock_transport::{chunk, MockReply, MockTransport};
    use crate::llm::NullObserver;
    use serde_json::json;
    use tempfile::TempDir;

    fn engine(transport: &MockTransport, dir: &TempDir) -> TurnEngine {
        TurnEngine::new(Arc::new(transport.clone()), dir.path())
    }

    fn first_text(transport: &MockTransport) -> String {
        let request = transport.last_request().unwrap();
        let body = serde_json::to_value(&request.body).unwrap();
        body["contents"][0]["parts"]
            .as_array()
            .unwrap()
            .last()
            .unwrap()["text"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_plain_turn() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().with_text("Paris");
        let engine = engine(&transport, &dir);

        let outcome = engine
            .run_turn("gemini-pro", TurnInput::text("Capital of France?"), &[], &mut NullObserver)
            .await
            .unwrap();

        assert_eq!(outcome.result.text, "Paris");
        assert_eq!(outcome.model, "gemini-pro");
        assert_eq!(first_text(&transport), "[User prompt]\nCapital of France?");
    }

    #[tokio::test]
    async fn test_context_and_history_in_prompt() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().with_text("ok");
        let engine = engine(&transport, &dir)
            .with_history_window(1)
            .with_context(vec![ContextBlock {
                scope: ContextScope::General,
                text: "Be brief.".to_string(),
            }]);

        let history = vec![PastTurn::new("old", "older"), PastTurn::new("q", "a")];
        engine
            .run_turn("gemini-pro", TurnInput::text("next"), &history, &mut NullObserver)
            .await
            .unwrap();

        assert_eq!(
            first_text(&transport),
            "[General context]\nBe brief.\n\n[Conversation history]\nuser: q\nmodel: a\n\n[User prompt]\nnext"
        );
    }

    #[tokio::test]
    async fn test_streamed_turn() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().with_reply(MockReply::Chunks(vec![
            Ok(chunk("Hello, ", None)),
            Ok(chunk("world.", Some("STOP"))),
        ]));
        let engine = engine(&transport, &dir).with_streaming(true);

        let outcome = engine
            .run_turn("gemini-pro", TurnInput::text("greet"), &[], &mut NullObserver)
            .await
            .unwrap();
        assert_eq!(outcome.result.text, "Hello, world.");
    }

    #[tokio::test]
    async fn test_blocked_turn_is_error() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().with_reply(MockReply::Response(
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap(),
        ));
        let engine = engine(&transport, &dir);

        let err = engine
            .run_turn("gemini-pro", TurnInput::text("bad"), &[], &mut NullObserver)
            .await
            .unwrap_err();

        match err {
            AskError::ServiceBlocked { reason, partial_text } => {
                assert_eq!(reason, "SAFETY");
                assert!(partial_text.is_none());
            }
            other => panic!("Expected ServiceBlocked, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().with_failure(TransportError::Timeout(60));
        let engine = engine(&transport, &dir);

        let err = engine
            .run_turn("gemini-pro", TurnInput::text("hi"), &[], &mut NullObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, AskError::Transport(TransportError::Timeout(60))));
    }

    #[tokio::test]
    async fn test_empty_prompt_never_sent() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new();
        let engine = engine(&transport, &dir);

        let err = engine
            .run_turn("gemini-pro", TurnInput::text("   "), &[], &mut NullObserver)
            .await
            .unwrap_err();

        assert!(matches!(err, AskError::InvalidInput(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_blank_prompt_with_context_and_files_never_sent() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().with_text("should not be used");
        let engine = engine(&transport, &dir).with_context(vec![ContextBlock {
            scope: ContextScope::General,
            text: "Be brief.".to_string(),
        }]);

        let input = TurnInput {
            prompt: "   ",
            file_text: Some("Content from file 'a.txt':\nhello"),
            ..Default::default()
        };
        let history = vec![PastTurn::new("q", "a")];
        let err = engine
            .run_turn("gemini-pro", input, &history, &mut NullObserver)
            .await
            .unwrap_err();

        assert!(matches!(err, AskError::InvalidInput(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_image_generation_substitutes_model() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::new().with_text("Here is a picture.");
        let engine = engine(&transport, &dir);

        let input = TurnInput {
            prompt: "a lighthouse",
            generate_image: true,
            ..Default::default()
        };
        let outcome = engine
            .run_turn("gemini-pro", input, &[], &mut NullObserver)
            .await
            .unwrap();

        assert_eq!(outcome.model, "gemini-2.0-flash-exp-image-generation");
        assert!(outcome.substitution.is_some());
        assert!(transport.last_request().unwrap().body.tools.is_some());
    }
}
