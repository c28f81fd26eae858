// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Request building and response interpretation wired through a mock transport.

use ask_gemini::error::{AskError, TransportError};
use ask_gemini::llm::mock_transport::{chunk, MockReply, MockTransport};
use ask_gemini::llm::{
    FinishReason, GenerationParameters, GenerativeTransport, NullObserver, RequestBuilder,
    RequestInput, RequestShape, ResponseInterpreter, ResponseObserver,
};
use ask_gemini::models::ModelCapabilityRegistry;
use tempfile::TempDir;

#[derive(Default)]
struct Collected {
    text: String,
    advisories: Vec<String>,
}

impl ResponseObserver for Collected {
    fn on_text(&mut self, text: &str) -> ask_gemini::error::Result<()> {
        self.text.push_str(text);
        Ok(())
    }

    fn on_advisory(&mut self, message: &str) -> ask_gemini::error::Result<()> {
        self.advisories.push(message.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn test_streamed_text_with_max_tokens_advisory() {
    let registry = ModelCapabilityRegistry::builtin();
    let request = RequestBuilder::new(&registry)
        .build(
            "gemini-pro",
            RequestInput::text("Write a haiku"),
            &GenerationParameters {
                max_output_tokens: Some(8),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(request.shape, RequestShape::Plain);
    assert_eq!(request.body.generation_config.max_output_tokens, Some(8));

    let transport = MockTransport::new().with_reply(MockReply::Chunks(vec![
        Ok(chunk("Autumn moonlight, ", None)),
        Ok(chunk("a worm digs", Some("MAX_TOKENS"))),
        // Never reached: the interpreter stops at the first terminal state.
        Ok(chunk("ignored", None)),
    ]));

    let dir = TempDir::new().unwrap();
    let stream = transport.send_stream(&request).await.unwrap();
    let mut observer = Collected::default();
    let result = ResponseInterpreter::new(dir.path(), "Write a haiku")
        .interpret_stream(stream, &mut observer)
        .await
        .unwrap();

    assert_eq!(result.text, "Autumn moonlight, a worm digs");
    assert_eq!(observer.text, result.text);
    assert_eq!(result.finish_reason, Some(FinishReason::MaxTokens));
    assert_eq!(observer.advisories.len(), 1);
    assert!(!result.blocked);
}

#[tokio::test]
async fn test_mid_stream_failure_surfaces_transport_error() {
    let registry = ModelCapabilityRegistry::builtin();
    let request = RequestBuilder::new(&registry)
        .build("gemini-pro", RequestInput::text("hi"), &GenerationParameters::default())
        .unwrap();

    let transport = MockTransport::new().with_reply(MockReply::Chunks(vec![
        Ok(chunk("partial", None)),
        Err(TransportError::Stream("connection reset".to_string()).into()),
    ]));

    let dir = TempDir::new().unwrap();
    let stream = transport.send_stream(&request).await.unwrap();
    let err = ResponseInterpreter::new(dir.path(), "hi")
        .interpret_stream(stream, &mut NullObserver)
        .await
        .unwrap_err();

    assert!(matches!(err, AskError::Transport(TransportError::Stream(_))));
}

#[tokio::test]
async fn test_safety_stop_without_text_is_blocked() {
    let dir = TempDir::new().unwrap();
    let result = ResponseInterpreter::new(dir.path(), "x")
        .interpret(chunk("", Some("SAFETY")), &mut NullObserver)
        .unwrap();

    assert!(result.blocked);
    assert_eq!(result.block_reason.as_deref(), Some("SAFETY"));
}

#[tokio::test]
async fn test_recorded_request_reflects_substitution() {
    let registry = ModelCapabilityRegistry::builtin();
    let request = RequestBuilder::new(&registry)
        .build(
            "gemini-pro",
            RequestInput {
                text: "",
                image: None,
                image_prompt: Some("a red bicycle"),
            },
            &GenerationParameters::default(),
        )
        .unwrap();

    assert_eq!(request.shape, RequestShape::ImageGeneration);
    let substitution = request.substitution.clone().unwrap();
    assert_eq!(substitution.from, "gemini-pro");
    assert_eq!(request.model, substitution.to);

    let transport = MockTransport::new().with_text("ok");
    transport.send(&request).await.unwrap();
    assert_eq!(transport.call_count(), 1);
    assert_eq!(transport.last_request().unwrap().model, request.model);
}

#[test]
fn test_substitution_disabled_rejects_request() {
    let registry = ModelCapabilityRegistry::builtin();
    let err = RequestBuilder::new(&registry)
        .allow_substitution(false)
        .build(
            "gemini-pro",
            RequestInput {
                text: "draw",
                image: None,
                image_prompt: Some("draw"),
            },
            &GenerationParameters::default(),
        )
        .unwrap_err();

    assert!(matches!(err, AskError::InvalidInput(_)));
}
