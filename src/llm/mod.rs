// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Gemini request and response handling
//!
//! Builds outbound requests, delivers them over a [`GenerativeTransport`],
//! and interprets what comes back.

pub mod artifacts;
pub mod interpreter;
pub mod message;
pub mod mock_transport;
pub mod request;
pub mod transport;
pub mod wire;

pub use artifacts::ArtifactWriter;
pub use interpreter::{
    FinishReason, InboundResult, NullObserver, ResponseEvent, ResponseInterpreter,
    ResponseObserver,
};
pub use message::{ContentPart, ConversationTurn, Role};
pub use request::{
    GenerationParameters, InputImage, ModelSubstitution, OutboundRequest, RequestBuilder,
    RequestInput, RequestShape,
};
pub use transport::{GeminiClient, GenerativeTransport, ResponseStream};
