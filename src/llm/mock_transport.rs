// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock transport for testing
//!
//! Replays scripted replies in order and records every request, so turn
//! handling can be tested without network access.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{AskError, Result, TransportError};
use crate::llm::request::OutboundRequest;
use crate::llm::transport::{GenerativeTransport, ResponseStream};
use crate::llm::wire::{Candidate, Content, GenerateContentResponse, Part};

/// One scripted reply
#[derive(Debug)]
pub enum MockReply {
    /// Returned whole by `send`, or as a single chunk by `send_stream`
    Response(GenerateContentResponse),
    /// Chunks for `send_stream`; a failed item ends the stream
    Chunks(Vec<Result<GenerateContentResponse>>),
    /// The call itself fails
    Fail(TransportError),
}

/// A transport that never touches the network
#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    recorded_requests: Arc<Mutex<Vec<OutboundRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            tracing::warn!("Mock transport lock was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply
    pub fn with_reply(self, reply: MockReply) -> Self {
        lock(&self.replies).push_back(reply);
        self
    }

    /// Queue a single-text response ending with STOP
    pub fn with_text(self, text: &str) -> Self {
        self.with_reply(MockReply::Response(text_response(text)))
    }

    /// Queue a transport failure
    pub fn with_failure(self, error: TransportError) -> Self {
        self.with_reply(MockReply::Fail(error))
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        lock(&self.recorded_requests).len()
    }

    pub fn recorded_requests(&self) -> Vec<OutboundRequest> {
        lock(&self.recorded_requests).clone()
    }

    pub fn last_request(&self) -> Option<OutboundRequest> {
        lock(&self.recorded_requests).last().cloned()
    }

    fn next_reply(&self, request: &OutboundRequest) -> Result<MockReply> {
        lock(&self.recorded_requests).push(request.clone());
        lock(&self.replies).pop_front().ok_or_else(|| {
            AskError::Transport(TransportError::Other("no mock reply queued".to_string()))
        })
    }
}

#[async_trait]
impl GenerativeTransport for MockTransport {
    async fn send(&self, request: &OutboundRequest) -> Result<GenerateContentResponse> {
        match self.next_reply(request)? {
            MockReply::Response(response) => Ok(response),
            MockReply::Chunks(_) => Err(TransportError::Other(
                "chunked mock reply requested without streaming".to_string(),
            )
            .into()),
            MockReply::Fail(error) => Err(error.into()),
        }
    }

    async fn send_stream(&self, request: &OutboundRequest) -> Result<ResponseStream> {
        match self.next_reply(request)? {
            MockReply::Response(response) => Ok(Box::pin(futures::stream::iter(vec![Ok(response)]))),
            MockReply::Chunks(chunks) => Ok(Box::pin(futures::stream::iter(chunks))),
            MockReply::Fail(error) => Err(error.into()),
        }
    }
}

/// A complete response with one text part and a STOP finish
pub fn text_response(text: &str) -> GenerateContentResponse {
    chunk(text, Some("STOP"))
}

/// A response chunk. Empty text produces a candidate with no content.
pub fn chunk(text: &str, finish_reason: Option<&str>) -> GenerateContentResponse {
    let content = (!text.is_empty()).then(|| Content {
        role: Some("model".to_string()),
        parts: vec![Part {
            text: Some(text.to_string()),
            ..Default::default()
        }],
    });

    GenerateContentResponse {
        candidates: vec![Candidate {
            content,
            finish_reason: finish_reason.map(str::to_string),
        }],
        ..Default::default()
    }
}
