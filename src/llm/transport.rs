// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! HTTP transport to the Gemini API
//!
//! One network call per turn. Failures are classified into
//! [`TransportError`] variants and never retried.

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Duration;

use crate::error::{AskError, Result, TransportError};
use crate::llm::request::OutboundRequest;
use crate::llm::wire::{ErrorEnvelope, GenerateContentResponse};

/// Stream of response chunks
pub type ResponseStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// Something that can deliver a request to the generative service
#[async_trait]
pub trait GenerativeTransport: Send + Sync {
    /// Send and wait for the complete response
    async fn send(&self, request: &OutboundRequest) -> Result<GenerateContentResponse>;

    /// Send and receive the response as a sequence of chunks
    async fn send_stream(&self, request: &OutboundRequest) -> Result<ResponseStream>;
}

/// Gemini REST client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a client against `base_url` (e.g. `https://generativelanguage.googleapis.com/v1beta`)
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn endpoint(&self, model: &str, stream: bool) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        if stream {
            format!("{}/models/{}:streamGenerateContent", self.base_url, model)
        } else {
            format!("{}/models/{}:generateContent", self.base_url, model)
        }
    }

    async fn post(&self, url: &str, request: &OutboundRequest, stream: bool) -> Result<reqwest::Response> {
        let mut builder = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request.body);
        if stream {
            builder = builder.query(&[("alt", "sse")]);
        }

        tracing::debug!(url, model = %request.model, stream, "sending request");

        // The timeout bounds the wait for response headers; streamed bodies
        // get a per-chunk timeout instead.
        let response = tokio::time::timeout(self.timeout, builder.send())
            .await
            .map_err(|_| TransportError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| self.classify(e, url))?;

        let status = response.status();
        if !status.is_success() {
            let body = read_error_body(response.text(), self.timeout).await;
            tracing::warn!(status = status.as_u16(), "request rejected by the service");
            return Err(parse_error(status, &body).into());
        }

        Ok(response)
    }

    fn classify(&self, e: reqwest::Error, url: &str) -> AskError {
        let e = e.without_url();
        let err = if e.is_timeout() {
            TransportError::Timeout(self.timeout.as_secs())
        } else if e.is_connect() {
            TransportError::Connectivity {
                url: url.to_string(),
                message: e.to_string(),
            }
        } else {
            TransportError::Other(e.to_string())
        };
        err.into()
    }
}

#[async_trait]
impl GenerativeTransport for GeminiClient {
    async fn send(&self, request: &OutboundRequest) -> Result<GenerateContentResponse> {
        let url = self.endpoint(&request.model, false);
        let response = self.post(&url, request, false).await?;

        let body = tokio::time::timeout(self.timeout, response.text())
            .await
            .map_err(|_| TransportError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| self.classify(e, &url))?;

        serde_json::from_str(&body).map_err(|e| {
            AskError::ResponseShape(format!("response body is not a valid generateContent reply: {}", e))
        })
    }

    async fn send_stream(&self, request: &OutboundRequest) -> Result<ResponseStream> {
        let url = self.endpoint(&request.model, true);
        let response = self.post(&url, request, true).await?;

        let timeout = self.timeout;
        let bytes = Box::pin(response.bytes_stream());
        let pending: VecDeque<Result<GenerateContentResponse>> = VecDeque::new();
        let state = (bytes, SseDecoder::default(), pending, false);

        let chunks = futures::stream::unfold(
            state,
            move |(mut bytes, mut decoder, mut pending, mut done)| async move {
                loop {
                    if let Some(item) = pending.pop_front() {
                        return Some((item, (bytes, decoder, pending, done)));
                    }
                    if done {
                        return None;
                    }
                    match tokio::time::timeout(timeout, bytes.next()).await {
                        Err(_) => {
                            done = true;
                            pending.push_back(Err(TransportError::Timeout(timeout.as_secs()).into()));
                        }
                        Ok(None) => {
                            done = true;
                            pending.extend(decoder.finish().iter().map(|p| parse_chunk(p)));
                        }
                        Ok(Some(Err(e))) => {
                            done = true;
                            pending.push_back(Err(TransportError::Stream(e.without_url().to_string()).into()));
                        }
                        Ok(Some(Ok(data))) => {
                            pending.extend(decoder.push(&data).iter().map(|p| parse_chunk(p)));
                        }
                    }
                }
            },
        );

        Ok(Box::pin(chunks))
    }
}

/// Body of a rejected request, bounded by the call timeout. An unreadable
/// body is logged and replaced by an empty one so the status still surfaces.
async fn read_error_body<F>(body: F, timeout: Duration) -> String
where
    F: std::future::Future<Output = reqwest::Result<String>>,
{
    match tokio::time::timeout(timeout, body).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            tracing::warn!(error = %e.without_url(), "could not read error body");
            String::new()
        }
        Err(_) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "timed out reading error body");
            String::new()
        }
    }
}

/// Build an HTTP error, preferring the service's own message
fn parse_error(status: reqwest::StatusCode, body: &str) -> TransportError {
    let reason = status.canonical_reason().unwrap_or("Unknown status");
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("{}. API Error Message: {}", reason, envelope.error.message),
        Err(_) if body.trim().is_empty() => reason.to_string(),
        Err(_) => format!("{}. Full response: {}", reason, body.trim()),
    };
    TransportError::Http {
        status: status.as_u16(),
        message,
    }
}

fn parse_chunk(payload: &str) -> Result<GenerateContentResponse> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| TransportError::Stream(format!("malformed chunk: {}", e)))?;

    if let Some(message) = value.get("error").and_then(|e| e.get("message")).and_then(|m| m.as_str()) {
        return Err(TransportError::Stream(format!("service reported an error: {}", message)).into());
    }

    serde_json::from_value(value)
        .map_err(|e| AskError::ResponseShape(format!("chunk is not a valid generateContent reply: {}", e)))
}

/// Incremental server-sent-events decoder.
///
/// Buffers raw bytes so multi-byte characters split across network reads
/// are reassembled before decoding.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed bytes; returns the data payloads of every completed event
    pub fn push(&mut self, data: &[u8]) -> Vec<String> {
        self.buffer.extend(data.iter().copied().filter(|b| *b != b'\r'));

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.windows(2).position(|w| w == b"\n\n") {
            let event: Vec<u8> = self.buffer.drain(..pos + 2).collect();
            if let Some(payload) = event_payload(&event[..pos]) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush a trailing event that was not followed by a blank line
    pub fn finish(&mut self) -> Vec<String> {
        let event = std::mem::take(&mut self.buffer);
        event_payload(&event).into_iter().collect()
    }
}

fn event_payload(event: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(event);
    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();

    let payload = data.join("\n");
    if payload.trim().is_empty() || payload.trim() == "[DONE]" {
        None
    } else {
        Some(payload)
    }
}
