// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for ask-gemini
//!
//! Every failure the request core can produce is surfaced to the caller as an
//! [`AskError`]. Nothing here is retried automatically.

use thiserror::Error;

/// Main error type for ask-gemini operations
#[derive(Error, Debug)]
pub enum AskError {
    /// Missing credential or invalid settings; no request is attempted
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing file, unreadable image, empty prompt
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network call failed
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The service refused the prompt or stopped the answer for safety reasons
    #[error("Blocked by the service: {reason}")]
    ServiceBlocked {
        reason: String,
        partial_text: Option<String>,
    },

    /// A nominally successful response did not have the expected shape
    #[error("Unexpected response: {0}")]
    ResponseShape(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of a single call to the remote service
#[derive(Error, Debug)]
pub enum TransportError {
    /// Could not reach the service
    #[error("could not connect to {url}: {message}")]
    Connectivity { url: String, message: String },

    /// No answer within the per-call timeout
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// The service answered with a 4xx/5xx status
    #[error("API request failed with HTTP status code {status}: {message}")]
    Http { status: u16, message: String },

    /// The chunk stream broke or carried undecodable data
    #[error("streaming error: {0}")]
    Stream(String),

    /// Anything not matching the above
    #[error("unexpected error while calling the Gemini API: {0}")]
    Other(String),
}

/// Result type alias for ask-gemini operations
pub type Result<T> = std::result::Result<T, AskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = AskError::Config("GEMINI_API_KEY is not set".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: GEMINI_API_KEY is not set"
        );
    }

    #[test]
    fn test_invalid_input_display() {
        let err = AskError::InvalidInput("empty prompt".to_string());
        assert!(err.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_service_blocked_display() {
        let err = AskError::ServiceBlocked {
            reason: "SAFETY".to_string(),
            partial_text: None,
        };
        assert_eq!(err.to_string(), "Blocked by the service: SAFETY");
    }

    #[test]
    fn test_transport_http_display() {
        let err = TransportError::Http {
            status: 400,
            message: "API key not valid".to_string(),
        };
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_transport_timeout_display() {
        let err = TransportError::Timeout(60);
        assert_eq!(err.to_string(), "request timed out after 60 seconds");
    }

    #[test]
    fn test_from_transport_error() {
        let err: AskError = TransportError::Stream("closed".to_string()).into();
        assert!(matches!(err, AskError::Transport(TransportError::Stream(_))));
        assert!(err.to_string().starts_with("Transport error"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AskError = io_err.into();
        assert!(err.to_string().contains("IO error"));
    }
}
