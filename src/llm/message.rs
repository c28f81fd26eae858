// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Conversation turn types
//!
//! Domain view of the content parts exchanged with the service. Binary
//! payloads are held decoded here and base64-encoded only on the wire.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{AskError, Result};
use crate::llm::wire;

/// Role of the turn author
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// A single piece of turn content
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    /// Plain text
    Text(String),

    /// Bytes carried in the message itself
    InlineBinary { data: Vec<u8>, mime_type: String },

    /// Pointer to content stored elsewhere
    FileReference { uri: String, mime_type: String },

    /// The model asks for a function to be invoked
    FunctionCall {
        name: String,
        args: serde_json::Value,
    },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text(text.into())
    }

    /// Convert to the wire representation
    pub fn to_wire(&self) -> wire::Part {
        match self {
            ContentPart::Text(text) => wire::Part {
                text: Some(text.clone()),
                ..Default::default()
            },
            ContentPart::InlineBinary { data, mime_type } => wire::Part {
                inline_data: Some(wire::Blob {
                    mime_type: mime_type.clone(),
                    data: BASE64.encode(data),
                }),
                ..Default::default()
            },
            ContentPart::FileReference { uri, mime_type } => wire::Part {
                file_data: Some(wire::FileData {
                    mime_type: mime_type.clone(),
                    file_uri: uri.clone(),
                }),
                ..Default::default()
            },
            ContentPart::FunctionCall { name, args } => wire::Part {
                function_call: Some(wire::FunctionCall {
                    name: name.clone(),
                    args: args.clone(),
                }),
                ..Default::default()
            },
        }
    }

    /// Convert from the wire representation.
    ///
    /// Returns `Ok(None)` for part kinds this client does not handle (for
    /// example thought summaries or executable code). Undecodable base64 is a
    /// response shape error.
    pub fn from_wire(part: wire::Part) -> Result<Option<Self>> {
        if let Some(call) = part.function_call {
            return Ok(Some(ContentPart::FunctionCall {
                name: call.name,
                args: call.args,
            }));
        }
        if let Some(blob) = part.inline_data {
            let data = BASE64.decode(blob.data.as_bytes()).map_err(|e| {
                AskError::ResponseShape(format!(
                    "inline {} data is not valid base64: {}",
                    blob.mime_type, e
                ))
            })?;
            return Ok(Some(ContentPart::InlineBinary {
                data,
                mime_type: blob.mime_type,
            }));
        }
        if let Some(file) = part.file_data {
            return Ok(Some(ContentPart::FileReference {
                uri: file.file_uri,
                mime_type: file.mime_type,
            }));
        }
        Ok(part.text.map(ContentPart::Text))
    }
}

/// One side of an exchange. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    role: Role,
    parts: Vec<ContentPart>,
}

impl ConversationTurn {
    /// Create a turn; an empty part list is rejected
    pub fn new(role: Role, parts: Vec<ContentPart>) -> Result<Self> {
        if parts.is_empty() {
            return Err(AskError::InvalidInput(
                "a conversation turn needs at least one content part".to_string(),
            ));
        }
        Ok(Self { role, parts })
    }

    /// Single text part from the user
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![ContentPart::Text(text.into())],
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn parts(&self) -> &[ContentPart] {
        &self.parts
    }

    pub fn to_wire(&self) -> wire::Content {
        wire::Content {
            role: Some(self.role.as_str().to_string()),
            parts: self.parts.iter().map(ContentPart::to_wire).collect(),
        }
    }
}
