// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Outbound request construction
//!
//! Turns a composed prompt plus optional image input into a
//! `generateContent` body. The request shape is chosen from the inputs, and
//! the target model is checked against the capability the shape needs.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AskError, Result};
use crate::llm::message::{ContentPart, ConversationTurn, Role};
use crate::llm::wire::{
    FunctionCallingConfig, FunctionDeclaration, GenerateContentRequest, GenerationConfig,
    SafetySetting, Tool, ToolConfig,
};
use crate::models::{Capability, ModelCapabilityRegistry, ModelDescriptor};

/// Name of the function offered to image-generation models
pub const IMAGE_TOOL_NAME: &str = "generate_image";

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Sampling parameters. Absent values are left to the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub max_output_tokens: Option<u32>,
}

impl GenerationParameters {
    /// Values set in `overrides` replace ours
    pub fn merged_with(&self, overrides: &GenerationParameters) -> GenerationParameters {
        GenerationParameters {
            temperature: overrides.temperature.or(self.temperature),
            top_p: overrides.top_p.or(self.top_p),
            top_k: overrides.top_k.or(self.top_k),
            max_output_tokens: overrides.max_output_tokens.or(self.max_output_tokens),
        }
    }
}

impl From<&GenerationParameters> for GenerationConfig {
    fn from(params: &GenerationParameters) -> Self {
        GenerationConfig {
            temperature: params.temperature,
            top_p: params.top_p,
            top_k: params.top_k,
            max_output_tokens: params.max_output_tokens,
        }
    }
}

/// An image read from disk, ready to be sent inline
#[derive(Debug, Clone, PartialEq)]
pub struct InputImage {
    pub path: PathBuf,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl InputImage {
    /// Read an image file. The MIME type comes from the extension.
    pub fn load(path: &Path) -> Result<Self> {
        let mime_type = image_mime_type(path).ok_or_else(|| {
            AskError::InvalidInput(format!(
                "unsupported image type: {} (expected png, jpeg, webp, heic or heif)",
                path.display()
            ))
        })?;

        let data = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AskError::InvalidInput(format!("image file not found: {}", path.display()))
            } else {
                AskError::InvalidInput(format!(
                    "could not read image {}: {}",
                    path.display(),
                    e
                ))
            }
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            mime_type: mime_type.to_string(),
            data,
        })
    }

    fn to_part(&self) -> ContentPart {
        ContentPart::InlineBinary {
            data: self.data.clone(),
            mime_type: self.mime_type.clone(),
        }
    }
}

fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// Structure of the outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    /// One text part
    Plain,
    /// Inline image followed by text
    Multimodal,
    /// Text plus the image-generation function declaration
    ImageGeneration,
}

impl RequestShape {
    /// Image generation wins over image input, which wins over plain text
    pub fn select(has_image: bool, wants_image_generation: bool) -> Self {
        if wants_image_generation {
            RequestShape::ImageGeneration
        } else if has_image {
            RequestShape::Multimodal
        } else {
            RequestShape::Plain
        }
    }

    /// Capability the target model must have, if any beyond text
    pub fn required_capability(&self) -> Option<Capability> {
        match self {
            RequestShape::Plain => None,
            RequestShape::Multimodal => Some(Capability::Vision),
            RequestShape::ImageGeneration => Some(Capability::ImageGeneration),
        }
    }
}

/// Record of the model being swapped for one with the needed capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSubstitution {
    pub from: String,
    pub to: String,
    pub capability: Capability,
}

impl std::fmt::Display for ModelSubstitution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "model '{}' does not support {}; using '{}' instead",
            self.from, self.capability, self.to
        )
    }
}

/// A fully built request, ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub shape: RequestShape,
    /// Model the request will actually be sent to
    pub model: String,
    pub substitution: Option<ModelSubstitution>,
    pub body: GenerateContentRequest,
}

/// Inputs for one request
#[derive(Debug, Clone, Copy)]
pub struct RequestInput<'a> {
    /// Fully composed prompt text
    pub text: &'a str,
    pub image: Option<&'a InputImage>,
    /// Set when the user asked for an image to be generated
    pub image_prompt: Option<&'a str>,
}

impl<'a> RequestInput<'a> {
    pub fn text(text: &'a str) -> Self {
        Self {
            text,
            image: None,
            image_prompt: None,
        }
    }
}

/// Builds `generateContent` bodies
pub struct RequestBuilder<'r> {
    registry: &'r ModelCapabilityRegistry,
    allow_substitution: bool,
}

impl<'r> RequestBuilder<'r> {
    pub fn new(registry: &'r ModelCapabilityRegistry) -> Self {
        Self {
            registry,
            allow_substitution: true,
        }
    }

    /// When false, a model lacking a needed capability is an input error
    pub fn allow_substitution(mut self, allow: bool) -> Self {
        self.allow_substitution = allow;
        self
    }

    pub fn build(
        &self,
        model_id: &str,
        input: RequestInput<'_>,
        params: &GenerationParameters,
    ) -> Result<OutboundRequest> {
        let shape = RequestShape::select(input.image.is_some(), input.image_prompt.is_some());

        let text = match (input.text.trim().is_empty(), input.image_prompt) {
            (true, Some(image_prompt)) => image_prompt.trim(),
            _ => input.text,
        };
        if text.trim().is_empty() && input.image.is_none() {
            return Err(AskError::InvalidInput("the prompt is empty".to_string()));
        }

        let requested = self.registry.resolve(model_id);
        let (model, substitution) = self.choose_model(requested, shape, input.image.is_some())?;

        let mut parts = Vec::with_capacity(2);
        if let Some(image) = input.image {
            parts.push(image.to_part());
        }
        if !text.trim().is_empty() {
            parts.push(ContentPart::text(text));
        }
        let turn = ConversationTurn::new(Role::User, parts)?;

        let (tools, tool_config) = if shape == RequestShape::ImageGeneration {
            (Some(vec![image_generation_tool()]), Some(forced_tool_config()))
        } else {
            (None, None)
        };

        let body = GenerateContentRequest {
            contents: vec![turn.to_wire()],
            generation_config: GenerationConfig::from(params),
            safety_settings: safety_settings(),
            tools,
            tool_config,
        };

        tracing::debug!(
            model = %model.id,
            shape = ?shape,
            substituted = substitution.is_some(),
            "built request"
        );

        Ok(OutboundRequest {
            shape,
            model: model.id,
            substitution,
            body,
        })
    }

    fn choose_model(
        &self,
        requested: ModelDescriptor,
        shape: RequestShape,
        has_image: bool,
    ) -> Result<(ModelDescriptor, Option<ModelSubstitution>)> {
        let Some(primary) = shape.required_capability() else {
            return Ok((requested, None));
        };

        let mut needed = vec![primary];
        if has_image && primary != Capability::Vision {
            needed.push(Capability::Vision);
        }
        let satisfies = |m: &ModelDescriptor| needed.iter().all(|c| m.supports(*c));

        if satisfies(&requested) {
            return Ok((requested, None));
        }

        if !self.allow_substitution {
            return Err(AskError::InvalidInput(format!(
                "model '{}' does not support {}",
                requested.id, primary
            )));
        }

        let replacement = self.registry.default_for(primary);
        if !satisfies(&replacement) {
            return Err(AskError::InvalidInput(format!(
                "no known model supports {} for this request",
                primary
            )));
        }

        let substitution = ModelSubstitution {
            from: requested.id,
            to: replacement.id.clone(),
            capability: primary,
        };
        tracing::info!(%substitution, "substituting model");
        Ok((replacement, Some(substitution)))
    }
}

/// Fixed safety settings sent with every request
pub fn safety_settings() -> Vec<SafetySetting> {
    SAFETY_CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category: category.to_string(),
            threshold: SAFETY_THRESHOLD.to_string(),
        })
        .collect()
}

fn image_generation_tool() -> Tool {
    Tool {
        function_declarations: vec![FunctionDeclaration {
            name: IMAGE_TOOL_NAME.to_string(),
            description: "Generates an image from a text description.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "Detailed description of the image to generate."
                    }
                },
                "required": ["prompt"]
            }),
        }],
    }
}

fn forced_tool_config() -> ToolConfig {
    ToolConfig {
        function_calling_config: FunctionCallingConfig {
            mode: "ANY".to_string(),
            allowed_function_names: Some(vec![IMAGE_TOOL_NAME.to_string()]),
        },
    }
}
