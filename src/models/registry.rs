// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Static model capability table
//!
//! Maps Gemini model identifiers to what they can accept and produce, and
//! names a default model per capability.

/// A model input/output modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Text in, text out
    Text,
    /// Accepts images as input
    Vision,
    /// Can produce images
    ImageGeneration,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Text => write!(f, "text"),
            Capability::Vision => write!(f, "vision"),
            Capability::ImageGeneration => write!(f, "image generation"),
        }
    }
}

/// Capabilities of one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Model identifier as used in the API path
    pub id: String,
    /// Whether the model accepts image input
    pub supports_vision: bool,
    /// Whether the model can produce images
    pub supports_image_generation: bool,
    /// Whether this is the default model for chat sessions
    pub is_chat_default: bool,
}

impl ModelDescriptor {
    fn new(id: &str, vision: bool, image_generation: bool, chat_default: bool) -> Self {
        Self {
            id: id.to_string(),
            supports_vision: vision,
            supports_image_generation: image_generation,
            is_chat_default: chat_default,
        }
    }

    /// Descriptor for an identifier missing from the table: text only.
    pub fn text_only(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            supports_vision: false,
            supports_image_generation: false,
            is_chat_default: false,
        }
    }

    /// Check a single capability
    pub fn supports(&self, capability: Capability) -> bool {
        match capability {
            Capability::Text => true,
            Capability::Vision => self.supports_vision,
            Capability::ImageGeneration => self.supports_image_generation,
        }
    }
}

pub const DEFAULT_TEXT_MODEL: &str = "gemini-pro";
pub const DEFAULT_VISION_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_IMAGE_GENERATION_MODEL: &str = "gemini-2.0-flash-exp-image-generation";

/// Read-only registry of known models
#[derive(Debug, Clone)]
pub struct ModelCapabilityRegistry {
    models: Vec<ModelDescriptor>,
}

impl Default for ModelCapabilityRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ModelCapabilityRegistry {
    /// The built-in Gemini model table
    pub fn builtin() -> Self {
        Self {
            models: vec![
                ModelDescriptor::new("gemini-pro", false, false, false),
                ModelDescriptor::new("gemini-pro-vision", true, false, false),
                ModelDescriptor::new("gemini-1.0-pro", false, false, false),
                ModelDescriptor::new("gemini-1.5-flash", true, false, true),
                ModelDescriptor::new("gemini-1.5-pro", true, false, false),
                ModelDescriptor::new("gemini-2.0-flash", true, false, false),
                ModelDescriptor::new("gemini-2.0-flash-exp-image-generation", true, true, false),
                ModelDescriptor::new("gemini-2.0-flash-preview-image-generation", true, true, false),
            ],
        }
    }

    /// All known models, in table order
    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    /// Look up a model by identifier
    pub fn get(&self, id: &str) -> Option<&ModelDescriptor> {
        let id = id.strip_prefix("models/").unwrap_or(id);
        self.models.iter().find(|m| m.id == id)
    }

    /// Look up a model, treating unknown identifiers as text-only
    pub fn resolve(&self, id: &str) -> ModelDescriptor {
        match self.get(id) {
            Some(model) => model.clone(),
            None => {
                tracing::warn!(model = id, "unknown model, assuming text-only capabilities");
                ModelDescriptor::text_only(id)
            }
        }
    }

    /// Default model for a capability
    pub fn default_for(&self, capability: Capability) -> ModelDescriptor {
        let id = match capability {
            Capability::Text => DEFAULT_TEXT_MODEL,
            Capability::Vision => DEFAULT_VISION_MODEL,
            Capability::ImageGeneration => DEFAULT_IMAGE_GENERATION_MODEL,
        };
        self.resolve(id)
    }

    /// Default model for chat sessions
    pub fn chat_default(&self) -> ModelDescriptor {
        self.models
            .iter()
            .find(|m| m.is_chat_default)
            .cloned()
            .unwrap_or_else(|| self.default_for(Capability::Text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_contains_defaults() {
        let registry = ModelCapabilityRegistry::builtin();
        assert!(registry.get(DEFAULT_TEXT_MODEL).is_some());
        assert!(registry.get(DEFAULT_VISION_MODEL).is_some());
        assert!(registry.get(DEFAULT_IMAGE_GENERATION_MODEL).is_some());
    }

    #[test]
    fn test_defaults_have_their_capability() {
        let registry = ModelCapabilityRegistry::builtin();
        for capability in [
            Capability::Text,
            Capability::Vision,
            Capability::ImageGeneration,
        ] {
            assert!(registry.default_for(capability).supports(capability));
        }
    }

    #[test]
    fn test_exactly_one_chat_default() {
        let registry = ModelCapabilityRegistry::builtin();
        let count = registry.models().iter().filter(|m| m.is_chat_default).count();
        assert_eq!(count, 1);
        assert_eq!(registry.chat_default().id, "gemini-1.5-flash");
    }

    #[test]
    fn test_gemini_pro_is_text_only() {
        let registry = ModelCapabilityRegistry::builtin();
        let model = registry.get("gemini-pro").unwrap();
        assert!(model.supports(Capability::Text));
        assert!(!model.supports(Capability::Vision));
        assert!(!model.supports(Capability::ImageGeneration));
    }

    #[test]
    fn test_get_accepts_models_prefix() {
        let registry = ModelCapabilityRegistry::builtin();
        assert_eq!(
            registry.get("models/gemini-1.5-pro").unwrap().id,
            "gemini-1.5-pro"
        );
    }

    #[test]
    fn test_resolve_unknown_is_text_only() {
        let registry = ModelCapabilityRegistry::builtin();
        let model = registry.resolve("my-tuned-model");
        assert_eq!(model.id, "my-tuned-model");
        assert!(!model.supports_vision);
        assert!(!model.supports_image_generation);
        assert!(!model.is_chat_default);
    }
}
