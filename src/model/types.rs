//! Chat completions API wire types
//!
//! Structs that mirror the OpenAI-compatible chat completions JSON format.
//! Used to serialize requests and deserialize API responses into typed
//! Rust structs.

use serde::{Deserialize, Serialize};

/// Request body for the chat completions endpoint
#[derive(Serialize, Debug)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages to send
    pub messages: Vec<ChatMessage>,
    /// Optional response format (e.g. JSON mode)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// A single chat message
#[derive(Serialize, Clone, Debug)]
pub struct ChatMessage {
    /// Message role ("system" or "user")
    pub role: &'static str,
    /// Message content (plain text or multimodal parts)
    pub content: MessageContent,
}

impl ChatMessage {
    /// Build a system message with plain text content
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    /// Build a user message with plain text content
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    /// Build a user message from multimodal content parts
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(parts),
        }
    }
}

/// Message content: either a plain string or a list of typed parts
#[derive(Serialize, Clone, Debug)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text content
    Text(String),
    /// Multimodal content parts (text and images)
    Parts(Vec<ContentPart>),
}

/// A single multimodal content part
#[derive(Serialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// Text part
    Text {
        /// The text content
        text: String,
    },
    /// Image part referenced by URL (data URLs supported)
    ImageUrl {
        /// The image reference
        image_url: ImageUrl,
    },
}

/// Image reference for an image content part
#[derive(Serialize, Clone, Debug)]
pub struct ImageUrl {
    /// Image URL; inline images use a `data:` URL
    pub url: String,
}

/// Response format constraint for a request
#[derive(Serialize, Debug)]
pub struct ResponseFormat {
    /// Format type (e.g. "json_object")
    #[serde(rename = "type")]
    pub format_type: &'static str,
}

impl ResponseFormat {
    /// JSON mode: the model must reply with a single JSON object
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object",
        }
    }
}

/// Top-level chat completions response
#[derive(Deserialize, Debug)]
pub struct ChatResponse {
    /// List of completion choices from the model
    pub choices: Vec<Choice>,
}

/// A single completion choice
#[derive(Deserialize, Debug)]
pub struct Choice {
    /// The message produced by the model
    pub message: ResponseMessage,
    /// Why the model stopped generating (if reported)
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Message content of a completion choice
#[derive(Deserialize, Debug)]
pub struct ResponseMessage {
    /// The text content of the message
    #[serde(default)]
    pub content: Option<String>,
}
