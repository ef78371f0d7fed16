//! Request body of the Gemini `generateContent` method.
//!
//! Only the subset this gateway sends is modelled. The response is never
//! modelled: it is relayed as an opaque `serde_json::Value`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MIME type requested for structured generation.
pub const JSON_MIME_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
}

impl GenerateContentRequest {
    /// A single user turn holding `text`.
    pub fn user_turn(text: String) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text }],
            }],
            generation_config: None,
        }
    }

    /// Ask for `application/json` output, constrained by `schema` when given.
    pub fn with_json_output(mut self, schema: Option<Value>) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_mime_type: JSON_MIME_TYPE.to_string(),
            response_schema: schema,
        });
        self
    }

    /// Text of the first part of the first turn.
    pub fn text(&self) -> Option<&str> {
        self.contents
            .first()
            .and_then(|c| c.parts.first())
            .map(|p| p.text.as_str())
    }
}
