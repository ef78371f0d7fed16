use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

/// Request envelope of the callable protocol: `{"data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct CallableRequest<T> {
    pub data: T,
}

/// Success envelope: `{"result": ...}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CallableResponse {
    pub result: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateTemplateRequest {
    #[validate(required, length(min = 1))]
    pub prompt: Option<String>,

    #[validate(required, length(min = 1))]
    pub system_prompt: Option<String>,

    /// Response schema handed to the upstream API untouched. `None` only
    /// when the field is absent; an explicit `null` is kept.
    #[serde(default, deserialize_with = "present_value")]
    pub schema: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviseTextRequest {
    #[validate(required, length(min = 1))]
    pub system_prompt: Option<String>,

    #[validate(required, length(min = 1))]
    pub text_to_revise: Option<String>,
}
