//! Validate, build the upstream payload, forward, relay.
//!
//! Both operations are stateless: one upstream call at most, no retries, and
//! the upstream body comes back exactly as decoded.

use crate::config::RequestLimits;
use crate::dtos::{GenerateTemplateRequest, ReviseTextRequest};
use crate::error::CallableError;
use crate::models::GenerateContentRequest;
use crate::services::metrics;
use crate::services::providers::{GenerativeApi, ProviderError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use validator::Validate;

const USER_PROMPT_SEPARATOR: &str = "\n\nUser Prompt: ";
const REVISION_SEPARATOR: &str = "\n\nText to revise:\n";

/// The two callable operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GenerateTemplate,
    ReviseText,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::GenerateTemplate => "generateTemplate",
            Operation::ReviseText => "reviseText",
        }
    }

    fn missing_fields_message(&self) -> &'static str {
        match self {
            Operation::GenerateTemplate => {
                "The function must be called with a 'prompt' and 'systemPrompt'."
            }
            Operation::ReviseText => {
                "The function must be called with a 'systemPrompt' and 'textToRevise'."
            }
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Operation::GenerateTemplate => "An error occurred while generating the template.",
            Operation::ReviseText => "An error occurred while revising the text.",
        }
    }
}

/// Upstream payload for template generation: structured JSON output.
pub fn build_template_payload(
    system_prompt: &str,
    prompt: &str,
    schema: Option<Value>,
) -> GenerateContentRequest {
    let text = format!("{}{}{}", system_prompt, USER_PROMPT_SEPARATOR, prompt);
    GenerateContentRequest::user_turn(text).with_json_output(schema)
}

/// Upstream payload for revision: plain text, no generation config.
pub fn build_revision_payload(system_prompt: &str, text_to_revise: &str) -> GenerateContentRequest {
    let text = format!("{}{}{}", system_prompt, REVISION_SEPARATOR, text_to_revise);
    GenerateContentRequest::user_turn(text)
}

#[derive(Clone)]
pub struct RequestForwarder {
    api: Arc<dyn GenerativeApi>,
    limits: RequestLimits,
}

impl RequestForwarder {
    pub fn new(api: Arc<dyn GenerativeApi>, limits: RequestLimits) -> Self {
        Self { api, limits }
    }

    pub fn api(&self) -> &Arc<dyn GenerativeApi> {
        &self.api
    }

    #[tracing::instrument(skip_all, fields(operation = "generateTemplate"))]
    pub async fn generate_template(
        &self,
        request: GenerateTemplateRequest,
    ) -> Result<Value, CallableError> {
        let op = Operation::GenerateTemplate;

        let fields = request.prompt.as_deref().zip(request.system_prompt.as_deref());
        let (Ok(()), Some((prompt, system_prompt))) = (request.validate(), fields) else {
            return Err(self.reject(op, op.missing_fields_message().to_string()));
        };

        self.check_text(op, "systemPrompt", system_prompt)?;
        self.check_text(op, "prompt", prompt)?;
        if let Some(schema) = &request.schema {
            self.check_schema(op, schema)?;
        }

        let payload = build_template_payload(system_prompt, prompt, request.schema.clone());
        self.forward(op, &payload).await
    }

    #[tracing::instrument(skip_all, fields(operation = "reviseText"))]
    pub async fn revise_text(&self, request: ReviseTextRequest) -> Result<Value, CallableError> {
        let op = Operation::ReviseText;

        let fields = request.system_prompt.as_deref().zip(request.text_to_revise.as_deref());
        let (Ok(()), Some((system_prompt, text_to_revise))) = (request.validate(), fields) else {
            return Err(self.reject(op, op.missing_fields_message().to_string()));
        };

        self.check_text(op, "systemPrompt", system_prompt)?;
        self.check_text(op, "textToRevise", text_to_revise)?;

        let payload = build_revision_payload(system_prompt, text_to_revise);
        self.forward(op, &payload).await
    }

    fn check_text(&self, op: Operation, field: &str, value: &str) -> Result<(), CallableError> {
        if value.len() > self.limits.max_text_bytes {
            return Err(self.reject(
                op,
                format!(
                    "'{}' exceeds the maximum size of {} bytes.",
                    field, self.limits.max_text_bytes
                ),
            ));
        }
        Ok(())
    }

    fn check_schema(&self, op: Operation, schema: &Value) -> Result<(), CallableError> {
        let size = serde_json::to_vec(schema).map(|v| v.len()).unwrap_or(usize::MAX);
        if size > self.limits.max_schema_bytes {
            return Err(self.reject(
                op,
                format!(
                    "'schema' exceeds the maximum size of {} bytes.",
                    self.limits.max_schema_bytes
                ),
            ));
        }
        Ok(())
    }

    fn reject(&self, op: Operation, message: String) -> CallableError {
        tracing::warn!(operation = op.as_str(), reason = %message, "Rejected invalid invocation");
        metrics::record_invocation(op.as_str(), "invalid_argument");
        CallableError::InvalidArgument(message)
    }

    async fn forward(
        &self,
        op: Operation,
        payload: &GenerateContentRequest,
    ) -> Result<Value, CallableError> {
        let provider = self.api.name().to_string();
        let started = Instant::now();
        let result = self.api.generate_content(payload).await;
        metrics::record_provider_latency(&provider, op.as_str(), started.elapsed().as_secs_f64());

        match result {
            Ok(body) => {
                metrics::record_invocation(op.as_str(), "success");
                tracing::info!(operation = op.as_str(), provider = %provider, "Upstream call succeeded");
                Ok(body)
            }
            Err(e) => {
                metrics::record_invocation(op.as_str(), e.kind());
                match &e {
                    ProviderError::UpstreamRejected { status, body } => tracing::error!(
                        operation = op.as_str(),
                        provider = %provider,
                        status = *status,
                        body = %body,
                        "Generative API returned an error"
                    ),
                    other => tracing::error!(
                        operation = op.as_str(),
                        provider = %provider,
                        kind = other.kind(),
                        error = %other,
                        "Error calling generative API"
                    ),
                }
                Err(CallableError::Internal(op.failure_message().to_string()))
            }
        }
    }
}
