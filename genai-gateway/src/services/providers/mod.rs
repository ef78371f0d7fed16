//! Upstream generative-language API abstraction.
//!
//! The forwarder only sees [`GenerativeApi`], so the Gemini client can be
//! swapped for the recording mock in tests.

pub mod gemini;
pub mod mock;

use crate::models::GenerateContentRequest;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The call completed with a non-success status.
    #[error("upstream rejected the request with status {status}")]
    UpstreamRejected { status: u16, body: String },

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Failed to encode request: {0}")]
    EncodeError(String),

    #[error("Failed to decode response: {0}")]
    DecodeError(String),
}

impl ProviderError {
    /// Short label used for metrics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::UpstreamRejected { .. } => "upstream_rejected",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::EncodeError(_) => "encode_error",
            ProviderError::DecodeError(_) => "decode_error",
        }
    }
}

/// A generative-language backend reachable over one request/response call.
#[async_trait]
pub trait GenerativeApi: Send + Sync {
    /// Send `request` and return the decoded response body unchanged.
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<Value, ProviderError>;

    /// Provider name for logs and metrics.
    fn name(&self) -> &str;

    /// Whether a credential is available; drives the readiness probe.
    fn is_configured(&self) -> bool {
        true
    }
}
