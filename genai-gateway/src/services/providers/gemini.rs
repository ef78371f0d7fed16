//! Gemini API client.
//!
//! Posts a prepared `generateContent` body and relays the JSON answer as-is.
//! The API key travels as the `key` query parameter and is kept out of every
//! error and log line.

use super::{GenerativeApi, ProviderError};
use crate::config::GeminiSettings;
use crate::models::GenerateContentRequest;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde_json::Value;
use service_core::observability::TracedClientExt;
use std::time::Duration;

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Secret<String>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl From<&GeminiSettings> for GeminiConfig {
    fn from(settings: &GeminiSettings) -> Self {
        Self {
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base: settings.api_base.clone(),
            timeout: settings.timeout,
        }
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Build the API URL for the given method. Contains the credential.
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/models/{}:{}?key={}",
            self.config.api_base,
            self.config.model,
            method,
            self.config.api_key.expose_secret()
        )
    }
}

#[async_trait]
impl GenerativeApi for GeminiClient {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<Value, ProviderError> {
        let body =
            serde_json::to_vec(request).map_err(|e| ProviderError::EncodeError(e.to_string()))?;

        tracing::debug!(
            model = %self.config.model,
            body_len = body.len(),
            structured = request.generation_config.is_some(),
            "Sending request to Gemini API"
        );

        let url = self.api_url("generateContent");
        let response = self
            .client
            .traced_post(&url)
            .json_bytes(body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::UpstreamRejected {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::DecodeError(e.without_url().to_string()))
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        !self.config.api_key.expose_secret().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(api_key: &str) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: Secret::new(api_key.to_string()),
            model: "gemini-2.0-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn api_url_carries_model_method_and_key() {
        assert_eq!(
            client("secret-key").api_url("generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent?key=secret-key"
        );
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let rendered = format!("{:?}", client("secret-key").config);
        assert!(!rendered.contains("secret-key"));
    }

    #[test]
    fn empty_key_is_not_configured() {
        assert!(!client("").is_configured());
        assert!(client("k").is_configured());
    }
}
