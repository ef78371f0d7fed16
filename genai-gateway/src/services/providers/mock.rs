//! Mock provider for testing.

use super::{GenerativeApi, ProviderError};
use crate::models::GenerateContentRequest;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

/// Records every request it receives and answers with a fixed outcome.
pub struct MockGenerativeApi {
    outcome: Result<Value, ProviderError>,
    requests: Mutex<Vec<GenerateContentRequest>>,
}

impl MockGenerativeApi {
    /// Answer every call with `response`.
    pub fn succeeding(response: Value) -> Self {
        Self::with_outcome(Ok(response))
    }

    /// Fail every call with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<Value, ProviderError>) -> Self {
        Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeApi for MockGenerativeApi {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<Value, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        self.outcome.clone()
    }

    fn name(&self) -> &str {
        "mock"
    }
}
