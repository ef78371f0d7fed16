#![allow(dead_code)]

use genai_gateway::config::{CorsSettings, GatewayConfig, GeminiSettings, RequestLimits};
use genai_gateway::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use std::time::Duration;
use wiremock::MockServer;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_MODEL: &str = "gemini-2.0-flash";
pub const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

pub struct TestApp {
    pub address: String,
    pub upstream: MockServer,
    pub client: reqwest::Client,
}

pub fn test_config(api_base: &str, limits: RequestLimits) -> GatewayConfig {
    GatewayConfig {
        common: CoreConfig {
            port: 0,
            environment: "test".to_string(),
        },
        gemini: GeminiSettings {
            api_key: Secret::new(TEST_API_KEY.to_string()),
            model: TEST_MODEL.to_string(),
            api_base: api_base.to_string(),
            timeout: Duration::from_secs(2),
        },
        limits,
        cors: CorsSettings {
            allowed_origins: vec![],
        },
        otlp_endpoint: None,
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_limits(RequestLimits::default()).await
    }

    /// Start a fake upstream and the gateway pointed at it.
    pub async fn spawn_with_limits(limits: RequestLimits) -> Self {
        let upstream = MockServer::start().await;
        let config = test_config(&upstream.uri(), limits);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        Self {
            address,
            upstream,
            client: reqwest::Client::new(),
        }
    }

    pub async fn call(&self, function: &str, body: serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/{}", self.address, function))
            .json(&body)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .expect("Failed to send request")
    }

    pub async fn upstream_requests(&self) -> Vec<wiremock::Request> {
        self.upstream.received_requests().await.unwrap_or_default()
    }
}
