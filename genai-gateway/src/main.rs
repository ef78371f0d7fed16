use genai_gateway::config::GatewayConfig;
use genai_gateway::services::metrics::init_metrics;
use genai_gateway::startup::Application;
use service_core::observability::init_tracing;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = GatewayConfig::load();
    init_tracing(
        "genai-gateway",
        "info",
        config
            .as_ref()
            .ok()
            .and_then(|config| config.otlp_endpoint.as_deref()),
    );

    let config = config.map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_metrics().map_err(|e| {
        tracing::error!("Failed to initialize metrics: {}", e);
        std::io::Error::other(format!("Metrics error: {}", e))
    })?;

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
