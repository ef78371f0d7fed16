//! Application startup and lifecycle management.

use crate::config::{CorsSettings, GatewayConfig, RequestLimits};
use crate::handlers;
use crate::services::providers::gemini::{GeminiClient, GeminiConfig};
use crate::services::{GenerativeApi, RequestForwarder};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: RequestForwarder,
}

impl AppState {
    pub fn new(api: Arc<dyn GenerativeApi>, limits: RequestLimits) -> Self {
        Self {
            forwarder: RequestForwarder::new(api, limits),
        }
    }
}

/// Build the HTTP router: callable endpoints plus probes and metrics.
pub fn build_router(state: AppState, limits: RequestLimits, cors: &CorsSettings) -> Router {
    Router::new()
        .route("/generateTemplate", post(handlers::generate_template))
        .route("/reviseText", post(handlers::revise_text))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(cors))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri().path(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

fn cors_layer(cors: &CorsSettings) -> CorsLayer {
    let origins = if cors.allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = cors
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application against the real Gemini API.
    pub async fn build(config: GatewayConfig) -> Result<Self, AppError> {
        let client = GeminiClient::new(GeminiConfig::from(&config.gemini)).map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Failed to create Gemini client: {}", e))
        })?;

        tracing::info!(
            model = %client.model(),
            timeout_secs = config.gemini.timeout.as_secs(),
            "Initialized Gemini client"
        );

        Self::build_with_provider(config, Arc::new(client)).await
    }

    /// Build the application with an arbitrary upstream provider.
    pub async fn build_with_provider(
        config: GatewayConfig,
        api: Arc<dyn GenerativeApi>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(api, config.limits);
        let router = build_router(state, config.limits, &config.cors);

        // Port 0 binds a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("genai-gateway: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
