//! Prometheus metrics for genai-gateway.
//!
//! HTTP metrics come from the `metrics` facade (see
//! `service_core::middleware::metrics_middleware`) rendered through
//! `metrics-exporter-prometheus`; gateway-specific series live in a
//! `prometheus` registry. Both are concatenated by [`get_metrics`].

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::{Mutex, OnceLock};

pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static GATEWAY_INVOCATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static GENAI_PROVIDER_LATENCY_SECONDS: OnceLock<HistogramVec> = OnceLock::new();

static INIT_LOCK: Mutex<()> = Mutex::new(());

/// Initialize all metrics. Call once at startup; later calls are no-ops.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    let _guard = INIT_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if REGISTRY.get().is_some() {
        return Ok(());
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = METRICS_HANDLE.set(handle);
        }
        Err(e) => {
            tracing::warn!(error = %e, "Prometheus recorder not installed, HTTP metrics disabled");
        }
    }

    let registry = Registry::new();

    // outcome: success, invalid_argument, or a ProviderError kind
    let invocations = IntCounterVec::new(
        Opts::new(
            "gateway_invocations_total",
            "Callable invocations by operation and outcome",
        ),
        &["operation", "outcome"],
    )?;

    let provider_latency = HistogramVec::new(
        HistogramOpts::new(
            "genai_provider_latency_seconds",
            "Upstream generative API latency in seconds",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["provider", "operation"],
    )?;

    registry.register(Box::new(invocations.clone()))?;
    registry.register(Box::new(provider_latency.clone()))?;

    let _ = GATEWAY_INVOCATIONS_TOTAL.set(invocations);
    let _ = GENAI_PROVIDER_LATENCY_SECONDS.set(provider_latency);
    let _ = REGISTRY.set(registry);

    tracing::info!("Prometheus metrics initialized");
    Ok(())
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut output = METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_default();

    let Some(registry) = REGISTRY.get() else {
        output.push_str("# Metrics registry not initialized\n");
        return output;
    };

    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        output.push_str(&format!("# Failed to encode metrics: {}\n", e));
        return output;
    }

    match String::from_utf8(buffer) {
        Ok(s) => output.push_str(&s),
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
        }
    }
    output
}

/// Record the outcome of one callable invocation.
pub fn record_invocation(operation: &str, outcome: &str) {
    if let Some(counter) = GATEWAY_INVOCATIONS_TOTAL.get() {
        counter.with_label_values(&[operation, outcome]).inc();
    }
}

/// Record upstream latency.
pub fn record_provider_latency(provider: &str, operation: &str, duration_secs: f64) {
    if let Some(histogram) = GENAI_PROVIDER_LATENCY_SECONDS.get() {
        histogram
            .with_label_values(&[provider, operation])
            .observe(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RequestLimits;
    use crate::dtos::ReviseTextRequest;
    use crate::services::providers::mock::MockGenerativeApi;
    use crate::services::{ProviderError, RequestForwarder};
    use serde_json::json;
    use std::sync::Arc;

    fn revision() -> ReviseTextRequest {
        ReviseTextRequest {
            system_prompt: Some("s".to_string()),
            text_to_revise: Some("t".to_string()),
        }
    }

    fn has_series(output: &str, name: &str, labels: &[&str]) -> bool {
        output
            .lines()
            .filter(|line| line.starts_with(name))
            .any(|line| labels.iter().all(|label| line.contains(label)))
    }

    #[tokio::test]
    async fn invocations_are_counted_by_outcome() {
        init_metrics().unwrap();

        let ok = Arc::new(MockGenerativeApi::succeeding(json!({})));
        RequestForwarder::new(ok, RequestLimits::default())
            .revise_text(revision())
            .await
            .unwrap();

        let rejected = Arc::new(MockGenerativeApi::failing(ProviderError::UpstreamRejected {
            status: 503,
            body: "unavailable".to_string(),
        }));
        RequestForwarder::new(rejected, RequestLimits::default())
            .revise_text(revision())
            .await
            .unwrap_err();

        let output = get_metrics();
        assert!(has_series(
            &output,
            "gateway_invocations_total",
            &[r#"operation="reviseText""#, r#"outcome="success""#]
        ));
        assert!(has_series(
            &output,
            "gateway_invocations_total",
            &[r#"operation="reviseText""#, r#"outcome="upstream_rejected""#]
        ));
        assert!(has_series(
            &output,
            "genai_provider_latency_seconds_count",
            &[r#"provider="mock""#, r#"operation="reviseText""#]
        ));
    }

    #[test]
    fn init_is_idempotent() {
        init_metrics().unwrap();
        init_metrics().unwrap();
        assert!(get_metrics().contains("# TYPE gateway_invocations_total counter"));
    }
}
