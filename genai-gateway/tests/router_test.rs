//! Router-level tests using an in-process mock provider.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use genai_gateway::config::{CorsSettings, RequestLimits};
use genai_gateway::services::providers::mock::MockGenerativeApi;
use genai_gateway::startup::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn app(mock: Arc<MockGenerativeApi>, cors: CorsSettings) -> Router {
    let limits = RequestLimits::default();
    build_router(AppState::new(mock, limits), limits, &cors)
}

fn any_origin() -> CorsSettings {
    CorsSettings {
        allowed_origins: vec![],
    }
}

fn callable(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn generate_template_wraps_result() {
    let mock = Arc::new(MockGenerativeApi::succeeding(json!({"candidates": [1, 2]})));

    let response = app(mock.clone(), any_origin())
        .oneshot(callable(
            "/generateTemplate",
            json!({"data": {"prompt": "p", "systemPrompt": "s"}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({"result": {"candidates": [1, 2]}}));
    assert_eq!(mock.call_count(), 1);
}

#[tokio::test]
async fn template_without_schema_still_requests_json() {
    let mock = Arc::new(MockGenerativeApi::succeeding(json!({})));

    app(mock.clone(), any_origin())
        .oneshot(callable(
            "/generateTemplate",
            json!({"data": {"prompt": "p", "systemPrompt": "s"}}),
        ))
        .await
        .unwrap();

    let sent = serde_json::to_value(&mock.requests()[0]).unwrap();
    assert_eq!(
        sent["generationConfig"],
        json!({"responseMimeType": "application/json"})
    );
}

#[tokio::test]
async fn explicit_null_schema_is_forwarded_as_null() {
    let mock = Arc::new(MockGenerativeApi::succeeding(json!({})));

    let response = app(mock.clone(), any_origin())
        .oneshot(callable(
            "/generateTemplate",
            json!({"data": {"prompt": "p", "systemPrompt": "s", "schema": null}}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let sent = serde_json::to_value(&mock.requests()[0]).unwrap();
    assert_eq!(
        sent["generationConfig"],
        json!({"responseMimeType": "application/json", "responseSchema": null})
    );
}

#[tokio::test]
async fn missing_data_is_invalid_argument() {
    let mock = Arc::new(MockGenerativeApi::succeeding(json!({})));

    let response = app(mock.clone(), any_origin())
        .oneshot(callable("/reviseText", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["status"], "INVALID_ARGUMENT");
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn ready_when_provider_is_configured() {
    let mock = Arc::new(MockGenerativeApi::succeeding(json!({})));

    let response = app(mock, any_origin())
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn metrics_endpoint_serves_text() {
    let mock = Arc::new(MockGenerativeApi::succeeding(json!({})));

    let response = app(mock, any_origin())
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn security_headers_are_applied() {
    let mock = Arc::new(MockGenerativeApi::succeeding(json!({})));

    let response = app(mock, any_origin())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let mock = Arc::new(MockGenerativeApi::succeeding(json!({})));
    let cors = CorsSettings {
        allowed_origins: vec!["https://app.example".to_string()],
    };

    let response = app(mock, cors)
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/generateTemplate")
                .header(header::ORIGIN, "https://app.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://app.example"
    );
}
