//! End-to-end tests for the HTTP surface.
//!
//! # Tiers
//!
//! - **Tier 1:** Router built from a TOML config with a real
//!   `MistralProvider` pointed at an httpmock server
//! - **Tier 2:** Per-client admission keyed by proxy headers

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use tower::ServiceExt;

use tonegrid_server::{ServerConfig, router};
use tonegrid_types::{ErrorCode, ErrorEnvelope, TransformResponse};

// ============================================================================
// Shared test setup
// ============================================================================

fn app_for(server: &MockServer, extra: &str) -> Router {
    let config = ServerConfig::from_toml(&format!(
        r#"
        {extra}

        [provider]
        api_key = "test-key"
        base_url = "{}"
        "#,
        server.base_url()
    ))
    .unwrap();
    let provider = config.build_provider().unwrap();
    router(Arc::new(config.build_pipeline(provider)))
}

fn tone_request(text: &str, x: i64, y: i64, forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/tone")
        .header("content-type", "application/json");
    if let Some(ip) = forwarded_for {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder
        .body(Body::from(
            json!({"text": text, "coords": {"x": x, "y": y}, "promptVersion": "1.0.0"})
                .to_string(),
        ))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(resp: Response) -> T {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "model": "mistral-small-latest",
        "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 4}
    })
}

// ============================================================================
// Tier 1: config → router → Mistral wire
// ============================================================================

#[tokio::test]
async fn test_transform_then_cached() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200).json_body(completion("Good day, world."));
        })
        .await;
    let app = app_for(&server, "");

    let first = app.clone().oneshot(tone_request("hey world", 1, 0, None)).await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first: TransformResponse = read_json(first).await;
    assert_eq!(first.transformed, "Good day, world.");
    assert!(!first.cached);

    let second = app.oneshot(tone_request("hey world", 1, 0, None)).await.unwrap();
    let second: TransformResponse = read_json(second).await;
    assert_eq!(second.transformed, "Good day, world.");
    assert!(second.cached);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_backend_outage_is_upstream_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(503).body("overloaded");
        })
        .await;

    let resp = app_for(&server, "")
        .oneshot(tone_request("hello", 0, 0, None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let envelope: ErrorEnvelope = read_json(resp).await;
    assert_eq!(envelope.error.code, ErrorCode::UpstreamError);
    assert!(!envelope.error.message.contains("overloaded"));
}

#[tokio::test]
async fn test_bad_key_is_auth_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(401).json_body(json!({"message": "Unauthorized"}));
        })
        .await;

    let resp = app_for(&server, "")
        .oneshot(tone_request("hello", 0, 0, None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let envelope: ErrorEnvelope = read_json(resp).await;
    assert_eq!(envelope.error.code, ErrorCode::AuthError);
}

// ============================================================================
// Tier 2: admission per client
// ============================================================================

#[tokio::test]
async fn test_rate_limit_is_per_forwarded_client() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).json_body(completion("ok"));
        })
        .await;
    let app = app_for(&server, "[rate_limit]\nmax_requests = 2");

    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(tone_request("hello", 0, 0, Some("198.51.100.1")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let denied = app
        .clone()
        .oneshot(tone_request("hello", 0, 0, Some("198.51.100.1, 10.0.0.1")))
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(denied.headers().contains_key("retry-after"));
    let envelope: ErrorEnvelope = read_json(denied).await;
    assert_eq!(envelope.error.code, ErrorCode::RateLimited);
    assert!(envelope.error.retry_after_ms.is_some_and(|ms| ms > 0 && ms <= 10_000));

    let other = app
        .oneshot(tone_request("hello", 0, 0, Some("198.51.100.2")))
        .await
        .unwrap();
    assert_eq!(other.status(), StatusCode::OK);
}
