//! HTTP endpoints for the tonegrid server using axum.
//!
//! Endpoints:
//! - POST /api/tone   - rewrite text at a grid cell
//! - GET  /api/health - liveness plus the prompt version clients must send

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tonegrid_kernel::TransformPipeline;
use tonegrid_types::{
    ErrorBody, ErrorCode, ErrorEnvelope, HealthResponse, MSG_VALIDATION, TransformRequest,
    TransformResponse,
};

use crate::client_id::client_id;

/// Shared server state: the pipeline owns cache and limiter.
pub type SharedPipeline = Arc<TransformPipeline>;

pub const TONE_PATH: &str = "/api/tone";
pub const HEALTH_PATH: &str = "/api/health";

/// Build the axum router with all endpoints.
pub fn router(pipeline: SharedPipeline) -> Router {
    Router::new()
        .route(TONE_PATH, post(tone))
        .route(HEALTH_PATH, get(health))
        .with_state(pipeline)
}

// ── Errors ──────────────────────────────────────────────────────────

/// An error response: status, `{error: {...}}` body and, for throttling,
/// a `Retry-After` header in whole seconds.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(body: ErrorBody) -> Self {
        let status = StatusCode::from_u16(body.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self { status, body }
    }

    pub fn body(&self) -> &ErrorBody {
        &self.body
    }
}

impl From<tonegrid_kernel::TransformError> for ApiError {
    fn from(err: tonegrid_kernel::TransformError) -> Self {
        Self::new(err.to_body())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(%rejection, "malformed transform request");
        Self::new(ErrorBody::new(ErrorCode::ValidationError, MSG_VALIDATION))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retry_secs = self.body.retry_after_ms.map(|ms| ms.div_ceil(1000).max(1));
        let mut response = (self.status, Json(ErrorEnvelope::from(self.body))).into_response();
        if let Some(secs) = retry_secs {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

// ── Handlers ────────────────────────────────────────────────────────

async fn tone(
    State(pipeline): State<SharedPipeline>,
    headers: HeaderMap,
    payload: Result<Json<TransformRequest>, JsonRejection>,
) -> Result<Json<TransformResponse>, ApiError> {
    let Json(request) = payload?;
    let client = client_id(&headers);
    let response = pipeline.transform(&client, &request).await?;
    Ok(Json(response))
}

async fn health(State(pipeline): State<SharedPipeline>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        prompt_version: pipeline.prompt_version().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tonegrid_kernel::{
        AdmissionController, CompletionRequest, CompletionResponse, LlmProvider, LlmResult,
        LlmUsage,
    };
    use tower::ServiceExt;

    /// Uppercases the user prompt's first line of text.
    struct ShoutProvider;

    #[async_trait]
    impl LlmProvider for ShoutProvider {
        fn name(&self) -> &str {
            "shout"
        }

        fn available_models(&self) -> Vec<&str> {
            vec!["shout-1"]
        }

        async fn is_available(&self) -> bool {
            true
        }

        async fn complete(&self, _request: CompletionRequest) -> LlmResult<CompletionResponse> {
            Ok(CompletionResponse {
                content: "HEY THERE".to_string(),
                model: "shout-1".to_string(),
                stop_reason: None,
                usage: LlmUsage::default(),
            })
        }
    }

    fn app() -> Router {
        router(Arc::new(TransformPipeline::new(Arc::new(ShoutProvider))))
    }

    fn tone_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(TONE_PATH)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body<T: serde::de::DeserializeOwned>(resp: Response) -> T {
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app()
            .oneshot(
                Request::builder()
                    .uri(HEALTH_PATH)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let health: HealthResponse = json_body(resp).await;
        assert_eq!(health.status, "ok");
        assert_eq!(health.prompt_version, "1.0.0");
    }

    #[tokio::test]
    async fn test_tone_success() {
        let resp = app()
            .oneshot(tone_request(serde_json::json!({
                "text": "hey there",
                "coords": {"x": 1, "y": 1},
                "promptVersion": "1.0.0"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body: TransformResponse = json_body(resp).await;
        assert_eq!(body.transformed, "HEY THERE");
        assert!(!body.cached);
    }

    #[tokio::test]
    async fn test_malformed_body_is_validation_error() {
        let resp = app()
            .oneshot(tone_request(serde_json::json!({"text": "hi"})))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let envelope: ErrorEnvelope = json_body(resp).await;
        assert_eq!(envelope.error.code, ErrorCode::ValidationError);
        assert_eq!(envelope.error.message, MSG_VALIDATION);
    }

    #[tokio::test]
    async fn test_out_of_range_coords() {
        let resp = app()
            .oneshot(tone_request(serde_json::json!({
                "text": "hi",
                "coords": {"x": 2, "y": 1},
                "promptVersion": "1.0.0"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let envelope: ErrorEnvelope = json_body(resp).await;
        assert_eq!(envelope.error.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_rate_limited_sets_retry_after() {
        let pipeline = TransformPipeline::new(Arc::new(ShoutProvider)).with_limiter(Arc::new(
            AdmissionController::new(std::time::Duration::from_secs(10), 0),
        ));
        let resp = router(Arc::new(pipeline))
            .oneshot(tone_request(serde_json::json!({
                "text": "hi",
                "coords": {"x": 0, "y": 0},
                "promptVersion": "1.0.0"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(resp.headers()[header::RETRY_AFTER], "10");
        let envelope: ErrorEnvelope = json_body(resp).await;
        assert_eq!(envelope.error.code, ErrorCode::RateLimited);
        assert_eq!(envelope.error.retry_after_ms, Some(10_000));
    }
}
