//! Mistral chat-completions provider.
//!
//! Speaks the OpenAI-compatible `POST /v1/chat/completions` API. Status
//! codes map onto [`LlmError`]:
//!
//! | Status | Error |
//! |--------|-------|
//! | 401 | `AuthError` |
//! | 429 | `RateLimited` (with `Retry-After` seconds when sent) |
//! | 5xx | `ServerError` |
//! | other 4xx | `InvalidRequest` |
//!
//! Transport failures are `NetworkError`; a missing API key is
//! `Unavailable` and no request is made.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, LlmResult, ProviderConfig,
    Usage,
};
use crate::constants::{
    BACKEND_REQUEST_TIMEOUT, DEFAULT_MISTRAL_BASE_URL, DEFAULT_MODEL, MAX_RETRY_AFTER,
};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Mistral provider.
pub struct MistralProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    default_model: String,
}

impl std::fmt::Debug for MistralProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MistralProvider")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl MistralProvider {
    /// Create a provider against the public endpoint.
    ///
    /// A `None` key is allowed; every completion then fails with
    /// [`LlmError::Unavailable`].
    pub fn new(api_key: Option<String>) -> LlmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(BACKEND_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.filter(|k| !k.is_empty()),
            base_url: DEFAULT_MISTRAL_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Build from a [`ProviderConfig`], resolving the key from config/env.
    pub fn from_config(config: &ProviderConfig) -> LlmResult<Self> {
        Ok(Self::new(config.resolve_api_key())?
            .with_base_url(config.resolved_base_url())
            .with_default_model(config.resolved_model()))
    }

    /// Point at a different endpoint (self-hosted gateway, test server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Get the default model.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_body(request: &CompletionRequest) -> ChatRequest<'_> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &request.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
        }
    }
}

#[async_trait]
impl LlmProvider for MistralProvider {
    fn name(&self) -> &str {
        "mistral"
    }

    fn available_models(&self) -> Vec<&str> {
        vec![self.default_model.as_str()]
    }

    async fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| LlmError::Unavailable("Mistral API key not configured".into()))?;

        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH);
        let body = Self::build_body(&request);

        tracing::debug!(model = %request.model, url = %url, "sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let text = response.text().await.unwrap_or_default();
            return Err(map_status(status, extract_error_message(&text), retry_after));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::ApiError(format!("malformed response: {e}")))?;

        let choice = parsed.choices.into_iter().next();
        let (content, stop_reason) = match choice {
            Some(c) => (c.message.and_then(|m| m.content).unwrap_or_default(), c.finish_reason),
            None => (String::new(), None),
        };

        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content,
            model: parsed.model.unwrap_or(request.model),
            stop_reason,
            usage,
        })
    }
}

fn map_status(status: StatusCode, message: String, retry_after: Option<Duration>) -> LlmError {
    match status {
        StatusCode::UNAUTHORIZED => LlmError::AuthError(message),
        StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimited {
            message,
            retry_after,
        },
        s if s.is_server_error() => LlmError::ServerError {
            status: s.as_u16(),
            message,
        },
        s if s.is_client_error() => LlmError::InvalidRequest(format!("{}: {}", s.as_u16(), message)),
        s => LlmError::ApiError(format!("unexpected status {}: {}", s.as_u16(), message)),
    }
}

/// `Retry-After` in seconds (integer or fractional), capped at
/// [`MAX_RETRY_AFTER`]. HTTP-date form is ignored.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let raw = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;
    let secs: f64 = raw.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs.min(MAX_RETRY_AFTER.as_secs_f64())).ok()
}

/// Pull `error.message` / `message` / `detail` out of an error body, else the raw text.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let candidates = [
            value.pointer("/error/message"),
            value.pointer("/message"),
            value.pointer("/detail"),
        ];
        for candidate in candidates.into_iter().flatten() {
            if let Some(s) = candidate.as_str() {
                return s.to_string();
            }
        }
    }
    body.trim().to_string()
}

// ============================================================================
// Mistral API types
// ============================================================================

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn provider(server: &MockServer) -> MistralProvider {
        MistralProvider::new(Some("test-key".into()))
            .unwrap()
            .with_base_url(server.base_url())
    }

    fn request() -> CompletionRequest {
        CompletionRequest::new(DEFAULT_MODEL, "Hello world")
            .with_system("You rewrite text")
            .with_temperature(0.4)
            .with_top_p(1.0)
    }

    #[test]
    fn test_body_shape() {
        let req = request();
        let body = serde_json::to_value(MistralProvider::build_body(&req)).unwrap();
        assert_eq!(body["model"], "mistral-small-latest");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "You rewrite text");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "Hello world");
        assert_eq!(body["max_tokens"], 1200);
        assert_eq!(body["top_p"], 1.0);
    }

    #[test]
    fn test_map_status() {
        assert!(matches!(
            map_status(StatusCode::UNAUTHORIZED, "no".into(), None),
            LlmError::AuthError(_)
        ));
        assert!(matches!(
            map_status(StatusCode::SERVICE_UNAVAILABLE, "down".into(), None),
            LlmError::ServerError { status: 503, .. }
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_REQUEST, "bad".into(), None),
            LlmError::InvalidRequest(_)
        ));
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(extract_error_message(r#"{"error":{"message":"nope"}}"#), "nope");
        assert_eq!(extract_error_message(r#"{"message":"Unauthorized"}"#), "Unauthorized");
        assert_eq!(extract_error_message("  plain text "), "plain text");
    }

    #[tokio::test]
    async fn test_missing_key_is_unavailable() {
        let provider = MistralProvider::new(None).unwrap();
        assert!(!provider.is_available().await);
        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer test-key");
                then.status(200).json_body(json!({
                    "id": "cmpl-1",
                    "model": "mistral-small-latest",
                    "choices": [{
                        "index": 0,
                        "message": {"role": "assistant", "content": "Hey world!"},
                        "finish_reason": "stop"
                    }],
                    "usage": {"prompt_tokens": 42, "completion_tokens": 4, "total_tokens": 46}
                }));
            })
            .await;

        let response = provider(&server).complete(request()).await.unwrap();
        mock.assert_async().await;
        assert_eq!(response.content, "Hey world!");
        assert_eq!(response.stop_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.total(), 46);
    }

    #[tokio::test]
    async fn test_no_choices_yields_empty_content() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({"choices": []}));
            })
            .await;

        let response = provider(&server).complete(request()).await.unwrap();
        assert!(response.content.is_empty());
    }

    #[tokio::test]
    async fn test_unauthorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(401).json_body(json!({"message": "Unauthorized"}));
            })
            .await;

        let err = provider(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::AuthError(ref m) if m == "Unauthorized"));
    }

    #[tokio::test]
    async fn test_rate_limited_with_retry_after() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(429)
                    .header("retry-after", "3")
                    .json_body(json!({"message": "Requests rate limit exceeded"}));
            })
            .await;

        let err = provider(&server).complete(request()).await.unwrap_err();
        match err {
            LlmError::RateLimited { retry_after, .. } => {
                assert_eq!(retry_after, Some(Duration::from_secs(3)));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn test_retry_after_is_clamped() {
        let mut headers = reqwest::header::HeaderMap::new();
        for (raw, expected) in [
            ("1e30", Some(MAX_RETRY_AFTER)),
            ("99999999999999999999", Some(MAX_RETRY_AFTER)),
            ("2.5", Some(Duration::from_millis(2500))),
            ("-1", None),
            ("NaN", None),
            ("inf", None),
            ("Wed, 21 Oct 2015 07:28:00 GMT", None),
        ] {
            headers.insert(
                reqwest::header::RETRY_AFTER,
                reqwest::header::HeaderValue::from_static(raw),
            );
            assert_eq!(parse_retry_after(&headers), expected, "retry-after: {raw}");
        }
    }

    #[tokio::test]
    async fn test_server_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(503).body("upstream overloaded");
            })
            .await;

        let err = provider(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::ServerError { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on port 9 (discard) in the test environment.
        let provider = MistralProvider::new(Some("k".into()))
            .unwrap()
            .with_base_url("http://127.0.0.1:9");
        let err = provider.complete(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::NetworkError(_)));
    }
}
