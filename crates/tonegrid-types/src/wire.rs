//! Transform endpoint wire types.
//!
//! ```text
//! request   {text, coords: {x, y}, promptVersion}
//! success   {transformed, cached}
//! failure   {error: {code, message, retryAfterMs?}}
//! ```

use serde::{Deserialize, Serialize};

use crate::coord::{Coordinate, RawCoords};

/// A transform request as the caller sends it. Nothing here is validated yet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest {
    pub text: String,
    pub coords: RawCoords,
    pub prompt_version: String,
}

impl TransformRequest {
    pub fn new(text: impl Into<String>, coords: Coordinate, prompt_version: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            coords: coords.into(),
            prompt_version: prompt_version.into(),
        }
    }
}

/// Successful transform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformResponse {
    pub transformed: String,
    /// Served from the response cache without a backend call.
    pub cached: bool,
}

// Fixed user-facing messages. Server and session side must agree on them.
pub const MSG_VALIDATION: &str = "Invalid request format";
pub const MSG_VERSION_MISMATCH: &str = "Prompt version mismatch. Please refresh the page.";
pub const MSG_RATE_LIMITED: &str = "Too many requests. Please slow down.";
pub const MSG_AUTH: &str = "API key is invalid or expired. Please check your configuration.";
pub const MSG_UPSTREAM_RATE_LIMITED: &str = "Mistral API rate limit exceeded. Please try again later.";
pub const MSG_UPSTREAM_UNAVAILABLE: &str =
    "Mistral AI service is temporarily unavailable. Please try again later.";
pub const MSG_EMPTY_RESPONSE: &str = "No transformation was generated. Please try again.";
pub const MSG_INTERNAL: &str = "An unexpected error occurred. Please try again.";

/// Error codes exposed to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    VersionMismatch,
    RateLimited,
    AuthError,
    UpstreamError,
    EmptyResponse,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::VersionMismatch => "VERSION_MISMATCH",
            ErrorCode::RateLimited => "RATE_LIMITED",
            ErrorCode::AuthError => "AUTH_ERROR",
            ErrorCode::UpstreamError => "UPSTREAM_ERROR",
            ErrorCode::EmptyResponse => "EMPTY_RESPONSE",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status for an HTTP-facing deployment.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorCode::ValidationError | ErrorCode::VersionMismatch => 400,
            ErrorCode::RateLimited => 429,
            ErrorCode::AuthError => 401,
            ErrorCode::UpstreamError => 502,
            ErrorCode::EmptyResponse | ErrorCode::InternalError => 500,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed error as it travels on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

impl ErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retry_after_ms: None,
        }
    }

    pub fn with_retry_after_ms(mut self, ms: Option<u64>) -> Self {
        self.retry_after_ms = ms;
        self
    }
}

impl std::fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// `{ "error": { ... } }` envelope around [`ErrorBody`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

impl From<ErrorBody> for ErrorEnvelope {
    fn from(error: ErrorBody) -> Self {
        Self { error }
    }
}

/// Health probe payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub prompt_version: String,
}

// ============================================================================
// Tests
// ============================================================================
