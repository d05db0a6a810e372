//! Pipeline error taxonomy.
//!
//! Every failed transform resolves to exactly one [`TransformError`]. Each
//! variant maps to a wire [`ErrorCode`] and a fixed user-facing message;
//! backend detail stays in the `Display` output (for logs) and never reaches
//! the caller.

use std::time::Duration;

use tonegrid_types::{
    CoordError, ErrorBody, ErrorCode, MSG_AUTH, MSG_EMPTY_RESPONSE, MSG_INTERNAL, MSG_RATE_LIMITED,
    MSG_UPSTREAM_RATE_LIMITED, MSG_UPSTREAM_UNAVAILABLE, MSG_VALIDATION, MSG_VERSION_MISMATCH,
};

use crate::llm::LlmError;

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Blank text or a coordinate outside the grid.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("prompt version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: String, actual: String },

    /// Denied by our own admission controller.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("backend rejected credentials: {0}")]
    Auth(String),

    /// The backend throttled us.
    #[error("backend rate limited: {message}")]
    UpstreamRateLimited {
        message: String,
        retry_after: Option<Duration>,
    },

    /// Backend 5xx.
    #[error("backend unavailable ({status}): {message}")]
    UpstreamUnavailable { status: u16, message: String },

    #[error("backend returned no content")]
    EmptyResponse,

    /// Transport failures and anything else unexpected.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TransformError {
    pub fn code(&self) -> ErrorCode {
        match self {
            TransformError::Validation(_) => ErrorCode::ValidationError,
            TransformError::VersionMismatch { .. } => ErrorCode::VersionMismatch,
            TransformError::RateLimited { .. } | TransformError::UpstreamRateLimited { .. } => {
                ErrorCode::RateLimited
            }
            TransformError::Auth(_) => ErrorCode::AuthError,
            TransformError::UpstreamUnavailable { .. } => ErrorCode::UpstreamError,
            TransformError::EmptyResponse => ErrorCode::EmptyResponse,
            TransformError::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Fixed message safe to show to the caller.
    pub fn user_message(&self) -> &'static str {
        match self {
            TransformError::Validation(_) => MSG_VALIDATION,
            TransformError::VersionMismatch { .. } => MSG_VERSION_MISMATCH,
            TransformError::RateLimited { .. } => MSG_RATE_LIMITED,
            TransformError::Auth(_) => MSG_AUTH,
            TransformError::UpstreamRateLimited { .. } => MSG_UPSTREAM_RATE_LIMITED,
            TransformError::UpstreamUnavailable { .. } => MSG_UPSTREAM_UNAVAILABLE,
            TransformError::EmptyResponse => MSG_EMPTY_RESPONSE,
            TransformError::Internal(_) => MSG_INTERNAL,
        }
    }

    /// Retry hint for throttling errors.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            TransformError::RateLimited { retry_after } => Some(*retry_after),
            TransformError::UpstreamRateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn http_status(&self) -> u16 {
        self.code().http_status()
    }

    /// Wire form `{code, message, retryAfterMs?}`.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.code(), self.user_message())
            .with_retry_after_ms(
            self.retry_after()
                .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        )
    }
}

impl From<CoordError> for TransformError {
    fn from(err: CoordError) -> Self {
        TransformError::Validation(err.to_string())
    }
}

impl From<LlmError> for TransformError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::AuthError(message) => TransformError::Auth(message),
            LlmError::RateLimited {
                message,
                retry_after,
            } => TransformError::UpstreamRateLimited {
                message,
                retry_after,
            },
            LlmError::ServerError { status, message } => {
                TransformError::UpstreamUnavailable { status, message }
            }
            other => TransformError::Internal(other.to_string()),
        }
    }
}
