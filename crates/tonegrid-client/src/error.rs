//! Client-side error types.

use tonegrid_types::{ErrorBody, ErrorCode, MSG_INTERNAL, MSG_VALIDATION};

/// Failures reaching or using the transform endpoint.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Nothing to transform.
    #[error("text is empty")]
    EmptyText,

    /// The server answered with a typed error.
    #[error("{0}")]
    Api(ErrorBody),

    /// Connection, timeout or TLS failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response that was neither a result nor an error envelope.
    #[error("unexpected response ({status}): {detail}")]
    Decode { status: u16, detail: String },
}

impl ClientError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ClientError::EmptyText => ErrorCode::ValidationError,
            ClientError::Api(body) => body.code,
            ClientError::Transport(_) | ClientError::Decode { .. } => ErrorCode::InternalError,
        }
    }

    /// The error as the session records it. Transport detail is not exposed.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            ClientError::Api(body) => body.clone(),
            ClientError::EmptyText => ErrorBody::new(ErrorCode::ValidationError, MSG_VALIDATION),
            ClientError::Transport(_) | ClientError::Decode { .. } => {
                ErrorBody::new(ErrorCode::InternalError, MSG_INTERNAL)
            }
        }
    }
}

/// Snapshot storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_passes_through() {
        let body = ErrorBody::new(ErrorCode::RateLimited, "slow down").with_retry_after_ms(Some(900));
        let err = ClientError::Api(body.clone());
        assert_eq!(err.code(), ErrorCode::RateLimited);
        assert_eq!(err.to_body(), body);
    }

    #[test]
    fn test_decode_is_internal() {
        let err = ClientError::Decode {
            status: 200,
            detail: "not json".into(),
        };
        let body = err.to_body();
        assert_eq!(body.code, ErrorCode::InternalError);
        assert_eq!(body.message, MSG_INTERNAL);
        assert!(!body.message.contains("not json"));
    }

    #[test]
    fn test_empty_text_uses_server_validation_message() {
        let body = ClientError::EmptyText.to_body();
        assert_eq!(body.code, ErrorCode::ValidationError);
        assert_eq!(body.message, MSG_VALIDATION);
    }
}
