//! LLM provider abstraction for the transform pipeline.
//!
//! The pipeline treats the model as an opaque `complete(request)` call.
//! Providers translate that into their HTTP API and map failures onto
//! [`LlmError`], which the pipeline folds into its own error taxonomy.
//!
//! A rewrite is always one exchange: an optional system prompt and a single
//! user prompt in, one completion out. There is no conversation state.

mod config;
mod mistral;

pub use config::{GenerationConfig, ProviderConfig};
pub use mistral::MistralProvider;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Token accounting reported by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl Usage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// One completion as returned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text. Empty when the backend produced nothing.
    pub content: String,
    /// Model the backend says it used.
    pub model: String,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

/// A single-turn completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub system: Option<String>,
    /// The user turn.
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system: None,
            prompt: prompt.into(),
            max_tokens: crate::constants::DEFAULT_MAX_TOKENS,
            temperature: None,
            top_p: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

/// Provider failures, classified by what the pipeline does with them.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No credentials, so no request was made.
    #[error("provider not available: {0}")]
    Unavailable(String),

    /// Backend rejected the credentials (401).
    #[error("authentication failed: {0}")]
    AuthError(String),

    /// Backend throttled us (429).
    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        /// Delay the backend asked for, if any.
        retry_after: Option<Duration>,
    },

    /// Any other 4xx.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Backend fault (5xx).
    #[error("server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Success status with a body we could not use.
    #[error("api error: {0}")]
    ApiError(String),

    #[error("network error: {0}")]
    NetworkError(String),
}

pub type LlmResult<T> = Result<T, LlmError>;

/// A language model backend.
///
/// [`MistralProvider`] is the built-in implementation; tests substitute
/// scripted providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Models this provider will serve. The first is the default.
    fn available_models(&self) -> Vec<&str>;

    /// Whether a request could be attempted at all (credentials present).
    async fn is_available(&self) -> bool;

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse>;
}
