//! The transform pipeline.
//!
//! ```text
//! validate ─► version ─► admission ─► cache lookup ──hit──► {cached: true}
//!                                          │
//!                                         miss
//!                                          ▼
//!                                   backend call ─► cache write ─► {cached: false}
//! ```
//!
//! Stages run strictly in order and the first failure short-circuits.
//! Validation and the version check are pure; admission mutates the
//! limiter, the cache stages mutate the cache, and the backend call is the
//! only suspension point. Nothing is retried here.

use std::sync::Arc;

use tonegrid_types::{Coordinate, TransformRequest, TransformResponse};

use crate::cache::ResponseCache;
use crate::cache_key::CacheKey;
use crate::error::TransformError;
use crate::llm::{CompletionRequest, CompletionResponse, GenerationConfig, LlmProvider};
use crate::prompt::PromptTemplate;
use crate::rate_limit::{Admission, AdmissionController};

/// A request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest<'a> {
    pub text: &'a str,
    pub coord: Coordinate,
    pub prompt_version: &'a str,
}

/// Check text and coordinates. Text must be non-blank; it is kept verbatim.
pub fn validate(request: &TransformRequest) -> Result<ValidatedRequest<'_>, TransformError> {
    if request.text.trim().is_empty() {
        return Err(TransformError::Validation("text is empty".into()));
    }
    let coord = Coordinate::try_from(request.coords)?;
    Ok(ValidatedRequest {
        text: &request.text,
        coord,
        prompt_version: &request.prompt_version,
    })
}

/// Orchestrates one transform per call. Cheap to share behind an `Arc`.
pub struct TransformPipeline {
    provider: Arc<dyn LlmProvider>,
    cache: Arc<ResponseCache>,
    limiter: Arc<AdmissionController>,
    template: PromptTemplate,
    generation: GenerationConfig,
    model: String,
}

impl std::fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformPipeline")
            .field("provider", &self.provider.name())
            .field("model", &self.model)
            .field("prompt_version", &self.template.version())
            .field("cache", &self.cache)
            .field("limiter", &self.limiter)
            .finish()
    }
}

impl TransformPipeline {
    /// Pipeline with default cache, limiter, template and generation settings.
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        let model = provider
            .available_models()
            .first()
            .map(|m| m.to_string())
            .unwrap_or_else(|| crate::constants::DEFAULT_MODEL.to_string());
        Self {
            provider,
            cache: Arc::new(ResponseCache::default()),
            limiter: Arc::new(AdmissionController::default()),
            template: PromptTemplate::current(),
            generation: GenerationConfig::default(),
            model,
        }
    }

    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_limiter(mut self, limiter: Arc<AdmissionController>) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn cache(&self) -> &Arc<ResponseCache> {
        &self.cache
    }

    pub fn limiter(&self) -> &Arc<AdmissionController> {
        &self.limiter
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn prompt_version(&self) -> &str {
        self.template.version()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one request through every stage.
    #[tracing::instrument(skip(self, request), fields(client = %client_id))]
    pub async fn transform(
        &self,
        client_id: &str,
        request: &TransformRequest,
    ) -> Result<TransformResponse, TransformError> {
        let validated = validate(request)?;

        if !self.template.matches_version(validated.prompt_version) {
            tracing::debug!(
                expected = self.template.version(),
                actual = validated.prompt_version,
                "prompt version mismatch"
            );
            return Err(TransformError::VersionMismatch {
                expected: self.template.version().to_string(),
                actual: validated.prompt_version.to_string(),
            });
        }

        if let Admission::Denied { retry_after } = self.limiter.check(client_id) {
            return Err(TransformError::RateLimited { retry_after });
        }

        let key = CacheKey::build(validated.text, validated.coord, self.template.version());
        if let Some(entry) = self.cache.get(&key) {
            tracing::debug!(key = %key.short(), "cache hit");
            return Ok(TransformResponse {
                transformed: entry.transformed,
                cached: true,
            });
        }
        tracing::debug!(key = %key.short(), "cache miss");

        let response = self.call_backend(validated.text, validated.coord).await?;
        let transformed = response.content;
        self.cache.put(key, transformed.clone());

        tracing::info!(
            coord = %validated.coord,
            chars = transformed.chars().count(),
            model = %response.model,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            total_tokens = response.usage.total(),
            "transform completed"
        );
        Ok(TransformResponse {
            transformed,
            cached: false,
        })
    }

    /// Whitespace-only output counts as empty.
    async fn call_backend(
        &self,
        text: &str,
        coord: Coordinate,
    ) -> Result<CompletionResponse, TransformError> {
        let prompts = self.template.render(text, coord);
        let request = CompletionRequest::new(self.model.clone(), prompts.user)
            .with_system(prompts.system)
            .with_max_tokens(self.generation.max_tokens)
            .with_temperature(self.generation.temperature)
            .with_top_p(self.generation.top_p);

        let response = self.provider.complete(request).await.map_err(|e| {
            let err = TransformError::from(e);
            match err.code() {
                tonegrid_types::ErrorCode::InternalError => {
                    tracing::error!(error = %err, "backend call failed")
                }
                _ => tracing::warn!(error = %err, "backend call failed"),
            }
            err
        })?;

        if response.content.trim().is_empty() {
            tracing::warn!(model = %response.model, "backend returned empty content");
            return Err(TransformError::EmptyResponse);
        }
        Ok(response)
    }
}
