//! # tonegrid-kernel
//!
//! Server-side core of tonegrid: turns `(text, coordinate, prompt version)`
//! into rewritten text through a language model.
//!
//! The pipeline:
//! - Maps a grid coordinate to a versioned system/user prompt pair
//! - Admits requests per client through a sliding-window limiter
//! - Serves repeats from a bounded, expiring response cache
//! - Calls the LLM backend on a miss and folds its failures into one
//!   typed error taxonomy

pub mod cache;
pub mod cache_key;
pub mod constants;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod rate_limit;

pub use cache::{CacheEntry, CacheStats, ResponseCache};
pub use cache_key::CacheKey;
pub use error::TransformError;
pub use llm::{
    CompletionRequest, CompletionResponse, GenerationConfig, LlmError, LlmProvider, LlmResult,
    MistralProvider, ProviderConfig, Usage as LlmUsage,
};
pub use pipeline::{TransformPipeline, ValidatedRequest, validate};
pub use prompt::{PROMPT_VERSION, PromptPair, PromptTemplate};
pub use rate_limit::{Admission, AdmissionController};
