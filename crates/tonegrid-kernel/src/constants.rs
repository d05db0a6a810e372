//! Kernel configuration constants.
//!
//! Centralizes hardcoded values for easier configuration and documentation.

use std::time::Duration;

/// Default maximum number of cached responses.
pub const DEFAULT_CACHE_CAPACITY: usize = 200;

/// Default time-to-live for a cached response.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Default sliding window for admission control.
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_secs(10);

/// Default number of requests admitted per client per window.
pub const DEFAULT_RATE_MAX_REQUESTS: usize = 5;

/// Default Mistral model.
pub const DEFAULT_MODEL: &str = "mistral-small-latest";

/// Default Mistral API base URL.
pub const DEFAULT_MISTRAL_BASE_URL: &str = "https://api.mistral.ai";

/// Standard environment variable holding the Mistral API key.
pub const MISTRAL_API_KEY_ENV: &str = "MISTRAL_API_KEY";

/// Generation temperature. Low, so repeated requests stay close.
pub const DEFAULT_TEMPERATURE: f32 = 0.4;

/// Upper bound on generated tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 1200;

/// Nucleus sampling cutoff.
pub const DEFAULT_TOP_P: f32 = 1.0;

/// Timeout for a single backend HTTP request.
pub const BACKEND_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest backend `Retry-After` we pass on. Larger values are clamped.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(60 * 60);
