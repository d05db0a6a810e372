//! Server configuration.
//!
//! Loaded from an optional TOML file; every field has a default, so an
//! empty file (or none at all) yields a working local server.
//!
//! ```toml
//! bind = "0.0.0.0"
//! port = 8080
//!
//! [cache]
//! capacity = 200
//! ttl_secs = 600
//!
//! [rate_limit]
//! window_secs = 10
//! max_requests = 5
//!
//! [provider]
//! provider_type = "mistral"
//! api_key_env = "MISTRAL_API_KEY"
//!
//! [generation]
//! temperature = 0.4
//! max_tokens = 1200
//! top_p = 1.0
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tonegrid_kernel::constants::{
    DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL, DEFAULT_RATE_MAX_REQUESTS, DEFAULT_RATE_WINDOW,
};
use tonegrid_kernel::{
    AdmissionController, GenerationConfig, LlmProvider, MistralProvider, ProviderConfig,
    ResponseCache, TransformPipeline,
};

use crate::constants::{DEFAULT_BIND, DEFAULT_PORT};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid bind address {0}")]
    Address(String),

    #[error("unsupported provider type {0:?}")]
    UnknownProvider(String),

    #[error("provider setup failed: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSection {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl_secs: DEFAULT_CACHE_TTL.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    pub window_secs: u64,
    pub max_requests: usize,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_RATE_WINDOW.as_secs(),
            max_requests: DEFAULT_RATE_MAX_REQUESTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub cache: CacheSection,
    pub rate_limit: RateLimitSection,
    pub provider: ProviderConfig,
    pub generation: GenerationConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            cache: CacheSection::default(),
            rate_limit: RateLimitSection::default(),
            provider: ProviderConfig::default(),
            generation: GenerationConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&input)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.bind, self.port);
        addr.parse().map_err(|_| ConfigError::Address(addr))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit.window_secs)
    }

    /// Construct the configured LLM provider.
    pub fn build_provider(&self) -> Result<Arc<dyn LlmProvider>, ConfigError> {
        match self.provider.provider_type.as_str() {
            "mistral" => {
                let provider = MistralProvider::from_config(&self.provider)
                    .map_err(|e| ConfigError::Provider(e.to_string()))?;
                if !provider.has_api_key() {
                    tracing::warn!(
                        "no Mistral API key configured; transform requests will fail with INTERNAL_ERROR"
                    );
                }
                Ok(Arc::new(provider))
            }
            other => Err(ConfigError::UnknownProvider(other.to_string())),
        }
    }

    /// Assemble the pipeline around `provider` with this config's limits.
    pub fn build_pipeline(&self, provider: Arc<dyn LlmProvider>) -> TransformPipeline {
        TransformPipeline::new(provider)
            .with_cache(Arc::new(ResponseCache::new(self.cache.capacity, self.cache_ttl())))
            .with_limiter(Arc::new(AdmissionController::new(
                self.rate_window(),
                self.rate_limit.max_requests,
            )))
            .with_generation(self.generation)
            .with_model(self.provider.resolved_model())
    }
}
