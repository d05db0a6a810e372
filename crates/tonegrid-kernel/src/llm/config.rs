//! LLM provider and generation configuration.
//!
//! Both types deserialize from the server's TOML config; every field has a
//! default so a partial section is fine.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_TOKENS, DEFAULT_MISTRAL_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
    DEFAULT_TOP_P, MISTRAL_API_KEY_ENV,
};

/// Configuration for an LLM provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type identifier. Only "mistral" is built in.
    #[serde(default = "default_provider_type")]
    pub provider_type: String,

    /// API key (for cloud providers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key (alternative to inline key).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,

    /// Base URL override (for custom endpoints or test servers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Default model for this provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

fn default_provider_type() -> String {
    "mistral".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::new(default_provider_type())
    }
}

impl ProviderConfig {
    /// Create a new provider config.
    pub fn new(provider_type: impl Into<String>) -> Self {
        Self {
            provider_type: provider_type.into(),
            api_key: None,
            api_key_env: None,
            base_url: None,
            default_model: None,
        }
    }

    /// Set API key directly.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set API key from environment variable name.
    pub fn with_api_key_env(mut self, env_var: impl Into<String>) -> Self {
        self.api_key_env = Some(env_var.into());
        self
    }

    /// Set base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    /// Resolve API key from config or environment.
    ///
    /// Order: inline key, the named env var, then the provider's standard
    /// env var. Empty values count as unset.
    pub fn resolve_api_key(&self) -> Option<String> {
        // Direct key takes precedence
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }

        // Named environment variable
        if let Some(env_var) = &self.api_key_env {
            if let Some(key) = read_env(env_var) {
                return Some(key);
            }
        }

        // Standard env var for provider type
        let standard_env = match self.provider_type.as_str() {
            "mistral" => MISTRAL_API_KEY_ENV,
            _ => return None,
        };
        read_env(standard_env)
    }

    /// Base URL, falling back to the provider's public endpoint.
    pub fn resolved_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_MISTRAL_BASE_URL)
    }

    /// Model, falling back to the built-in default.
    pub fn resolved_model(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

/// Fixed sampling settings applied to every backend call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: DEFAULT_TOP_P,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_key_wins() {
        let config = ProviderConfig::new("mistral")
            .with_api_key("inline-key")
            .with_api_key_env("TONEGRID_TEST_UNUSED_KEY_VAR");
        assert_eq!(config.resolve_api_key().as_deref(), Some("inline-key"));
    }

    #[test]
    fn test_unknown_provider_without_key() {
        let config = ProviderConfig::new("nonexistent")
            .with_api_key_env("TONEGRID_TEST_DEFINITELY_UNSET_VAR");
        assert_eq!(config.resolve_api_key(), None);
    }

    #[test]
    fn test_empty_inline_key_is_ignored() {
        let config = ProviderConfig::new("nonexistent").with_api_key("");
        assert_eq!(config.resolve_api_key(), None);
    }

    #[test]
    fn test_resolved_defaults() {
        let config = ProviderConfig::default();
        assert_eq!(config.provider_type, "mistral");
        assert_eq!(config.resolved_base_url(), "https://api.mistral.ai");
        assert_eq!(config.resolved_model(), "mistral-small-latest");

        let config = config
            .with_base_url("http://localhost:9999")
            .with_default_model("mistral-large-latest");
        assert_eq!(config.resolved_base_url(), "http://localhost:9999");
        assert_eq!(config.resolved_model(), "mistral-large-latest");
    }

    #[test]
    fn test_generation_defaults() {
        let generation = GenerationConfig::default();
        assert_eq!(generation.temperature, 0.4);
        assert_eq!(generation.max_tokens, 1200);
        assert_eq!(generation.top_p, 1.0);
    }

    #[test]
    fn test_partial_deserialize() {
        let config: ProviderConfig = serde_json::from_str(r#"{"api_key_env":"MY_KEY"}"#).unwrap();
        assert_eq!(config.provider_type, "mistral");
        assert_eq!(config.api_key_env.as_deref(), Some("MY_KEY"));

        let generation: GenerationConfig = serde_json::from_str(r#"{"max_tokens":64}"#).unwrap();
        assert_eq!(generation.max_tokens, 64);
        assert_eq!(generation.temperature, 0.4);
    }
}
