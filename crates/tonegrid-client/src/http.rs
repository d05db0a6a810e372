//! HTTP client for the transform endpoint.
//!
//! `POST {base}/api/tone` answers either `{transformed, cached}` or the
//! error envelope `{error: {code, message, retryAfterMs?}}`. Both decode to a
//! typed result here; anything else is a [`ClientError::Decode`].

use async_trait::async_trait;
use parking_lot::RwLock;
use tonegrid_types::{ErrorEnvelope, HealthResponse, TransformRequest, TransformResponse};

use crate::constants::{
    CLIENT_REQUEST_TIMEOUT, DEFAULT_PROMPT_VERSION, DEFAULT_SERVER_URL, HEALTH_PATH, TONE_PATH,
};
use crate::error::ClientError;

/// Something that can run a transform request.
///
/// Implemented by [`ToneClient`]; tests substitute scripted services.
#[async_trait]
pub trait ToneService: Send + Sync {
    /// Prompt version to stamp on outgoing requests.
    fn prompt_version(&self) -> String;

    async fn transform(&self, request: &TransformRequest) -> Result<TransformResponse, ClientError>;
}

pub struct ToneClient {
    http: reqwest::Client,
    base_url: String,
    prompt_version: RwLock<String>,
}

impl std::fmt::Debug for ToneClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToneClient")
            .field("base_url", &self.base_url)
            .field("prompt_version", &*self.prompt_version.read())
            .finish()
    }
}

impl ToneClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(CLIENT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            prompt_version: RwLock::new(DEFAULT_PROMPT_VERSION.to_string()),
        })
    }

    /// Client for the local development server.
    pub fn local() -> Result<Self, ClientError> {
        Self::new(DEFAULT_SERVER_URL)
    }

    pub fn with_prompt_version(self, version: impl Into<String>) -> Self {
        *self.prompt_version.write() = version.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query the server's health endpoint.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let response = self.http.get(&url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ClientError::Decode {
            status,
            detail: e.to_string(),
        })
    }

    /// Adopt the prompt version the server currently serves. Returns it.
    pub async fn refresh_prompt_version(&self) -> Result<String, ClientError> {
        let health = self.health().await?;
        *self.prompt_version.write() = health.prompt_version.clone();
        tracing::info!(version = %health.prompt_version, "prompt version refreshed");
        Ok(health.prompt_version)
    }
}

#[async_trait]
impl ToneService for ToneClient {
    fn prompt_version(&self) -> String {
        self.prompt_version.read().clone()
    }

    async fn transform(&self, request: &TransformRequest) -> Result<TransformResponse, ClientError> {
        let url = format!("{}{}", self.base_url, TONE_PATH);
        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return serde_json::from_str::<TransformResponse>(&body).map_err(|e| {
                ClientError::Decode {
                    status: status.as_u16(),
                    detail: e.to_string(),
                }
            });
        }

        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => Err(ClientError::Api(envelope.error)),
            Err(_) => Err(ClientError::Decode {
                status: status.as_u16(),
                detail: body.chars().take(200).collect(),
            }),
        }
    }
}
