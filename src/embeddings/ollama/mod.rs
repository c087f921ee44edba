
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{EmbeddingError, EmbeddingVector, Embedder};
use crate::config::{ConfigError, OllamaConfig};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_EMBEDDING_DIMENSION: u32 = 768;
pub const DEFAULT_MAX_INPUT_CHARS: usize = 32_768;

/// Embedding client backed by an Ollama server.
///
/// The client holds no per-request state; clones share the underlying
/// connection pool, so one instance can serve any number of concurrent
/// `embed` calls without locking.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    base_url: Url,
    model: String,
    embedding_dimension: usize,
    max_input_chars: usize,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    #[serde(rename = "input")]
    inputs: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: Option<u64>,
    pub digest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}

impl OllamaClient {
    #[inline]
    pub fn new(config: &OllamaConfig) -> Result<Self, ConfigError> {
        let base_url = config.ollama_url()?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.model.clone(),
            embedding_dimension: config.embedding_dimension as usize,
            max_input_chars: config.max_input_chars,
            agent,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    #[inline]
    pub fn embedding_dimension(&self) -> usize {
        self.embedding_dimension
    }

    /// Test connection to Ollama server and verify model availability
    #[inline]
    pub fn health_check(&self) -> Result<()> {
        debug!("Performing health check for Ollama at {}", self.base_url);

        // First check if server is reachable
        self.ping().context("Server ping failed")?;

        // Then check if model is available
        self.validate_model().context("Model validation failed")?;

        info!(
            "Health check passed for Ollama server at {} with model {}",
            self.base_url, self.model
        );
        Ok(())
    }

    /// Ping the Ollama server to check if it's responsive
    #[inline]
    pub fn ping(&self) -> Result<()> {
        let url = self
            .base_url
            .join("/api/version")
            .context("Failed to build ping URL")?;

        debug!("Pinging Ollama server at {}", url);
        self.get_text(&url)
            .context("Failed to ping Ollama server")?;

        debug!("Server ping successful");
        Ok(())
    }

    /// Validate that the configured model is available
    #[inline]
    pub fn validate_model(&self) -> Result<()> {
        debug!("Validating model: {}", self.model);

        let models = self.list_models().context("Failed to list models")?;

        if models.iter().any(|m| self.matches_model(&m.name)) {
            debug!("Model {} is available", self.model);
            Ok(())
        } else {
            let available_models: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
            warn!(
                "Model {} not found. Available models: {:?}",
                self.model, available_models
            );
            Err(anyhow::anyhow!(
                "Model '{}' is not available. Available models: {:?}",
                self.model,
                available_models
            ))
        }
    }

    /// List all available models
    #[inline]
    pub fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = self
            .base_url
            .join("/api/tags")
            .context("Failed to build models URL")?;

        debug!("Fetching available models from {}", url);

        let response_text = self.get_text(&url).context("Failed to fetch models")?;

        let models_response: ModelsResponse =
            serde_json::from_str(&response_text).context("Failed to parse models response")?;

        debug!("Found {} models", models_response.models.len());
        Ok(models_response.models)
    }

    /// Generate an embedding for a single text input.
    ///
    /// Blocks the calling thread for the duration of the request.
    #[inline]
    pub fn generate_embedding(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        self.check_input(text)?;
        debug!("Generating embedding for text (length: {})", text.len());

        let request = EmbedRequest {
            model: &self.model,
            inputs: [text],
        };

        let url = self
            .base_url
            .join("/api/embed")
            .map_err(|e| EmbeddingError::Unavailable(format!("invalid embed URL: {}", e)))?;

        let request_json = serde_json::to_string(&request)
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let response_text = self.post_json(&url, &request_json)?;

        let embed_response: EmbedResponse = serde_json::from_str(&response_text)
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        let Some(embedding) = embed_response.embeddings.into_iter().next() else {
            return Err(EmbeddingError::InvalidResponse(
                "response contained no embeddings".to_string(),
            ));
        };

        if embedding.len() != self.embedding_dimension {
            return Err(EmbeddingError::UnexpectedDimension {
                expected: self.embedding_dimension,
                actual: embedding.len(),
            });
        }

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    fn check_input(&self, text: &str) -> Result<(), EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let length = text.chars().count();
        if length > self.max_input_chars {
            return Err(EmbeddingError::InputTooLarge {
                length,
                limit: self.max_input_chars,
            });
        }

        Ok(())
    }

    /// Ollama reports models with an explicit tag; an untagged name means `latest`
    fn matches_model(&self, name: &str) -> bool {
        if name == self.model {
            return true;
        }
        !self.model.contains(':') && name == format!("{}:latest", self.model)
    }

    fn get_text(&self, url: &Url) -> Result<String, EmbeddingError> {
        self.agent
            .get(url.as_str())
            .call()
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(map_request_error)
    }

    fn post_json(&self, url: &Url, body: &str) -> Result<String, EmbeddingError> {
        self.agent
            .post(url.as_str())
            .header("Content-Type", "application/json")
            .send(body)
            .and_then(|mut resp| resp.body_mut().read_to_string())
            .map_err(map_request_error)
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        // Reject bad input before paying for a blocking task
        self.check_input(text)?;

        let client = self.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || client.generate_embedding(&text))
            .await
            .map_err(|e| EmbeddingError::Unavailable(format!("embedding task failed: {}", e)))?
    }
}

fn map_request_error(error: ureq::Error) -> EmbeddingError {
    match error {
        ureq::Error::StatusCode(status) => {
            warn!("Ollama returned HTTP {}", status);
            EmbeddingError::Rejected(status)
        }
        other => {
            warn!("Transport error talking to Ollama: {}", other);
            EmbeddingError::Unavailable(other.to_string())
        }
    }
}
