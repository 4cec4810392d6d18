//! Embedding provider implementations.
//!
//! Concrete [`EmbeddingProvider`] backends over HTTP:
//! - **[`OllamaEmbedder`]** — `POST {endpoint}/api/embeddings` against a
//!   local Ollama instance (e.g. `nomic-embed-text`, 768 dims).
//! - **[`OpenAiEmbedder`]** — `POST /v1/embeddings` against the OpenAI
//!   API; requires the `OPENAI_API_KEY` environment variable.
//!
//! Both are constructed once by [`create_provider`] at application
//! startup and passed by handle to every component that needs them; no
//! global model state. Failures are terminal for the calling request —
//! the core mandates no retry policy — and a response whose vector
//! length disagrees with the configured dimensionality is rejected as
//! malformed rather than poisoning an index build later.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use clauseguard_core::embedding::EmbeddingProvider;
use clauseguard_core::error::UpstreamError;

use crate::config::EmbeddingConfig;

/// Instantiate the configured embedding provider.
pub fn create_provider(config: &EmbeddingConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "ollama" => Ok(Arc::new(OllamaEmbedder::new(config)?)),
        "openai" => Ok(Arc::new(OpenAiEmbedder::new(config)?)),
        other => anyhow::bail!("Unknown embedding provider: {other}"),
    }
}

fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()?)
}

/// Check a returned vector against the configured dimensionality.
fn check_dims(model: &str, expected: usize, vector: Vec<f32>) -> Result<Vec<f32>, UpstreamError> {
    if vector.len() != expected {
        return Err(UpstreamError::Malformed(format!(
            "model '{model}' returned a {}-dim vector, expected {expected}",
            vector.len()
        )));
    }
    Ok(vector)
}

// ============ Ollama ============

/// Embedding provider backed by a local Ollama server.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    dims: usize,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dims: config.dims,
        })
    }
}

#[derive(Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
        let url = format!("{}/api/embeddings", self.endpoint);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "model": self.model,
                "prompt": text,
            }))
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "embedding service returned HTTP {}",
                response.status()
            )));
        }

        let parsed: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(format!("embedding response: {e}")))?;
        check_dims(&self.model, self.dims, parsed.embedding)
    }
}

// ============ OpenAI ============

/// Embedding provider using the OpenAI embeddings API.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    model: String,
    dims: usize,
    api_key: String,
}

impl OpenAiEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set for provider 'openai'"))?;
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            model: config.model.clone(),
            dims: config.dims,
            api_key,
        })
    }
}

#[derive(Deserialize)]
struct OpenAiEmbeddingResponse {
    data: Vec<OpenAiEmbeddingItem>,
}

#[derive(Deserialize)]
struct OpenAiEmbeddingItem {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "input": [text],
            }))
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "embedding service returned HTTP {}",
                response.status()
            )));
        }

        let parsed: OpenAiEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(format!("embedding response: {e}")))?;
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| UpstreamError::Malformed("empty embedding response".into()))?;
        check_dims(&self.model, self.dims, vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, UpstreamError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let response = self
            .client
            .post("https://api.openai.com/v1/embeddings")
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "input": texts,
            }))
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Unavailable(format!(
                "embedding service returned HTTP {}",
                response.status()
            )));
        }

        let parsed: OpenAiEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Malformed(format!("embedding response: {e}")))?;
        if parsed.data.len() != texts.len() {
            return Err(UpstreamError::Malformed(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                parsed.data.len()
            )));
        }
        parsed
            .data
            .into_iter()
            .map(|item| check_dims(&self.model, self.dims, item.embedding))
            .collect()
    }
}
