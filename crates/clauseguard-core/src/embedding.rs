//! Embedding provider trait.
//!
//! The embedding model is an external collaborator: text goes in, a
//! fixed-dimension vector comes out. The core never owns a model
//! handle — the application constructs one provider at startup and
//! passes it by reference to every component that needs it, so there is
//! no hidden global state and tests can substitute a deterministic
//! stub.

use async_trait::async_trait;

use crate::error::UpstreamError;

/// Trait for embedding providers.
///
/// Implementations must be `Send + Sync`; calls are potentially slow
/// network operations and are awaited individually with no shared lock
/// held across the call.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier (e.g. `"nomic-embed-text"`).
    fn model_name(&self) -> &str;

    /// Embedding vector dimensionality (e.g. `768`).
    fn dims(&self) -> usize;

    /// Embed a single text. A failure is fatal for the calling
    /// operation; no retry is mandated.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError>;

    /// Embed a batch of texts, preserving order.
    ///
    /// The default implementation embeds one text at a time; providers
    /// with a batch endpoint should override it.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, UpstreamError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}
