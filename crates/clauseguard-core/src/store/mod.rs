//! Chunk storage abstraction.
//!
//! The [`ChunkStore`] trait supplies ordered text chunks per document
//! and their precomputed embeddings. The application crate implements
//! it over SQLite; [`memory::InMemoryChunkStore`] backs tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::StoredChunk;

/// Abstract chunk/document store consumed by the indexing pipeline.
///
/// Chunk uniqueness key is `(document_id, chunk_index)`; chunks are
/// returned ordered by `chunk_index`.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// All chunks belonging to one document, ordered by `chunk_index`.
    async fn chunks_for_document(&self, document_id: i64) -> Result<Vec<StoredChunk>>;

    /// Every chunk across all documents that has an attached embedding,
    /// ordered by `(document_id, chunk_index)`. Chunks without a vector
    /// are skipped.
    async fn embedded_chunks(&self) -> Result<Vec<StoredChunk>>;
}
