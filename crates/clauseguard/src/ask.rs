//! Cross-document question answering (retrieval only).
//!
//! Embeds the question, queries the persisted chat index, and resolves
//! the returned chunk ids to their stored text. No generation step:
//! the command surfaces the evidence chunks themselves, ranked by
//! similarity.

use anyhow::{Context, Result};

use clauseguard_core::embedding::EmbeddingProvider;

use crate::config::Config;
use crate::indexer::chat_index_paths;
use crate::retriever::Retriever;
use crate::store::SqliteChunkStore;

/// One retrieved answer chunk.
#[derive(Debug)]
pub struct AnswerChunk {
    pub chunk_id: i64,
    pub document_id: i64,
    pub similarity: f32,
    pub text: String,
}

/// Answer a question by retrieval over the chat index.
pub async fn ask(
    config: &Config,
    store: &SqliteChunkStore,
    provider: &dyn EmbeddingProvider,
    question: &str,
    top_k: usize,
) -> Result<Vec<AnswerChunk>> {
    let (index_path, ids_path) = chat_index_paths(&config.index.dir);
    let retriever = Retriever::open(&index_path, &ids_path)
        .context("Chat index not available; run `clauseguard index chat` first")?;

    let query = provider.embed(question).await?;
    let hits = retriever.query(&query, top_k)?;

    let mut answers = Vec::with_capacity(hits.len());
    for (chunk_id, distance) in hits {
        // Same distance→similarity mapping as clause matching.
        let similarity = 1.0 / (1.0 + distance);
        // The id map came from the store, so a missing chunk means the
        // index is stale relative to the database.
        let chunk = store
            .chunk_by_id(chunk_id)
            .await?
            .with_context(|| format!("Chunk {chunk_id} is indexed but no longer stored"))?;
        answers.push(AnswerChunk {
            chunk_id,
            document_id: chunk.document_id,
            similarity,
            text: chunk.text,
        });
    }

    tracing::debug!(hits = answers.len(), "chat retrieval complete");
    Ok(answers)
}
