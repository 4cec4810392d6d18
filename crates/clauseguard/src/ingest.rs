//! Document ingestion pipeline.
//!
//! Read a UTF-8 text file, dedup against previously ingested content by
//! SHA-256, chunk, embed, persist, and rebuild the document's index
//! artifact. Re-ingesting identical content is a no-op that reports the
//! existing document id.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use clauseguard_core::chunk::chunk_text;
use clauseguard_core::embedding::EmbeddingProvider;

use crate::config::Config;
use crate::indexer::build_document_index;
use crate::store::SqliteChunkStore;

/// Outcome of one ingestion run.
pub struct IngestOutcome {
    pub document_id: i64,
    pub chunk_count: usize,
    /// True when the content hash matched an existing document and
    /// nothing was written.
    pub deduplicated: bool,
}

/// Hex SHA-256 of the document body, used as the dedup key.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Ingest one text file end to end.
pub async fn ingest_file(
    config: &Config,
    store: &SqliteChunkStore,
    provider: &dyn EmbeddingProvider,
    path: &Path,
    title: Option<&str>,
) -> Result<IngestOutcome> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read document: {}", path.display()))?;
    if text.trim().is_empty() {
        anyhow::bail!("Document is empty: {}", path.display());
    }

    let hash = content_hash(&text);
    if let Some(existing) = store.find_document_by_hash(&hash).await? {
        tracing::info!(document_id = existing, "duplicate content, skipping ingest");
        return Ok(IngestOutcome {
            document_id: existing,
            chunk_count: 0,
            deduplicated: true,
        });
    }

    let chunks = chunk_text(
        &text,
        config.chunking.chunk_size,
        config.chunking.overlap,
    );
    tracing::info!(chunks = chunks.len(), path = %path.display(), "chunked document");

    let document_id = store.insert_document(title, &text, &hash).await?;
    let chunk_ids = store.insert_chunks(document_id, &chunks).await?;

    let vectors = provider.embed_batch(&chunks).await?;
    for (chunk_id, vector) in chunk_ids.iter().zip(vectors.iter()) {
        store.attach_vector(*chunk_id, vector).await?;
    }

    build_document_index(store, &config.index.dir, document_id).await?;

    Ok(IngestOutcome {
        document_id,
        chunk_count: chunks.len(),
        deduplicated: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_stable_hex() {
        let hash = content_hash("Termsheet body");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, content_hash("Termsheet body"));
        assert_ne!(hash, content_hash("Termsheet body."));
    }
}
