//! In-memory [`ChunkStore`] implementation for tests.
//!
//! Uses a `Vec` behind `std::sync::RwLock` for thread safety. Returned
//! chunks are sorted the same way the SQLite store orders them.

use std::sync::RwLock;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::StoredChunk;

use super::ChunkStore;

/// In-memory chunk store for tests.
#[derive(Default)]
pub struct InMemoryChunkStore {
    chunks: RwLock<Vec<StoredChunk>>,
}

impl InMemoryChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chunk, assigning it the next available id.
    pub fn push(&self, document_id: i64, chunk_index: i64, text: &str, vector: Option<Vec<f32>>) {
        let mut chunks = self.chunks.write().expect("chunk store lock poisoned");
        let id = chunks.len() as i64 + 1;
        chunks.push(StoredChunk {
            id,
            document_id,
            chunk_index,
            text: text.to_string(),
            vector,
        });
    }
}

#[async_trait]
impl ChunkStore for InMemoryChunkStore {
    async fn chunks_for_document(&self, document_id: i64) -> Result<Vec<StoredChunk>> {
        let chunks = self.chunks.read().expect("chunk store lock poisoned");
        let mut out: Vec<StoredChunk> = chunks
            .iter()
            .filter(|c| c.document_id == document_id)
            .cloned()
            .collect();
        out.sort_by_key(|c| c.chunk_index);
        Ok(out)
    }

    async fn embedded_chunks(&self) -> Result<Vec<StoredChunk>> {
        let chunks = self.chunks.read().expect("chunk store lock poisoned");
        let mut out: Vec<StoredChunk> = chunks
            .iter()
            .filter(|c| c.vector.is_some())
            .cloned()
            .collect();
        out.sort_by_key(|c| (c.document_id, c.chunk_index));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn chunks_come_back_ordered() {
        let store = InMemoryChunkStore::new();
        store.push(1, 2, "third", None);
        store.push(1, 0, "first", Some(vec![0.1, 0.2]));
        store.push(1, 1, "second", Some(vec![0.3, 0.4]));
        store.push(2, 0, "other doc", Some(vec![0.5, 0.6]));

        let doc1 = store.chunks_for_document(1).await.unwrap();
        assert_eq!(doc1.len(), 3);
        assert_eq!(doc1[0].text, "first");
        assert_eq!(doc1[2].text, "third");

        let embedded = store.embedded_chunks().await.unwrap();
        assert_eq!(embedded.len(), 3);
        assert!(embedded.iter().all(|c| c.vector.is_some()));
    }
}
