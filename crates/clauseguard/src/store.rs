//! SQLite-backed [`ChunkStore`] implementation.
//!
//! Documents carry a SHA-256 dedup hash; chunks are keyed
//! `(document_id, chunk_index)` and hold their embedding as an optional
//! BLOB of little-endian `f32` bytes. The vector is attached once after
//! embedding and never mutated afterwards.

use anyhow::Result;
use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use clauseguard_core::models::StoredChunk;
use clauseguard_core::store::ChunkStore;

/// Encode a float vector as a BLOB (little-endian f32 bytes).
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// SQLite implementation of the [`ChunkStore`] trait, plus the write
/// operations the ingestion pipeline needs.
pub struct SqliteChunkStore {
    pool: SqlitePool,
}

impl SqliteChunkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a document, returning its id.
    pub async fn insert_document(
        &self,
        title: Option<&str>,
        body: &str,
        dedup_hash: &str,
    ) -> Result<i64> {
        let created_at = chrono::Utc::now().timestamp();
        let result = sqlx::query(
            "INSERT INTO documents (title, body, dedup_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(title)
        .bind(body)
        .bind(dedup_hash)
        .bind(created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Find a document id by its dedup hash.
    pub async fn find_document_by_hash(&self, dedup_hash: &str) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT id FROM documents WHERE dedup_hash = ?")
            .bind(dedup_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<i64, _>("id")))
    }

    /// Insert a document's chunks in order, without vectors.
    /// Returns the chunk ids in `chunk_index` order.
    pub async fn insert_chunks(&self, document_id: i64, texts: &[String]) -> Result<Vec<i64>> {
        let mut ids = Vec::with_capacity(texts.len());
        for (chunk_index, text) in texts.iter().enumerate() {
            let result = sqlx::query(
                "INSERT INTO chunks (document_id, chunk_index, text) VALUES (?, ?, ?)",
            )
            .bind(document_id)
            .bind(chunk_index as i64)
            .bind(text)
            .execute(&self.pool)
            .await?;
            ids.push(result.last_insert_rowid());
        }
        Ok(ids)
    }

    /// Attach an embedding vector to a chunk.
    pub async fn attach_vector(&self, chunk_id: i64, vector: &[f32]) -> Result<()> {
        sqlx::query("UPDATE chunks SET vector = ? WHERE id = ?")
            .bind(vec_to_blob(vector))
            .bind(chunk_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Fetch a single chunk by id.
    pub async fn chunk_by_id(&self, chunk_id: i64) -> Result<Option<StoredChunk>> {
        let row = sqlx::query(
            "SELECT id, document_id, chunk_index, text, vector FROM chunks WHERE id = ?",
        )
        .bind(chunk_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(row_to_chunk))
    }
}

fn row_to_chunk(row: sqlx::sqlite::SqliteRow) -> StoredChunk {
    let vector: Option<Vec<u8>> = row.get("vector");
    StoredChunk {
        id: row.get("id"),
        document_id: row.get("document_id"),
        chunk_index: row.get("chunk_index"),
        text: row.get("text"),
        vector: vector.map(|blob| blob_to_vec(&blob)),
    }
}

#[async_trait]
impl ChunkStore for SqliteChunkStore {
    async fn chunks_for_document(&self, document_id: i64) -> Result<Vec<StoredChunk>> {
        let rows = sqlx::query(
            "SELECT id, document_id, chunk_index, text, vector FROM chunks \
             WHERE document_id = ? ORDER BY chunk_index",
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_chunk).collect())
    }

    async fn embedded_chunks(&self) -> Result<Vec<StoredChunk>> {
        let rows = sqlx::query(
            "SELECT id, document_id, chunk_index, text, vector FROM chunks \
             WHERE vector IS NOT NULL ORDER BY document_id, chunk_index",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(row_to_chunk).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_blob_round_trip() {
        let vec = vec![1.0f32, -2.5, 3.125, 0.0, -0.001];
        assert_eq!(blob_to_vec(&vec_to_blob(&vec)), vec);
    }

    #[test]
    fn blob_length_is_four_bytes_per_float() {
        assert_eq!(vec_to_blob(&[1.0, 2.0, 3.0]).len(), 12);
    }
}
