//! Index artifact construction and persistence.
//!
//! Builds [`VectorIndex`] artifacts from embedded chunks in the store
//! and writes them to disk in matched pairs:
//!
//! | artifact | contents |
//! |----------|----------|
//! | `doc_{id}.idx` / `doc_{id}.ids` | one document's chunk vectors |
//! | `chat.idx` / `chat.ids` | every embedded chunk across documents |
//!
//! Writes are atomic: both files land under temporary names first, then
//! rename over the previous artifacts. A crash mid-rebuild leaves the
//! old pair intact, never a half-written index.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use clauseguard_core::error::IndexError;
use clauseguard_core::index::{encode_id_map, VectorIndex};
use clauseguard_core::models::StoredChunk;
use clauseguard_core::store::ChunkStore;

/// Paths for one document's index artifact pair.
pub fn document_index_paths(dir: &Path, document_id: i64) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("doc_{document_id}.idx")),
        dir.join(format!("doc_{document_id}.ids")),
    )
}

/// Paths for the cross-document chat index artifact pair.
pub fn chat_index_paths(dir: &Path) -> (PathBuf, PathBuf) {
    (dir.join("chat.idx"), dir.join("chat.ids"))
}

/// Build and persist the index for a single document's chunks.
///
/// Returns the number of vectors indexed. Fails with
/// [`IndexError::EmptyInput`] if the document has no embedded chunks.
pub async fn build_document_index(
    store: &dyn ChunkStore,
    dir: &Path,
    document_id: i64,
) -> Result<usize> {
    let chunks = store.chunks_for_document(document_id).await?;
    let embedded: Vec<StoredChunk> = chunks.into_iter().filter(|c| c.vector.is_some()).collect();

    let (index_path, ids_path) = document_index_paths(dir, document_id);
    let count = write_index(&embedded, &index_path, &ids_path).await?;
    tracing::info!(document_id, vectors = count, "document index rebuilt");
    Ok(count)
}

/// Build and persist the chat index over every embedded chunk.
pub async fn build_chat_index(store: &dyn ChunkStore, dir: &Path) -> Result<usize> {
    let embedded = store.embedded_chunks().await?;
    let (index_path, ids_path) = chat_index_paths(dir);
    let count = write_index(&embedded, &index_path, &ids_path).await?;
    tracing::info!(vectors = count, "chat index rebuilt");
    Ok(count)
}

async fn write_index(
    chunks: &[StoredChunk],
    index_path: &Path,
    ids_path: &Path,
) -> Result<usize> {
    if chunks.is_empty() {
        return Err(IndexError::EmptyInput.into());
    }

    let mut vectors = Vec::with_capacity(chunks.len());
    let mut ids = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        // Caller filtered, so the vector is always present.
        if let Some(vector) = &chunk.vector {
            vectors.push(vector.clone());
            ids.push(chunk.id);
        }
    }

    let index = VectorIndex::build(&vectors)?;

    if let Some(parent) = index_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    atomic_write(index_path, &index.to_bytes()).await?;
    atomic_write(ids_path, &encode_id_map(&ids)).await?;
    Ok(index.len())
}

/// Write via a temporary sibling then rename into place.
async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("artifact");
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to move artifact into place: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clauseguard_core::store::memory::InMemoryChunkStore;

    #[tokio::test]
    async fn document_index_skips_unembedded_chunks() {
        let store = InMemoryChunkStore::new();
        store.push(1, 0, "embedded chunk", Some(vec![1.0, 0.0]));
        store.push(1, 1, "pending chunk", None);
        store.push(2, 0, "other document", Some(vec![0.0, 1.0]));

        let dir = tempfile::tempdir().unwrap();
        let count = build_document_index(&store, dir.path(), 1).await.unwrap();
        assert_eq!(count, 1);

        let (index_path, ids_path) = document_index_paths(dir.path(), 1);
        assert!(index_path.exists());
        assert!(ids_path.exists());
    }

    #[tokio::test]
    async fn document_without_embedded_chunks_is_an_error() {
        let store = InMemoryChunkStore::new();
        store.push(1, 0, "pending", None);

        let dir = tempfile::tempdir().unwrap();
        let err = build_document_index(&store, dir.path(), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<IndexError>(),
            Some(IndexError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn chat_index_spans_documents() {
        let store = InMemoryChunkStore::new();
        store.push(1, 0, "first", Some(vec![1.0, 0.0]));
        store.push(2, 0, "second", Some(vec![0.0, 1.0]));

        let dir = tempfile::tempdir().unwrap();
        let count = build_chat_index(&store, dir.path()).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn rebuild_replaces_previous_artifacts() {
        let store = InMemoryChunkStore::new();
        store.push(1, 0, "first", Some(vec![1.0, 0.0]));

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(build_chat_index(&store, dir.path()).await.unwrap(), 1);

        store.push(1, 1, "second", Some(vec![0.0, 1.0]));
        assert_eq!(build_chat_index(&store, dir.path()).await.unwrap(), 2);

        let (index_path, _) = chat_index_paths(dir.path());
        let index = VectorIndex::from_bytes(&std::fs::read(index_path).unwrap()).unwrap();
        assert_eq!(index.len(), 2);
    }
}
