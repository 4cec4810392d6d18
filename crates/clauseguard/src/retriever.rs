//! Chat retrieval over persisted index artifacts.
//!
//! [`Retriever`] loads an index/id-map pair from disk and answers
//! nearest-neighbor queries with chunk ids instead of raw positions.
//! The two artifacts are cross-checked on open: a count disagreement
//! means one of them was replaced without the other and the pair is
//! rejected as corrupt rather than silently returning wrong ids.

use std::path::Path;

use anyhow::{Context, Result};

use clauseguard_core::error::IndexError;
use clauseguard_core::index::{decode_id_map, VectorIndex};

/// A loaded index/id-map pair ready for querying.
#[derive(Debug)]
pub struct Retriever {
    index: VectorIndex,
    ids: Vec<i64>,
}

impl Retriever {
    /// Load an artifact pair from disk.
    pub fn open(index_path: &Path, ids_path: &Path) -> Result<Self> {
        let index_bytes = std::fs::read(index_path)
            .with_context(|| format!("Failed to read index artifact: {}", index_path.display()))?;
        let ids_bytes = std::fs::read(ids_path)
            .with_context(|| format!("Failed to read id-map artifact: {}", ids_path.display()))?;

        let index = VectorIndex::from_bytes(&index_bytes)?;
        let ids = decode_id_map(&ids_bytes)?;
        if ids.len() != index.len() {
            return Err(IndexError::CorruptArtifact(format!(
                "index holds {} vectors but id map holds {} ids",
                index.len(),
                ids.len()
            ))
            .into());
        }

        Ok(Self { index, ids })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Nearest chunks for a query vector: `(chunk_id, squared L2
    /// distance)` pairs, nearest first.
    pub fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<(i64, f32)>, IndexError> {
        let hits = self.index.search(vector, top_k)?;
        Ok(hits
            .into_iter()
            .map(|(position, distance)| (self.ids[position], distance))
            .collect())
    }
}
