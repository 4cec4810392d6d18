//! Exact nearest-neighbor vector index.
//!
//! [`VectorIndex`] performs brute-force squared-L2 search against every
//! stored vector — no approximation, no pruning. Corpora here are
//! per-document or per-reference-set bounded (hundreds to low thousands
//! of vectors), and compliance-grade matching requires exactness: an
//! approximate method would silently alter audit results.
//!
//! # Determinism
//!
//! Results are sorted by ascending distance; ties are broken by smaller
//! position (insertion order), so the same index and query always
//! produce the same ranking.
//!
//! # Persistence
//!
//! An index serializes to a versioned binary artifact: a magic tag,
//! format version, dimensionality, vector count, and the little-endian
//! `f32` payload. The position→id mapping that owning components keep
//! alongside the index has its own fixed-width codec
//! ([`encode_id_map`] / [`decode_id_map`]); both files must be present
//! and agree on the count, or loading fails with
//! [`IndexError::CorruptArtifact`].
//!
//! Round-trip contract: `from_bytes(to_bytes(build(V)))` produces
//! bit-identical search results to `build(V)` for any query.

use crate::error::IndexError;

/// Magic tag for the index artifact.
const INDEX_MAGIC: &[u8; 4] = b"CGVI";
/// Magic tag for the position→id mapping artifact.
const ID_MAP_MAGIC: &[u8; 4] = b"CGID";
/// Bumped whenever the artifact layout changes.
const FORMAT_VERSION: u32 = 1;

/// An immutable, build-once exact L2 index over fixed-dimension vectors.
///
/// Vectors are stored flat, row-major, in insertion order. Once built
/// the index is read-only; concurrent searches need no synchronization.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    dim: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// Build an index from an ordered sequence of vectors.
    ///
    /// # Errors
    ///
    /// - [`IndexError::EmptyInput`] if `vectors` is empty (or the first
    ///   vector has zero length).
    /// - [`IndexError::DimensionMismatch`] if any vector's length
    ///   differs from the first's.
    pub fn build(vectors: &[Vec<f32>]) -> Result<Self, IndexError> {
        let first = vectors.first().ok_or(IndexError::EmptyInput)?;
        let dim = first.len();
        if dim == 0 {
            return Err(IndexError::EmptyInput);
        }

        let mut data = Vec::with_capacity(dim * vectors.len());
        for vector in vectors {
            if vector.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self { dim, data })
    }

    /// Dimensionality shared by every vector in this index.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of indexed vectors.
    pub fn len(&self) -> usize {
        self.data.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Exact k-nearest-neighbor search.
    ///
    /// Returns `(position, squared_l2_distance)` pairs sorted by
    /// ascending distance (ties by smaller position), of length
    /// `min(k, len)`.
    ///
    /// # Errors
    ///
    /// [`IndexError::DimensionMismatch`] if the query length differs
    /// from the index dimensionality.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }

        let mut hits: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(position, row)| (position, squared_l2(query, row)))
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        hits.truncate(k);
        Ok(hits)
    }

    /// Serialize to the binary artifact format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let count = self.len() as u64;
        let mut bytes = Vec::with_capacity(20 + self.data.len() * 4);
        bytes.extend_from_slice(INDEX_MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dim as u32).to_le_bytes());
        bytes.extend_from_slice(&count.to_le_bytes());
        for &value in &self.data {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        bytes
    }

    /// Deserialize from the binary artifact format.
    ///
    /// # Errors
    ///
    /// [`IndexError::CorruptArtifact`] on a bad magic tag, unsupported
    /// version, zero dimensionality/count, or a payload whose size
    /// disagrees with the header.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexError> {
        if bytes.len() < 20 {
            return Err(IndexError::CorruptArtifact(format!(
                "index artifact truncated: {} bytes",
                bytes.len()
            )));
        }
        if &bytes[0..4] != INDEX_MAGIC {
            return Err(IndexError::CorruptArtifact(
                "bad magic tag; not an index artifact".into(),
            ));
        }
        let version = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        if version != FORMAT_VERSION {
            return Err(IndexError::CorruptArtifact(format!(
                "unsupported artifact version {version}"
            )));
        }
        let dim = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
        let count = u64::from_le_bytes(bytes[12..20].try_into().unwrap()) as usize;
        if dim == 0 || count == 0 {
            return Err(IndexError::CorruptArtifact(format!(
                "header declares dim={dim}, count={count}"
            )));
        }
        let expected_payload = dim
            .checked_mul(count)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| IndexError::CorruptArtifact("header overflows payload size".into()))?;
        let payload = &bytes[20..];
        if payload.len() != expected_payload {
            return Err(IndexError::CorruptArtifact(format!(
                "payload is {} bytes, header implies {}",
                payload.len(),
                expected_payload
            )));
        }

        let data = payload
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        Ok(Self { dim, data })
    }
}

/// Encode a position→id mapping as a fixed-width binary artifact.
pub fn encode_id_map(ids: &[i64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(12 + ids.len() * 8);
    bytes.extend_from_slice(ID_MAP_MAGIC);
    bytes.extend_from_slice(&(ids.len() as u64).to_le_bytes());
    for &id in ids {
        bytes.extend_from_slice(&id.to_le_bytes());
    }
    bytes
}

/// Decode a position→id mapping artifact.
///
/// # Errors
///
/// [`IndexError::CorruptArtifact`] on a bad magic tag or a payload that
/// disagrees with the declared count.
pub fn decode_id_map(bytes: &[u8]) -> Result<Vec<i64>, IndexError> {
    if bytes.len() < 12 {
        return Err(IndexError::CorruptArtifact(format!(
            "id map truncated: {} bytes",
            bytes.len()
        )));
    }
    if &bytes[0..4] != ID_MAP_MAGIC {
        return Err(IndexError::CorruptArtifact(
            "bad magic tag; not an id-map artifact".into(),
        ));
    }
    let count = u64::from_le_bytes(bytes[4..12].try_into().unwrap()) as usize;
    let payload = &bytes[12..];
    let expected = count
        .checked_mul(8)
        .ok_or_else(|| IndexError::CorruptArtifact("id-map header overflows".into()))?;
    if payload.len() != expected {
        return Err(IndexError::CorruptArtifact(format!(
            "id-map payload is {} bytes, header implies {}",
            payload.len(),
            expected
        )));
    }
    Ok(payload
        .chunks_exact(8)
        .map(|b| i64::from_le_bytes(b.try_into().unwrap()))
        .collect())
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vectors() -> Vec<Vec<f32>> {
        vec![
            vec![1.0, 0.0, 0.0],
            vec![0.9, 0.1, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ]
    }

    #[test]
    fn build_empty_fails() {
        assert!(matches!(
            VectorIndex::build(&[]),
            Err(IndexError::EmptyInput)
        ));
    }

    #[test]
    fn build_mismatched_dims_fails() {
        let vectors = vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]];
        assert!(matches!(
            VectorIndex::build(&vectors),
            Err(IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn search_returns_ascending_distances() {
        let index = VectorIndex::build(&sample_vectors()).unwrap();
        let hits = index.search(&[1.0, 0.0, 0.0], 4).unwrap();
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0], (0, 0.0));
        assert_eq!(hits[1].0, 1);
        for pair in hits.windows(2) {
            assert!(pair[0].1 <= pair[1].1);
        }
    }

    #[test]
    fn search_breaks_ties_by_position() {
        // Two identical vectors: equal distance, insertion order wins.
        let vectors = vec![vec![0.5, 0.5], vec![0.5, 0.5], vec![1.0, 0.0]];
        let index = VectorIndex::build(&vectors).unwrap();
        let hits = index.search(&[0.5, 0.5], 3).unwrap();
        assert_eq!(hits[0], (0, 0.0));
        assert_eq!(hits[1], (1, 0.0));
        assert_eq!(hits[2].0, 2);
    }

    #[test]
    fn search_k_larger_than_len_returns_all_once() {
        let index = VectorIndex::build(&sample_vectors()).unwrap();
        let hits = index.search(&[0.0, 0.0, 0.0], 100).unwrap();
        assert_eq!(hits.len(), 4);
        let mut positions: Vec<usize> = hits.iter().map(|h| h.0).collect();
        positions.sort_unstable();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn search_query_dim_mismatch_fails() {
        let index = VectorIndex::build(&sample_vectors()).unwrap();
        assert!(matches!(
            index.search(&[1.0, 0.0], 1),
            Err(IndexError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn artifact_round_trip_is_bit_identical() {
        let index = VectorIndex::build(&sample_vectors()).unwrap();
        let restored = VectorIndex::from_bytes(&index.to_bytes()).unwrap();
        assert_eq!(index, restored);

        let query = [0.3, 0.4, 0.5];
        let before = index.search(&query, 4).unwrap();
        let after = restored.search(&query, 4).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn from_bytes_rejects_bad_magic() {
        let mut bytes = VectorIndex::build(&sample_vectors()).unwrap().to_bytes();
        bytes[0] = b'X';
        assert!(matches!(
            VectorIndex::from_bytes(&bytes),
            Err(IndexError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn from_bytes_rejects_truncated_payload() {
        let mut bytes = VectorIndex::build(&sample_vectors()).unwrap().to_bytes();
        bytes.truncate(bytes.len() - 4);
        assert!(matches!(
            VectorIndex::from_bytes(&bytes),
            Err(IndexError::CorruptArtifact(_))
        ));
    }

    #[test]
    fn id_map_round_trip() {
        let ids = vec![7i64, 42, -1, 9_000_000_000];
        let decoded = decode_id_map(&encode_id_map(&ids)).unwrap();
        assert_eq!(ids, decoded);
    }

    #[test]
    fn id_map_rejects_count_mismatch() {
        let mut bytes = encode_id_map(&[1, 2, 3]);
        bytes.extend_from_slice(&0i64.to_le_bytes());
        assert!(matches!(
            decode_id_map(&bytes),
            Err(IndexError::CorruptArtifact(_))
        ));
    }
}
