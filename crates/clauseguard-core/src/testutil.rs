//! Shared test doubles for the core crate's unit tests.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::UpstreamError;

/// Deterministic test embedder: known texts map to fixed vectors,
/// everything else lands on a vector orthogonal to the registered ones.
pub(crate) struct StaticEmbedder {
    dims: usize,
    map: HashMap<String, Vec<f32>>,
    fail: bool,
}

impl StaticEmbedder {
    pub(crate) fn new(dims: usize, entries: &[(&str, &[f32])]) -> Self {
        let map = entries
            .iter()
            .map(|(text, vec)| (text.to_string(), vec.to_vec()))
            .collect();
        Self {
            dims,
            map,
            fail: false,
        }
    }

    /// An embedder whose every call fails, for stage-attribution tests.
    pub(crate) fn failing(dims: usize) -> Self {
        Self {
            dims,
            map: HashMap::new(),
            fail: true,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbedder {
    fn model_name(&self) -> &str {
        "static-test-embedder"
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
        if self.fail {
            return Err(UpstreamError::Unavailable("embedder offline".into()));
        }
        if let Some(vec) = self.map.get(text) {
            return Ok(vec.clone());
        }
        let mut far = vec![0.0; self.dims];
        if let Some(last) = far.last_mut() {
            *last = 10.0;
        }
        Ok(far)
    }
}
