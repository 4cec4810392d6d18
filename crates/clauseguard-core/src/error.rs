//! Typed failure taxonomy for the validation core.
//!
//! The core never swallows a stage failure into a degraded best-guess
//! result: every error names the component (and for engine failures,
//! the pipeline stage) that produced it, so callers can map failures to
//! user-visible behavior without guessing.

use std::fmt;

use thiserror::Error;

/// Errors from [`VectorIndex`](crate::index::VectorIndex) construction,
/// search, and artifact (de)serialization.
#[derive(Debug, Error)]
pub enum IndexError {
    /// A vector's length disagrees with the index dimensionality.
    /// This is a caller bug, not a recoverable condition.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An index cannot be built from zero vectors — it could never
    /// answer a query meaningfully. Callers must guard before building.
    #[error("cannot build an index from an empty vector set")]
    EmptyInput,

    /// A persisted index or id-mapping artifact is malformed or the two
    /// halves disagree. The only remedy is a rebuild.
    #[error("corrupt index artifact: {0}")]
    CorruptArtifact(String),
}

/// Failures from the external collaborators (embedding service, LLM
/// validator). Fatal for the request that triggered them; the core
/// mandates no retry policy.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The collaborator could not be reached or failed mid-request.
    #[error("upstream service unavailable: {0}")]
    Unavailable(String),

    /// The collaborator answered, but with an unusable shape (missing
    /// required fields, wrong types). Surfaced instead of defaulted.
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

/// The validation-pipeline stage that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Rules,
    Llm,
    Embedding,
    ClauseMatching,
    CriticalDetection,
    ChunkStore,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Rules => "rule-based check",
            Stage::Llm => "llm validation",
            Stage::Embedding => "embedding",
            Stage::ClauseMatching => "clause matching",
            Stage::CriticalDetection => "critical-clause detection",
            Stage::ChunkStore => "chunk store",
        };
        f.write_str(name)
    }
}

/// A stage-attributed failure from the validation engine.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct EngineError {
    pub stage: Stage,
    #[source]
    pub source: anyhow::Error,
}

impl EngineError {
    pub fn new(stage: Stage, source: impl Into<anyhow::Error>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_error_names_the_stage() {
        let err = EngineError::new(
            Stage::Llm,
            UpstreamError::Unavailable("connection refused".into()),
        );
        let msg = err.to_string();
        assert!(msg.contains("llm validation"), "got: {msg}");
    }

    #[test]
    fn index_error_reports_both_dimensions() {
        let err = IndexError::DimensionMismatch {
            expected: 768,
            actual: 384,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 768, got 384");
    }
}
