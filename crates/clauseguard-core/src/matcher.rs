//! Semantic clause matching against a reference corpus.
//!
//! A [`ClauseMatcher`] is built once from an ordered reference-clause
//! list: each clause is embedded and the vectors go into a
//! [`VectorIndex`]. Matching a document then embeds each input chunk,
//! finds its single nearest reference clause, converts the squared L2
//! distance `d` to a similarity `s = 1 / (1 + d)` (monotonically
//! decreasing in distance, bounded in `(0, 1]`), and classifies the
//! chunk as match / partial / missing by the configured thresholds.
//!
//! Building embeds every reference clause, so the matcher is meant to
//! be constructed once per reference-set version and reused across
//! validation runs — never rebuilt on the hot path.

use crate::embedding::EmbeddingProvider;
use crate::error::{EngineError, IndexError, Stage};
use crate::index::VectorIndex;
use crate::models::{ClauseMatch, MatchKind};

/// Chunks shorter than this (after trimming) carry no reliable
/// semantic signal and are skipped.
pub const MIN_CLAUSE_LEN: usize = 20;

/// Similarity cutoffs for classifying a chunk's best match.
///
/// The defaults are tuned for normalized-ish embedding spaces; they are
/// configuration, not contract — recalibrate per embedding model.
#[derive(Debug, Clone, Copy)]
pub struct MatchThresholds {
    /// Upper cutoff: similarities above this classify as [`MatchKind::Match`].
    pub match_threshold: f32,
    /// Lower cutoff: similarities above this (but at or below
    /// `match_threshold`) classify as [`MatchKind::Partial`].
    pub partial_threshold: f32,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            match_threshold: 0.80,
            partial_threshold: 0.60,
        }
    }
}

impl MatchThresholds {
    pub fn classify(&self, similarity: f32) -> MatchKind {
        if similarity > self.match_threshold {
            MatchKind::Match
        } else if similarity > self.partial_threshold {
            MatchKind::Partial
        } else {
            MatchKind::Missing
        }
    }
}

/// Build-once matcher over a fixed, ordered reference clause set.
#[derive(Debug)]
pub struct ClauseMatcher {
    clauses: Vec<String>,
    index: VectorIndex,
    thresholds: MatchThresholds,
}

impl ClauseMatcher {
    /// Embed the reference clauses and build the index.
    ///
    /// # Errors
    ///
    /// Stage-attributed: embedding failures as [`Stage::Embedding`],
    /// an empty clause list or inconsistent embedding dimensions as
    /// [`Stage::ClauseMatching`].
    pub async fn build(
        provider: &dyn EmbeddingProvider,
        clauses: Vec<String>,
        thresholds: MatchThresholds,
    ) -> Result<Self, EngineError> {
        if clauses.is_empty() {
            return Err(EngineError::new(Stage::ClauseMatching, IndexError::EmptyInput));
        }
        let embeddings = provider
            .embed_batch(&clauses)
            .await
            .map_err(|e| EngineError::new(Stage::Embedding, e))?;
        let index = VectorIndex::build(&embeddings)
            .map_err(|e| EngineError::new(Stage::ClauseMatching, e))?;
        tracing::debug!(
            clauses = clauses.len(),
            dim = index.dim(),
            "reference clause index built"
        );
        Ok(Self {
            clauses,
            index,
            thresholds,
        })
    }

    /// The reference clause at a given index position.
    pub fn reference_clause(&self, position: usize) -> Option<&str> {
        self.clauses.get(position).map(String::as_str)
    }

    /// Classify each input chunk against its nearest reference clause.
    ///
    /// Returns one [`ClauseMatch`] per chunk of at least
    /// [`MIN_CLAUSE_LEN`] trimmed characters, in input order.
    pub async fn match_chunks(
        &self,
        provider: &dyn EmbeddingProvider,
        chunks: &[String],
    ) -> Result<Vec<ClauseMatch>, EngineError> {
        let mut matches = Vec::new();

        for chunk in chunks {
            if chunk.trim().len() < MIN_CLAUSE_LEN {
                continue;
            }

            let embedding = provider
                .embed(chunk)
                .await
                .map_err(|e| EngineError::new(Stage::Embedding, e))?;
            let hits = self
                .index
                .search(&embedding, 1)
                .map_err(|e| EngineError::new(Stage::ClauseMatching, e))?;
            let Some(&(_, distance)) = hits.first() else {
                continue;
            };

            let similarity = 1.0 / (1.0 + distance);
            matches.push(ClauseMatch {
                clause: chunk.clone(),
                match_type: self.thresholds.classify(similarity),
                similarity,
            });
        }

        Ok(matches)
    }
}
