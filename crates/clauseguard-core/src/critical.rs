//! Critical-clause detection.
//!
//! Builds a per-document [`VectorIndex`] over the document's own
//! chunks, retrieves the chunks semantically closest to a fixed
//! "financial terms and conditions" probe, and keeps the ones whose
//! text is confirmed against [`CRITICAL_KEYWORDS`]. The result depends
//! only on chunk content and embeddings, never on call order.
//!
//! The keyword list is part of the contract — domain terms a term sheet
//! reviewer must always see — and is deliberately not runtime-tunable.

use crate::embedding::EmbeddingProvider;
use crate::error::{EngineError, IndexError, Stage};
use crate::index::VectorIndex;
use crate::models::{CriticalClauseReport, CriticalFinding};

/// Critical financial clause keywords, matched case-insensitively as
/// substrings.
pub const CRITICAL_KEYWORDS: [&str; 15] = [
    "Change of Control",
    "Put Option",
    "Redemption",
    "Issuer Call",
    "Make-Whole",
    "Early Redemption",
    "Default",
    "Interest Payment",
    "Coupon",
    "Rate(s) of Interest",
    "Floating Rate",
    "Zero Coupon",
    "Fixed Rate",
    "Interest Commencement",
    "Maturity Date",
];

/// Probe text whose neighborhood in embedding space is searched for
/// critical clauses.
pub const FINANCIAL_TERMS_PROBE: &str = "financial terms and conditions";

/// Default number of probe-nearest chunks to inspect.
pub const DEFAULT_TOP_K: usize = 5;

/// Case-insensitive substring test against [`CRITICAL_KEYWORDS`].
pub fn is_critical_clause(text: &str) -> bool {
    let lower = text.to_lowercase();
    CRITICAL_KEYWORDS
        .iter()
        .any(|keyword| lower.contains(&keyword.to_lowercase()))
}

/// Detector over one document's chunks.
#[derive(Debug, Clone, Copy)]
pub struct CriticalClauseDetector {
    top_k: usize,
}

impl Default for CriticalClauseDetector {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl CriticalClauseDetector {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Flag keyword-confirmed chunks near the financial-terms probe.
    ///
    /// # Errors
    ///
    /// Stage-attributed: embedding failures as [`Stage::Embedding`];
    /// an empty chunk list as [`Stage::CriticalDetection`] wrapping
    /// [`IndexError::EmptyInput`].
    pub async fn detect(
        &self,
        provider: &dyn EmbeddingProvider,
        chunks: &[String],
    ) -> Result<CriticalClauseReport, EngineError> {
        if chunks.is_empty() {
            return Err(EngineError::new(
                Stage::CriticalDetection,
                IndexError::EmptyInput,
            ));
        }

        let vectors = provider
            .embed_batch(chunks)
            .await
            .map_err(|e| EngineError::new(Stage::Embedding, e))?;
        let index = VectorIndex::build(&vectors)
            .map_err(|e| EngineError::new(Stage::CriticalDetection, e))?;

        let probe = provider
            .embed(FINANCIAL_TERMS_PROBE)
            .await
            .map_err(|e| EngineError::new(Stage::Embedding, e))?;
        let hits = index
            .search(&probe, self.top_k)
            .map_err(|e| EngineError::new(Stage::CriticalDetection, e))?;

        let mut critical_chunks = Vec::new();
        for (position, _distance) in hits {
            let text = &chunks[position];
            if is_critical_clause(text) {
                critical_chunks.push(CriticalFinding {
                    chunk_id: position,
                    text: text.trim().to_string(),
                });
            }
        }

        tracing::debug!(
            inspected = self.top_k.min(chunks.len()),
            critical = critical_chunks.len(),
            "critical-clause detection complete"
        );
        Ok(CriticalClauseReport {
            is_critical: !critical_chunks.is_empty(),
            critical_chunks,
        })
    }
}
