//! Core data models used throughout ClauseGuard.
//!
//! These types represent the chunks, clause matches, critical findings,
//! and validation results that flow through the pipeline. Upstream
//! collaborator outputs ([`RuleReport`], [`LlmAssessment`]) are typed at
//! the boundary instead of being passed around as loose JSON — a
//! missing field fails deserialization there, once, rather than
//! scattering presence checks through the fusion logic.

use serde::{Deserialize, Serialize};

/// Severity of a validation issue. Serialized in uppercase
/// (`"CRITICAL"`, `"HIGH"`, ...) to match the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

/// A single typed validation finding, from any evidence source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Machine-readable issue type (e.g. `MISSING_SECTION`, `INVALID_DATE`).
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable description of the specific issue.
    pub description: String,
    /// Document section the issue applies to.
    pub section: String,
    pub severity: Severity,
}

/// Classification of how closely a chunk matches its nearest reference
/// clause. Serialized lowercase (`"match"`, `"partial"`, `"missing"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Match,
    Partial,
    Missing,
}

/// A chunk/reference-clause pairing with its similarity score.
///
/// Derived per validation run, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClauseMatch {
    /// The input chunk text that was matched.
    pub clause: String,
    pub match_type: MatchKind,
    /// Similarity in `(0, 1]`, computed as `1 / (1 + d)` where `d` is
    /// the squared L2 distance to the nearest reference clause.
    pub similarity: f32,
}

/// A chunk that is both semantically near the financial-terms probe and
/// textually confirmed against the critical keyword list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalFinding {
    /// Position of the chunk within the validated document.
    pub chunk_id: usize,
    /// Trimmed chunk text.
    pub text: String,
}

/// Outcome of critical-clause detection over one document's chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalClauseReport {
    /// True iff at least one retrieved chunk passed the keyword test.
    pub is_critical: bool,
    pub critical_chunks: Vec<CriticalFinding>,
}

/// The fused, explainable outcome of one validation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// All issues, ordered: rule-based, then LLM, then derived.
    pub errors: Vec<ValidationIssue>,
    /// Overall risk in `[0, 100]` — the maximum over independent
    /// evidence floors, never an average.
    pub criticality_score: u8,
    pub validation_summary: String,
    pub clause_matches: Vec<ClauseMatch>,
}

/// Typed output of the rule-based structural checker.
#[derive(Debug, Clone, Default)]
pub struct RuleReport {
    pub errors: Vec<ValidationIssue>,
    pub criticality_score: u8,
}

/// Typed output of the LLM validator, validated at the boundary.
///
/// All three fields are required; an upstream response missing any of
/// them must fail as [`UpstreamError::Malformed`](crate::error::UpstreamError)
/// rather than deserializing with defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAssessment {
    pub errors: Vec<ValidationIssue>,
    pub criticality_score: u8,
    pub validation_summary: String,
}

/// A stored text chunk belonging to exactly one document.
///
/// `chunk_index` is zero-based and unique within the document. The
/// vector is attached once after embedding; chunks without one are
/// skipped by cross-document indexing.
#[derive(Debug, Clone)]
pub struct StoredChunk {
    pub id: i64,
    pub document_id: i64,
    pub chunk_index: i64,
    pub text: String,
    pub vector: Option<Vec<f32>>,
}
