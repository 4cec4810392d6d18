//! Validation engine: evidence gathering and fusion.
//!
//! For one document, the engine gathers four independent evidence
//! sources — the rule-based structural check, the LLM validator, clause
//! matching against the reference corpus, and critical-clause
//! detection — then fuses them into a single [`ValidationResult`].
//!
//! # Fusion policy
//!
//! Issues are concatenated in a fixed order (rules, LLM, derived). The
//! criticality score is the **maximum** over independent evidence
//! floors, never an average: a clean rule check can never dilute a
//! missing critical clause. Floor constants are tunable policy, not
//! load-bearing math.
//!
//! # Failure semantics
//!
//! Any collaborator failure aborts the run with an
//! [`EngineError`](crate::error::EngineError) naming the stage that
//! failed. The engine never returns a silently degraded partial result.
//!
//! Evidence stages are awaited one at a time with no lock held across
//! any await; independent documents validate concurrently because the
//! engine takes `&self` and all its state is immutable after
//! construction.

use async_trait::async_trait;

use crate::chunk::chunk_text;
use crate::critical::CriticalClauseDetector;
use crate::embedding::EmbeddingProvider;
use crate::error::{EngineError, Stage, UpstreamError};
use crate::matcher::ClauseMatcher;
use crate::models::{
    ClauseMatch, CriticalClauseReport, LlmAssessment, MatchKind, RuleReport, Severity,
    ValidationIssue, ValidationResult,
};

/// Score floor applied when a critical-topic clause is missing.
pub const MISSING_CLAUSE_FLOOR: u8 = 90;
/// Score floor applied when the document contains critical clauses.
pub const CRITICAL_CLAUSE_FLOOR: u8 = 85;

/// Topics whose absence from the reference corpus escalates a `missing`
/// clause match to a CRITICAL issue. Matched case-insensitively against
/// the chunk text.
pub const CRITICAL_TOPIC_KEYWORDS: [&str; 4] =
    ["interest rate", "maturity", "redemption", "collateral"];

/// LLM-based document validator, consumed as an opaque collaborator.
///
/// Implementations must validate the upstream response shape at the
/// boundary: a response missing any required field is
/// [`UpstreamError::Malformed`], never a defaulted assessment.
#[async_trait]
pub trait LlmValidator: Send + Sync {
    async fn validate(&self, text: &str) -> Result<LlmAssessment, UpstreamError>;
}

/// Rule-based structural checker over the document's extracted fields
/// and raw text.
pub trait RuleChecker: Send + Sync {
    fn check(&self, fields: &serde_json::Map<String, serde_json::Value>, text: &str)
        -> RuleReport;
}

/// Chunking parameters for the validation pipeline.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingParams {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingParams {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 100,
        }
    }
}

/// Orchestrates evidence gathering and fusion for one document at a
/// time. Construct once (the clause matcher inside is build-once) and
/// share across validation runs.
pub struct ValidationEngine {
    matcher: ClauseMatcher,
    detector: CriticalClauseDetector,
    chunking: ChunkingParams,
}

impl ValidationEngine {
    pub fn new(
        matcher: ClauseMatcher,
        detector: CriticalClauseDetector,
        chunking: ChunkingParams,
    ) -> Self {
        Self {
            matcher,
            detector,
            chunking,
        }
    }

    /// Validate one document's text and structured fields.
    pub async fn validate(
        &self,
        provider: &dyn EmbeddingProvider,
        rules: &dyn RuleChecker,
        llm: &dyn LlmValidator,
        fields: &serde_json::Map<String, serde_json::Value>,
        text: &str,
    ) -> Result<ValidationResult, EngineError> {
        let rule_report = rules.check(fields, text);
        tracing::debug!(issues = rule_report.errors.len(), "rule-based check complete");

        let assessment = llm
            .validate(text)
            .await
            .map_err(|e| EngineError::new(Stage::Llm, e))?;
        tracing::debug!(
            issues = assessment.errors.len(),
            score = assessment.criticality_score,
            "llm validation complete"
        );

        let chunks = chunk_text(text, self.chunking.chunk_size, self.chunking.overlap);
        let clause_matches = self.matcher.match_chunks(provider, &chunks).await?;
        let critical = self.detector.detect(provider, &chunks).await?;

        let missing_critical = has_missing_critical_clause(&clause_matches);
        let errors = fuse_issues(
            rule_report.errors,
            assessment.errors,
            missing_critical,
            critical.is_critical,
        );
        let criticality_score = criticality_score(
            rule_report.criticality_score,
            assessment.criticality_score,
            missing_critical,
            critical.is_critical,
        );
        let validation_summary =
            build_summary(&assessment.validation_summary, errors.len(), &critical);

        tracing::info!(
            issues = errors.len(),
            score = criticality_score,
            critical = critical.is_critical,
            "validation complete"
        );
        Ok(ValidationResult {
            errors,
            criticality_score,
            validation_summary,
            clause_matches,
        })
    }
}

/// True iff any `missing` clause match covers a critical topic.
pub fn has_missing_critical_clause(matches: &[ClauseMatch]) -> bool {
    matches.iter().any(|m| {
        m.match_type == MatchKind::Missing && {
            let lower = m.clause.to_lowercase();
            CRITICAL_TOPIC_KEYWORDS.iter().any(|k| lower.contains(k))
        }
    })
}

/// Concatenate issue lists in evidence order and append the synthesized
/// derived issues.
pub fn fuse_issues(
    rule_issues: Vec<ValidationIssue>,
    llm_issues: Vec<ValidationIssue>,
    missing_critical: bool,
    is_critical: bool,
) -> Vec<ValidationIssue> {
    let mut errors = rule_issues;
    errors.extend(llm_issues);

    if missing_critical {
        errors.push(ValidationIssue {
            kind: "MISSING_CLAUSE".into(),
            description: "Critical clause missing or significantly different from standard".into(),
            section: "Document".into(),
            severity: Severity::Critical,
        });
    }
    if is_critical {
        errors.push(ValidationIssue {
            kind: "CRITICAL_CLAUSE".into(),
            description: "Document contains critical financial clauses requiring review".into(),
            section: "Financial Terms".into(),
            severity: Severity::High,
        });
    }
    errors
}

/// Floor-based maximum over the independent evidence scores, clamped to
/// `[0, 100]`.
pub fn criticality_score(
    rule_score: u8,
    llm_score: u8,
    missing_critical: bool,
    is_critical: bool,
) -> u8 {
    let mut score = rule_score.max(llm_score);
    if missing_critical {
        score = score.max(MISSING_CLAUSE_FLOOR);
    }
    if is_critical {
        score = score.max(CRITICAL_CLAUSE_FLOOR);
    }
    score.min(100)
}

/// Prefer the LLM's narrative; synthesize one otherwise. Always append
/// the critical-clause count when applicable.
pub fn build_summary(
    llm_summary: &str,
    issue_count: usize,
    critical: &CriticalClauseReport,
) -> String {
    let mut summary = if llm_summary.trim().is_empty() {
        let mut s = String::from("Document validation complete.");
        if issue_count > 0 {
            s.push_str(&format!(" Found {issue_count} issues."));
        }
        s
    } else {
        llm_summary.to_string()
    };

    if critical.is_critical {
        summary.push_str(&format!(
            " Document contains {} critical clauses.",
            critical.critical_chunks.len()
        ));
    }
    summary
}
