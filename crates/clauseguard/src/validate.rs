//! Validation command wiring.
//!
//! Assembles the engine from configuration (reference clause matcher,
//! critical-clause detector, chunking window), runs the full evidence
//! pipeline over one document, and prints the fused result as pretty
//! JSON on stdout.

use std::path::Path;

use anyhow::{Context, Result};

use clauseguard_core::critical::CriticalClauseDetector;
use clauseguard_core::embedding::EmbeddingProvider;
use clauseguard_core::engine::{ChunkingParams, LlmValidator, ValidationEngine};
use clauseguard_core::matcher::{ClauseMatcher, MatchThresholds};
use clauseguard_core::models::ValidationResult;

use crate::config::Config;
use crate::rules::TermSheetRuleChecker;

/// Build the validation engine from configuration. The clause matcher
/// embeds the reference corpus here, once; validation runs reuse it.
pub async fn build_engine(
    config: &Config,
    provider: &dyn EmbeddingProvider,
) -> Result<ValidationEngine> {
    let matcher = ClauseMatcher::build(
        provider,
        config.matching.reference_clauses.clone(),
        MatchThresholds {
            match_threshold: config.matching.match_threshold,
            partial_threshold: config.matching.partial_threshold,
        },
    )
    .await
    .context("Failed to build the reference clause matcher")?;

    Ok(ValidationEngine::new(
        matcher,
        CriticalClauseDetector::new(config.detection.top_k),
        ChunkingParams {
            chunk_size: config.chunking.chunk_size,
            overlap: config.chunking.overlap,
        },
    ))
}

/// Load structured fields from an optional JSON sidecar file.
///
/// The file must hold a JSON object; `None` yields an empty field map,
/// which the rule checker reports as all required fields missing.
pub fn load_fields(
    path: Option<&Path>,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    let Some(path) = path else {
        return Ok(serde_json::Map::new());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read fields file: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("Fields file is not valid JSON: {}", path.display()))?;
    match value {
        serde_json::Value::Object(map) => Ok(map),
        _ => anyhow::bail!("Fields file must hold a JSON object: {}", path.display()),
    }
}

/// Validate one document file and return the fused result.
pub async fn validate_file(
    engine: &ValidationEngine,
    provider: &dyn EmbeddingProvider,
    llm: &dyn LlmValidator,
    document_path: &Path,
    fields_path: Option<&Path>,
) -> Result<ValidationResult> {
    let text = std::fs::read_to_string(document_path)
        .with_context(|| format!("Failed to read document: {}", document_path.display()))?;
    let fields = load_fields(fields_path)?;

    let result = engine
        .validate(provider, &TermSheetRuleChecker, llm, &fields, &text)
        .await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn absent_fields_file_yields_empty_map() {
        assert!(load_fields(None).unwrap().is_empty());
    }

    #[test]
    fn fields_file_must_be_an_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[1, 2, 3]").unwrap();
        assert!(load_fields(Some(file.path())).is_err());
    }

    #[test]
    fn fields_file_object_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"issuer": "Acme Capital"}"#).unwrap();
        let fields = load_fields(Some(file.path())).unwrap();
        assert_eq!(fields["issuer"], "Acme Capital");
    }
}
