//! TOML configuration parsing and validation.
//!
//! All tunable policy lives here: chunking window, match thresholds,
//! detection depth, collaborator endpoints, and the reference clause
//! set the matcher is built from. Values are validated once at load
//! time so the rest of the pipeline can trust them.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_overlap")]
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            overlap: default_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_overlap() -> usize {
    100
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    /// Upper similarity cutoff for a full `match` classification.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,
    /// Lower similarity cutoff for a `partial` classification.
    #[serde(default = "default_partial_threshold")]
    pub partial_threshold: f32,
    /// The reference clause set, in fixed order. Changing this list
    /// changes the matcher; the clause index is rebuilt on startup.
    #[serde(default = "default_reference_clauses")]
    pub reference_clauses: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            match_threshold: default_match_threshold(),
            partial_threshold: default_partial_threshold(),
            reference_clauses: default_reference_clauses(),
        }
    }
}

fn default_match_threshold() -> f32 {
    0.80
}
fn default_partial_threshold() -> f32 {
    0.60
}
fn default_reference_clauses() -> Vec<String> {
    vec![
        "The interest rate shall be 5.5% per annum.".to_string(),
        "The issuer shall provide collateral in the form of government bonds.".to_string(),
        "The maturity date shall not exceed 2029-12-31.".to_string(),
    ]
}

#[derive(Debug, Deserialize, Clone)]
pub struct DetectionConfig {
    /// Number of probe-nearest chunks the critical-clause detector inspects.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    /// `"ollama"` or `"openai"`.
    pub provider: String,
    pub model: String,
    pub dims: usize,
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub model: String,
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_llm_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Directory holding persisted index artifacts.
    #[serde(default = "default_index_dir")]
    pub dir: PathBuf,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            dir: default_index_dir(),
        }
    }
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("data/indices")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate chunking
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.overlap >= config.chunking.chunk_size {
        anyhow::bail!("chunking.overlap must be < chunking.chunk_size");
    }

    // Validate matching
    for (name, value) in [
        ("matching.match_threshold", config.matching.match_threshold),
        ("matching.partial_threshold", config.matching.partial_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("{name} must be in [0.0, 1.0]");
        }
    }
    if config.matching.partial_threshold >= config.matching.match_threshold {
        anyhow::bail!("matching.partial_threshold must be < matching.match_threshold");
    }
    if config.matching.reference_clauses.is_empty() {
        anyhow::bail!("matching.reference_clauses must not be empty");
    }

    // Validate detection
    if config.detection.top_k == 0 {
        anyhow::bail!("detection.top_k must be >= 1");
    }

    // Validate embedding
    if config.embedding.dims == 0 {
        anyhow::bail!(
            "embedding.dims must be > 0 for provider '{}'",
            config.embedding.provider
        );
    }
    match config.embedding.provider.as_str() {
        "ollama" | "openai" => {}
        other => anyhow::bail!("Unknown embedding provider: '{}'. Must be ollama or openai.", other),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    const MINIMAL: &str = r#"
        [db]
        path = "data/test.db"

        [embedding]
        provider = "ollama"
        model = "nomic-embed-text"
        dims = 768

        [llm]
        model = "mistral"
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let file = write_config(MINIMAL);
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.chunking.chunk_size, 1000);
        assert_eq!(cfg.chunking.overlap, 100);
        assert_eq!(cfg.matching.match_threshold, 0.80);
        assert_eq!(cfg.detection.top_k, 5);
        assert_eq!(cfg.matching.reference_clauses.len(), 3);
        assert_eq!(cfg.embedding.endpoint, "http://localhost:11434");
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let body = format!(
            "{MINIMAL}\n[matching]\nmatch_threshold = 0.5\npartial_threshold = 0.7\n"
        );
        let file = write_config(&body);
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let body = MINIMAL.replace("\"ollama\"", "\"sentencepiece\"");
        let file = write_config(&body);
        assert!(load_config(file.path()).is_err());
    }
}
