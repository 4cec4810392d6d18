//! End-to-end pipeline tests over a real SQLite database and real index
//! artifacts, with deterministic in-process collaborators standing in
//! for the embedding and LLM services.

use std::io::Write;
use std::path::Path;

use async_trait::async_trait;

use clauseguard::config::{
    ChunkingConfig, Config, DbConfig, DetectionConfig, EmbeddingConfig, IndexConfig, LlmConfig,
    MatchingConfig,
};
use clauseguard::indexer::document_index_paths;
use clauseguard::retriever::Retriever;
use clauseguard::store::SqliteChunkStore;
use clauseguard::{ask, db, ingest, migrate, validate};
use clauseguard_core::embedding::EmbeddingProvider;
use clauseguard_core::engine::LlmValidator;
use clauseguard_core::error::UpstreamError;
use clauseguard_core::models::{LlmAssessment, MatchKind};

/// Deterministic embedder: one dimension per financial topic, plus a
/// catch-all dimension for text naming none of them.
struct KeywordEmbedder;

const TOPICS: [&str; 3] = ["interest", "collateral", "maturity"];

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword-test"
    }

    fn dims(&self) -> usize {
        4
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, UpstreamError> {
        let lower = text.to_lowercase();
        let mut v = vec![0.0f32; 4];
        for (i, topic) in TOPICS.iter().enumerate() {
            if lower.contains(topic) {
                v[i] = 1.0;
            }
        }
        if v.iter().all(|&x| x == 0.0) {
            v[3] = 1.0;
        }
        Ok(v)
    }
}

struct StubLlm;

#[async_trait]
impl LlmValidator for StubLlm {
    async fn validate(&self, _text: &str) -> Result<LlmAssessment, UpstreamError> {
        Ok(LlmAssessment {
            errors: vec![],
            criticality_score: 20,
            validation_summary: "Stub assessment.".into(),
        })
    }
}

fn test_config(dir: &Path, chunk_size: usize, overlap: usize) -> Config {
    Config {
        db: DbConfig {
            path: dir.join("test.db"),
        },
        chunking: ChunkingConfig {
            chunk_size,
            overlap,
        },
        matching: MatchingConfig::default(),
        detection: DetectionConfig::default(),
        embedding: EmbeddingConfig {
            provider: "ollama".into(),
            model: "keyword-test".into(),
            dims: 4,
            endpoint: "http://localhost:11434".into(),
            timeout_secs: 5,
        },
        llm: LlmConfig {
            model: "stub".into(),
            endpoint: "http://localhost:11434".into(),
            timeout_secs: 5,
        },
        index: IndexConfig {
            dir: dir.join("indices"),
        },
    }
}

fn write_document(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

const TERMSHEET: &str = "The interest rate shall be 5.5% per annum payable quarterly. \
    Collateral consists of government bonds held in escrow. \
    The maturity date shall not exceed 2029-12-31 in any circumstance.";

#[tokio::test]
async fn ingest_builds_store_and_index() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 60, 10);
    let doc = write_document(dir.path(), "sheet.txt", TERMSHEET);

    let pool = db::connect(&config.db.path).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    let store = SqliteChunkStore::new(pool);

    let outcome = ingest::ingest_file(&config, &store, &KeywordEmbedder, &doc, Some("Sheet"))
        .await
        .unwrap();
    assert!(!outcome.deduplicated);
    assert!(outcome.chunk_count > 1, "small window should split the text");

    // Every stored chunk carries its embedding.
    let chunks = clauseguard_core::store::ChunkStore::chunks_for_document(
        &store,
        outcome.document_id,
    )
    .await
    .unwrap();
    assert_eq!(chunks.len(), outcome.chunk_count);
    assert!(chunks.iter().all(|c| c.vector.is_some()));

    // The document index artifact pair is on disk and internally consistent.
    let (index_path, ids_path) = document_index_paths(&config.index.dir, outcome.document_id);
    let retriever = Retriever::open(&index_path, &ids_path).unwrap();
    assert_eq!(retriever.len(), outcome.chunk_count);

    // Querying the collateral direction surfaces the collateral chunk.
    let hits = retriever.query(&[0.0, 1.0, 0.0, 0.0], 1).unwrap();
    let top = store.chunk_by_id(hits[0].0).await.unwrap().unwrap();
    assert!(top.text.to_lowercase().contains("collateral"));
}

#[tokio::test]
async fn reingesting_identical_content_is_deduplicated() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 60, 10);
    let doc = write_document(dir.path(), "sheet.txt", TERMSHEET);

    let pool = db::connect(&config.db.path).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    let store = SqliteChunkStore::new(pool);

    let first = ingest::ingest_file(&config, &store, &KeywordEmbedder, &doc, None)
        .await
        .unwrap();
    let copy = write_document(dir.path(), "copy.txt", TERMSHEET);
    let second = ingest::ingest_file(&config, &store, &KeywordEmbedder, &copy, None)
        .await
        .unwrap();

    assert!(second.deduplicated);
    assert_eq!(second.document_id, first.document_id);
    assert_eq!(second.chunk_count, 0);
}

#[tokio::test]
async fn ask_retrieves_the_relevant_chunk_across_documents() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 60, 10);

    let pool = db::connect(&config.db.path).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    let store = SqliteChunkStore::new(pool);

    let first = write_document(dir.path(), "a.txt", TERMSHEET);
    let second = write_document(
        dir.path(),
        "b.txt",
        "General meeting arrangements and written notice periods apply to all parties involved.",
    );
    ingest::ingest_file(&config, &store, &KeywordEmbedder, &first, None)
        .await
        .unwrap();
    ingest::ingest_file(&config, &store, &KeywordEmbedder, &second, None)
        .await
        .unwrap();

    clauseguard::indexer::build_chat_index(&store, &config.index.dir)
        .await
        .unwrap();

    let answers = ask::ask(
        &config,
        &store,
        &KeywordEmbedder,
        "What is the interest rate?",
        3,
    )
    .await
    .unwrap();
    assert!(!answers.is_empty());
    assert!(answers[0].text.to_lowercase().contains("interest"));
    for pair in answers.windows(2) {
        assert!(pair[0].similarity >= pair[1].similarity);
    }
}

#[tokio::test]
async fn ask_without_a_chat_index_fails_with_guidance() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path(), 60, 10);

    let pool = db::connect(&config.db.path).await.unwrap();
    migrate::run_migrations(&pool).await.unwrap();
    let store = SqliteChunkStore::new(pool);

    let err = ask::ask(&config, &store, &KeywordEmbedder, "anything", 3)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("index chat"));
}

#[tokio::test]
async fn validation_fuses_all_evidence_sources() {
    let dir = tempfile::tempdir().unwrap();
    // One wide chunk keeps the scenario's clause inventory predictable.
    let config = test_config(dir.path(), 1000, 100);
    let doc = write_document(
        dir.path(),
        "sheet.txt",
        "Termsheet. The Interest rate shall be 5.5% per annum. Early Redemption is \
         permitted. Collateral: government bonds. Maturity Date: 2029-12-31. \
         Issuer: Acme Capital.",
    );

    let engine = validate::build_engine(&config, &KeywordEmbedder).await.unwrap();
    let result = validate::validate_file(&engine, &KeywordEmbedder, &StubLlm, &doc, None)
        .await
        .unwrap();

    // No fields sidecar: every required structured field is reported.
    let missing_fields = result
        .errors
        .iter()
        .filter(|e| e.kind == "MISSING_FIELD")
        .count();
    assert_eq!(missing_fields, 5);

    // The single chunk names all three topics at once, so it sits far
    // from every single-topic reference clause: a missing match on a
    // critical topic, plus keyword-confirmed critical clauses.
    assert!(result.errors.iter().any(|e| e.kind == "MISSING_CLAUSE"));
    assert!(result.errors.iter().any(|e| e.kind == "CRITICAL_CLAUSE"));
    assert_eq!(result.clause_matches.len(), 1);
    assert_eq!(result.clause_matches[0].match_type, MatchKind::Missing);

    // Missing-clause floor dominates the rule score (60) and LLM score (20).
    assert_eq!(result.criticality_score, 90);
    assert!(result.validation_summary.starts_with("Stub assessment."));
    assert!(result
        .validation_summary
        .contains("critical clauses."));
}
