//! # ClauseGuard CLI (`clauseguard`)
//!
//! The `clauseguard` binary is the interface to ClauseGuard. It provides
//! commands for database initialization, term-sheet ingestion, full
//! validation runs, index rebuilds, and cross-document retrieval.
//!
//! ## Usage
//!
//! ```bash
//! clauseguard --config ./config/clauseguard.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `clauseguard init` | Create the SQLite database and run schema migrations |
//! | `clauseguard ingest <file>` | Chunk, embed, store, and index a term sheet |
//! | `clauseguard validate <file>` | Run the full evidence-fusion validation |
//! | `clauseguard index doc <id>` | Rebuild one document's index artifact |
//! | `clauseguard index chat` | Rebuild the cross-document chat index |
//! | `clauseguard ask "<question>"` | Retrieve the closest chunks to a question |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use clauseguard::{ask, config, db, embedding, indexer, ingest, llm, migrate, validate};
use clauseguard::SqliteChunkStore;

/// ClauseGuard — term-sheet validation with exact vector search.
///
/// All commands accept a `--config` flag pointing to a TOML
/// configuration file. See `config/clauseguard.example.toml` for a full
/// example.
#[derive(Parser)]
#[command(
    name = "clauseguard",
    about = "ClauseGuard — financial term-sheet validation with exact vector search",
    version,
    long_about = "ClauseGuard ingests financial term sheets, chunks and embeds them, and \
    validates them by fusing rule-based checks, an LLM assessment, clause matching against \
    a reference corpus, and critical-clause detection into one explainable result."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/clauseguard.toml`. Database, chunking,
    /// matching, detection, and collaborator settings are read from it.
    #[arg(long, global = true, default_value = "./config/clauseguard.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and all required tables
    /// (documents, chunks). Idempotent — running it repeatedly is safe.
    Init,

    /// Ingest a term-sheet text file.
    ///
    /// Reads the file, deduplicates by content hash, chunks it, embeds
    /// every chunk, stores everything in SQLite, and rebuilds the
    /// document's index artifact.
    Ingest {
        /// Path to a UTF-8 text file.
        file: PathBuf,

        /// Optional document title (defaults to the file name).
        #[arg(long)]
        title: Option<String>,
    },

    /// Validate a term sheet and print the fused result as JSON.
    ///
    /// Runs all four evidence sources (rules, LLM, clause matching,
    /// critical-clause detection) and fuses them. Any collaborator
    /// failure aborts the run with the failing stage named.
    Validate {
        /// Path to a UTF-8 text file.
        file: PathBuf,

        /// Optional JSON sidecar with the structured fields
        /// (deal_name, issuer, amount, currency, maturity_date).
        #[arg(long)]
        fields: Option<PathBuf>,
    },

    /// Rebuild persisted index artifacts.
    Index {
        #[command(subcommand)]
        target: IndexTarget,
    },

    /// Ask a question over every ingested document.
    ///
    /// Embeds the question, queries the chat index, and prints the
    /// closest chunks with their similarity scores. Retrieval only —
    /// no generation.
    Ask {
        /// The question text.
        question: String,

        /// Maximum number of chunks to return.
        #[arg(long, default_value_t = 5)]
        top_k: usize,
    },
}

/// Index rebuild targets.
#[derive(Subcommand)]
enum IndexTarget {
    /// Rebuild one document's index from its embedded chunks.
    Doc {
        /// Document id (as reported by `ingest`).
        id: i64,
    },
    /// Rebuild the cross-document chat index.
    Chat,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            let pool = db::connect(&cfg.db.path).await?;
            migrate::run_migrations(&pool).await?;
            println!("Database initialized successfully.");
        }
        Commands::Ingest { file, title } => {
            let pool = db::connect(&cfg.db.path).await?;
            migrate::run_migrations(&pool).await?;
            let store = SqliteChunkStore::new(pool);
            let provider = embedding::create_provider(&cfg.embedding)?;
            let title = title.or_else(|| {
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            });
            let outcome =
                ingest::ingest_file(&cfg, &store, provider.as_ref(), &file, title.as_deref())
                    .await?;
            if outcome.deduplicated {
                println!(
                    "Already ingested as document {} (identical content).",
                    outcome.document_id
                );
            } else {
                println!(
                    "Ingested document {} ({} chunks).",
                    outcome.document_id, outcome.chunk_count
                );
            }
        }
        // Validation works from the document file alone; it never
        // touches the database.
        Commands::Validate { file, fields } => {
            let provider = embedding::create_provider(&cfg.embedding)?;
            let validator = llm::OllamaValidator::new(&cfg.llm)?;
            let engine = validate::build_engine(&cfg, provider.as_ref()).await?;
            let result = validate::validate_file(
                &engine,
                provider.as_ref(),
                &validator,
                &file,
                fields.as_deref(),
            )
            .await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Index { target } => {
            let pool = db::connect(&cfg.db.path).await?;
            let store = SqliteChunkStore::new(pool);
            match target {
                IndexTarget::Doc { id } => {
                    let count =
                        indexer::build_document_index(&store, &cfg.index.dir, id).await?;
                    println!("Indexed {count} chunks for document {id}.");
                }
                IndexTarget::Chat => {
                    let count = indexer::build_chat_index(&store, &cfg.index.dir).await?;
                    println!("Indexed {count} chunks across all documents.");
                }
            }
        }
        Commands::Ask { question, top_k } => {
            let pool = db::connect(&cfg.db.path).await?;
            let store = SqliteChunkStore::new(pool);
            let provider = embedding::create_provider(&cfg.embedding)?;
            let answers = ask::ask(&cfg, &store, provider.as_ref(), &question, top_k).await?;
            if answers.is_empty() {
                println!("No matching chunks found.");
            }
            for answer in answers {
                println!(
                    "[doc {} / chunk {}] similarity {:.4}",
                    answer.document_id, answer.chunk_id, answer.similarity
                );
                println!("{}\n", answer.text.trim());
            }
        }
    }

    Ok(())
}
