//! # ClauseGuard
//!
//! **Term-sheet validation with exact vector search, local-first.**
//!
//! ClauseGuard ingests financial term sheets, chunks and embeds them,
//! and validates them by fusing four independent evidence sources:
//! rule-based structural checks, an LLM compliance assessment, clause
//! matching against a reference corpus, and critical-clause detection.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌───────────┐
//! │  Ingest    │──▶│ Chunk+Embed  │──▶│  SQLite   │
//! │ (txt file) │   │  (Ollama)    │   │ documents │
//! └───────────┘   └──────────────┘   │  chunks   │
//!                                    └─────┬─────┘
//!                                          │
//!                  ┌───────────────────────┤
//!                  ▼                       ▼
//!            ┌──────────┐           ┌───────────┐
//!            │ Validate │           │ Index/Ask │
//!            │ (engine) │           │ (.idx)    │
//!            └──────────┘           └───────────┘
//! ```
//!
//! The validation engine, clause matcher, critical-clause detector, and
//! exact L2 index live in the runtime-free [`clauseguard_core`] crate;
//! this crate supplies the SQLite store, HTTP collaborators, index
//! persistence, and the `clauseguard` CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! clauseguard init                          # create database
//! clauseguard ingest termsheet.txt          # chunk, embed, store, index
//! clauseguard validate termsheet.txt        # full evidence-fusion run
//! clauseguard index chat                    # rebuild cross-document index
//! clauseguard ask "what is the coupon?"     # retrieval over all documents
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`db`] | SQLite connection pool with WAL mode |
//! | [`migrate`] | Database schema migrations (idempotent) |
//! | [`store`] | SQLite chunk store and vector BLOB codec |
//! | [`embedding`] | Ollama / OpenAI embedding providers |
//! | [`llm`] | Ollama LLM validator with strict JSON parsing |
//! | [`rules`] | Deterministic structural rule checker |
//! | [`ingest`] | Ingestion pipeline: read → dedup → chunk → embed → index |
//! | [`indexer`] | Index artifact construction with atomic writes |
//! | [`retriever`] | Artifact loading and id-mapped queries |
//! | [`validate`] | Engine assembly and the validate command |
//! | [`ask`] | Cross-document retrieval command |
//!
//! ## Configuration
//!
//! ClauseGuard is configured via a TOML file (default:
//! `config/clauseguard.toml`). See [`config`] for all options and
//! [`config::load_config`] for validation rules.

pub mod ask;
pub mod config;
pub mod db;
pub mod embedding;
pub mod indexer;
pub mod ingest;
pub mod llm;
pub mod migrate;
pub mod retriever;
pub mod rules;
pub mod store;
pub mod validate;

pub use clauseguard_core as core;
pub use store::SqliteChunkStore;
