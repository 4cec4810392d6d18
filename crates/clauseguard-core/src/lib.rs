//! # ClauseGuard Core
//!
//! Shared domain logic for ClauseGuard: data models, the exact
//! nearest-neighbor vector index, the text chunker, clause matching,
//! critical-clause detection, and the validation engine that fuses
//! heterogeneous evidence into a single scored result.
//!
//! This crate contains no tokio, sqlx, HTTP, or filesystem I/O. External
//! collaborators — the embedding service, the LLM validator, the
//! rule-based checker, and the chunk store — are abstracted behind
//! traits so that the application crate (and tests) supply concrete
//! implementations.
//!
//! ## Evidence flow
//!
//! ```text
//! ChunkStore ──▶ chunks ──┬──▶ ClauseMatcher ────────┐
//!                         └──▶ CriticalClauseDetector ├──▶ ValidationEngine ──▶ ValidationResult
//! RuleChecker ────────────────────────────────────────┤
//! LlmValidator ───────────────────────────────────────┘
//! ```
//!
//! Each matcher/detector owns its own [`index::VectorIndex`] instance;
//! the engine never averages evidence — the criticality score is the
//! maximum over independent evidence floors, so a passing signal can
//! never dilute a failing one.

pub mod chunk;
pub mod critical;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod index;
pub mod matcher;
pub mod models;
pub mod store;

#[cfg(test)]
pub(crate) mod testutil;
