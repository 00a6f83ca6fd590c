//! Vedic Explorer Library
//!
//! Retrieval over a curated Srimad Bhagavatam question/answer knowledge base, plus
//! the conversational layer that keeps follow-up questions on topic. The binary
//! (`main.rs`) wraps it in an interactive prompt.
//!
//! ## Architecture Modules
//! - **`corpus`**: knowledge-base types and the per-language loading cache with
//!   fallback to English.
//! - **`search`**: normalization, synonym expansion, weighted scoring and ranking with
//!   foundational and popularity fallbacks. Scoring is pure and synchronous.
//! - **`conversation`**: follow-up detection, contextual query rewriting and the
//!   session that tracks topic, shown answers and turn history.
//! - **`enrichment`**: optional LLM synthesis and translation. Both degrade to the
//!   retrieval answer.
//! - **`config`**: CLI and environment settings for the binary.

pub mod config;
pub mod conversation;
pub mod corpus;
pub mod enrichment;
pub mod search;

#[cfg(test)]
mod fixtures;
