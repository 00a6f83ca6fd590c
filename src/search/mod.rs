//! Search Module
//!
//! The retrieval core: maps a free-text question to the best entries of a loaded corpus.
//!
//! ## Pipeline
//! 1. **Normalize / tokenize** (`tokenizer`): lowercase, strip punctuation (keeping
//!    Devanagari), drop short words and stop words.
//! 2. **Expand** (`synonyms`): add every synonym group a keyword belongs to.
//! 3. **Score** (`scoring`): weighted sum of keyword, semantic, index and popularity signals.
//! 4. **Rank** (`engine`): noise floor, stable descending sort, top five, display formatting.
//!
//! Everything except `SearchEngine` (which awaits corpus loading) is synchronous and pure.

pub mod engine;
pub mod scoring;
pub mod synonyms;
pub mod tokenizer;
pub mod types;

pub use engine::SearchEngine;
pub use types::{Ranking, RankingKind, SearchResult};
