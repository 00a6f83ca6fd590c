//! Corpus Module
//!
//! Owns the static knowledge base: question/answer entries, verse texts, the synonym
//! table and the precomputed search index, one corpus per language.
//!
//! ## Submodules
//! - **`types`**: serde model of the knowledge-base JSON.
//! - **`loader`**: `CorpusRepository`, the per-language cache with default-language fallback.
//! - **`error`**: `LoadError`, the only error the retrieval core can raise.

pub mod error;
pub mod loader;
pub mod types;

pub use error::LoadError;
pub use loader::{CorpusRepository, CorpusSource};
pub use types::{Corpus, CorpusEntry, Difficulty, Language};
