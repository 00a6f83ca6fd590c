//! Enrichment Module
//!
//! Optional collaborators layered on top of retrieval. Neither is required for an
//! answer: both degrade to the retrieval result when unavailable.
//!
//! ## Submodules
//! - **`groq`**: LLM synthesis over the top results with model rotation and a response cache,
//!   plus single-answer insights and suggested follow-up questions.
//! - **`translate`**: best-effort translation of displayed answers.
//! - **`types`**: `AiResponse`, `EnrichmentError` and the chat wire format.

pub mod groq;
pub mod translate;
pub mod types;

pub use groq::GroqClient;
pub use translate::Translator;
pub use types::{AiResponse, EnrichmentError};

#[cfg(test)]
mod tests;
