use super::types::Language;

/// Errors raised while fetching or parsing a knowledge base.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// Local file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Remote fetch failed before a response arrived.
    #[error("failed to fetch corpus: {0}")]
    Http(#[from] reqwest::Error),
    /// Remote fetch returned a non-success status.
    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    /// Payload is not well-formed JSON, or does not match the corpus layout.
    #[error("corpus for {language} is malformed: {source}")]
    Parse {
        language: Language,
        #[source]
        source: serde_json::Error,
    },
    /// Payload parsed but has no `questions` array.
    #[error("corpus for {0} has no questions array")]
    MissingQuestions(Language),
}
