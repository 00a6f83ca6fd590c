//! Corpus Repository
//!
//! Fetches knowledge-base files, parses them, and keeps one parsed copy per language
//! for the lifetime of the repository (or until it is invalidated).
//!
//! ## Responsibilities
//! - **Fetching**: reads `<dir>/<file>` from disk or `<base_url>/<file>` over HTTP.
//! - **Validation**: rejects payloads that are not JSON or that lack a `questions` array.
//! - **Caching**: each language sits behind its own `OnceCell`, so concurrent callers
//!   asking for the same language share a single in-flight fetch.
//! - **Fallback**: `load` transparently serves the default language when a
//!   non-default language cannot be loaded (one level, never chained). The failure is
//!   remembered until `invalidate`, so later `load` calls do not refetch.

use super::error::LoadError;
use super::types::{Corpus, Language};

use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const FETCH_ATTEMPTS: usize = 3;

/// Where knowledge-base files live.
#[derive(Debug, Clone)]
pub enum CorpusSource {
    /// A local directory holding one JSON file per language.
    Directory(PathBuf),
    /// A base URL the per-language file names are appended to.
    Remote {
        base_url: String,
        client: reqwest::Client,
    },
}

impl CorpusSource {
    pub fn directory(path: impl Into<PathBuf>) -> Self {
        CorpusSource::Directory(path.into())
    }

    pub fn remote(base_url: &str) -> Self {
        CorpusSource::Remote {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Picks `Remote` for http(s) locations and `Directory` for everything else.
    pub fn from_location(location: &str) -> Self {
        let trimmed = location.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Self::remote(trimmed)
        } else {
            Self::directory(trimmed)
        }
    }

    pub fn describe(&self, language: Language) -> String {
        match self {
            CorpusSource::Directory(dir) => dir.join(language.corpus_file()).display().to_string(),
            CorpusSource::Remote { base_url, .. } => {
                format!("{}/{}", base_url, language.corpus_file())
            }
        }
    }

    async fn fetch_text(&self, language: Language) -> Result<String, LoadError> {
        match self {
            CorpusSource::Directory(dir) => {
                let path = dir.join(language.corpus_file());
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| LoadError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
            CorpusSource::Remote { client, .. } => {
                let url = self.describe(language);
                let response = get_with_retry(client, &url).await?;
                if !response.status().is_success() {
                    return Err(LoadError::Status {
                        url,
                        status: response.status().as_u16(),
                    });
                }
                Ok(response.text().await?)
            }
        }
    }
}

async fn get_with_retry(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, LoadError> {
    let mut delay_ms = 150u64;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match client.get(url).timeout(FETCH_TIMEOUT).send().await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt >= FETCH_ATTEMPTS => return Err(LoadError::Http(e)),
            Err(e) => {
                tracing::debug!("Fetch of {} failed (attempt {}): {}", url, attempt, e);
                let jitter = rand::random::<u64>() % 50;
                tokio::time::sleep(Duration::from_millis(delay_ms + jitter)).await;
                delay_ms = (delay_ms * 2).min(1200);
            }
        }
    }
}

/// Parses a knowledge-base payload and stamps it with `language`.
///
/// A payload without a `questions` array is rejected up front with
/// `MissingQuestions` rather than a generic serde message.
pub fn parse_corpus(text: &str, language: Language) -> Result<Corpus, LoadError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|source| LoadError::Parse { language, source })?;

    if !value.get("questions").is_some_and(|q| q.is_array()) {
        return Err(LoadError::MissingQuestions(language));
    }

    for section in ["verses", "synonyms", "searchIndex"] {
        if value.get(section).is_none() {
            tracing::warn!("Corpus for {} has no '{}' section, using empty", language, section);
        }
    }

    let mut corpus: Corpus =
        serde_json::from_value(value).map_err(|source| LoadError::Parse { language, source })?;
    corpus.language = language;
    Ok(corpus)
}

/// Per-language corpus cache with an explicit lifecycle.
pub struct CorpusRepository {
    source: CorpusSource,
    cache: DashMap<Language, Arc<OnceCell<Arc<Corpus>>>>,
    /// Non-default languages `load` gave up on, with the reason.
    unavailable: DashMap<Language, String>,
    fetches: AtomicUsize,
}

impl CorpusRepository {
    pub fn new(source: CorpusSource) -> Arc<Self> {
        Arc::new(Self {
            source,
            cache: DashMap::new(),
            unavailable: DashMap::new(),
            fetches: AtomicUsize::new(0),
        })
    }

    /// Preloads the given languages. Fails on the first language that cannot be
    /// loaded even through the default-language fallback.
    pub async fn initialize(&self, languages: &[Language]) -> Result<(), LoadError> {
        for &language in languages {
            let corpus = self.load(language).await?;
            tracing::info!(
                "Corpus ready for {} ({} entries, served from {})",
                language,
                corpus.len(),
                corpus.language
            );
        }
        Ok(())
    }

    /// Returns the corpus for `language`, fetching it on first use.
    ///
    /// No fallback: a failure for a non-default language is returned as-is and
    /// nothing is cached, so the next call retries.
    pub async fn get(&self, language: Language) -> Result<Arc<Corpus>, LoadError> {
        let cell = self
            .cache
            .entry(language)
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone();

        let corpus = cell.get_or_try_init(|| self.fetch(language)).await?;
        if self.unavailable.remove(&language).is_some() {
            tracing::info!("{} corpus is available again", language);
        }
        Ok(Arc::clone(corpus))
    }

    /// Like `get`, but a non-default language that fails to load is replaced by the
    /// default-language corpus. Check `Corpus::language` to see what was served.
    ///
    /// After one failure the language is marked unavailable and served from the
    /// default corpus without refetching, until `invalidate` or a successful `get`.
    pub async fn load(&self, language: Language) -> Result<Arc<Corpus>, LoadError> {
        if language.is_default() {
            return self.get(language).await;
        }
        if self.is_unavailable(language) {
            tracing::trace!("{} corpus marked unavailable, serving {}", language, Language::DEFAULT);
            return self.get(Language::DEFAULT).await;
        }

        match self.get(language).await {
            Ok(corpus) => Ok(corpus),
            Err(err) => {
                tracing::warn!(
                    "Failed to load {} corpus ({}), falling back to {}",
                    language,
                    err,
                    Language::DEFAULT
                );
                self.unavailable.insert(language, err.to_string());
                self.get(Language::DEFAULT).await
            }
        }
    }

    /// Drops the cached corpus for `language` and forgets any earlier failure; the next
    /// `get` or `load` refetches.
    pub fn invalidate(&self, language: Language) {
        self.unavailable.remove(&language);
        if self.cache.remove(&language).is_some() {
            tracing::debug!("Invalidated cached corpus for {}", language);
        }
    }

    pub fn invalidate_all(&self) {
        self.cache.clear();
        self.unavailable.clear();
    }

    /// Whether `load` is currently serving the default corpus in place of `language`.
    pub fn is_unavailable(&self, language: Language) -> bool {
        self.unavailable.contains_key(&language)
    }

    /// Whether a parsed corpus for `language` is currently cached.
    pub fn is_cached(&self, language: Language) -> bool {
        self.cache
            .get(&language)
            .is_some_and(|cell| cell.initialized())
    }

    /// Total number of fetches started since construction.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    async fn fetch(&self, language: Language) -> Result<Arc<Corpus>, LoadError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Fetching corpus from {}", self.source.describe(language));

        let text = self.source.fetch_text(language).await?;
        let corpus = parse_corpus(&text, language).inspect_err(|err| {
            tracing::error!("Corpus for {} rejected: {}", language, err);
        })?;

        tracing::info!("Loaded {} corpus with {} entries", language, corpus.len());
        Ok(Arc::new(corpus))
    }
}
