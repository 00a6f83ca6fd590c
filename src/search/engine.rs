use super::scoring::score;
use super::synonyms::expand;
use super::tokenizer::tokenize;
use super::types::{Ranking, RankingKind, SearchResult};
use crate::corpus::error::LoadError;
use crate::corpus::loader::CorpusRepository;
use crate::corpus::types::{Corpus, CorpusEntry, Difficulty, Language};

use regex::Regex;
use std::sync::{Arc, LazyLock};

pub const MAX_RESULTS: usize = 5;
/// Entries scoring at or below this are treated as noise.
pub const NOISE_FLOOR: f64 = 1.0;
pub const FOUNDATIONAL_CONFIDENCE: f64 = 50.0;
pub const MOST_POPULAR_CONFIDENCE: f64 = 30.0;

/// Trailing inline citation such as ` (SB 1.2.6).` or ` (SB 2.2.6)।`.
static TRAILING_CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(\s*SB\s*[\d.]+\s*\)[.।]?\s*$").expect("valid regex"));

/// Ranks `query` against a single corpus.
///
/// Never returns an empty list for a non-empty corpus: a query without keywords
/// yields popular foundational entries (or the most popular entries when the corpus
/// has no foundational tier), and a query nothing matches yields the most popular
/// entries overall.
pub fn rank(query: &str, corpus: &Corpus) -> Ranking {
    if tokenize(query, corpus.language).is_empty() {
        let results = foundational(corpus);
        if !results.is_empty() {
            return Ranking {
                kind: RankingKind::Foundational,
                results,
            };
        }
        tracing::debug!("No foundational entries in {} corpus", corpus.language);
        return Ranking {
            kind: RankingKind::MostPopular,
            results: most_popular(corpus),
        };
    }

    let matched = match_entries(query, corpus);
    if !matched.is_empty() {
        return Ranking {
            kind: RankingKind::Matched,
            results: matched,
        };
    }

    Ranking {
        kind: RankingKind::MostPopular,
        results: most_popular(corpus),
    }
}

/// Scores every entry and returns the top results above the noise floor.
/// Ties keep corpus order.
pub fn match_entries(query: &str, corpus: &Corpus) -> Vec<SearchResult> {
    match_entries_in(query, corpus, corpus.language)
}

/// Like `match_entries`, but strips the stop words of `query_language` instead of the
/// corpus language. Used when a query is scored against another language's corpus.
pub fn match_entries_in(query: &str, corpus: &Corpus, query_language: Language) -> Vec<SearchResult> {
    let keywords = tokenize(query, query_language);
    let expanded = expand(&keywords, &corpus.synonyms);

    let mut scored: Vec<(&CorpusEntry, f64)> = corpus
        .questions
        .iter()
        .map(|entry| (entry, score(query, entry, &expanded, &corpus.search_index).total()))
        .filter(|(_, total)| *total > NOISE_FLOOR)
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(MAX_RESULTS);

    if let Some((best, top)) = scored.first() {
        tracing::debug!(
            "Query '{}' matched {} entries in {} corpus, best {} ({:.2})",
            query,
            scored.len(),
            corpus.language,
            best.id,
            top
        );
    }

    scored
        .into_iter()
        .map(|(entry, total)| format_result(entry, corpus, total))
        .collect()
}

/// The most popular foundational entries, at a flat confidence.
pub fn foundational(corpus: &Corpus) -> Vec<SearchResult> {
    let entries = corpus
        .questions
        .iter()
        .filter(|q| q.difficulty == Difficulty::Foundational);
    top_by_popularity(entries, corpus, FOUNDATIONAL_CONFIDENCE)
}

/// The most popular entries of any difficulty, at a flat confidence.
pub fn most_popular(corpus: &Corpus) -> Vec<SearchResult> {
    top_by_popularity(corpus.questions.iter(), corpus, MOST_POPULAR_CONFIDENCE)
}

fn top_by_popularity<'a>(
    entries: impl Iterator<Item = &'a CorpusEntry>,
    corpus: &Corpus,
    confidence: f64,
) -> Vec<SearchResult> {
    let mut entries: Vec<&CorpusEntry> = entries.collect();
    entries.sort_by(|a, b| b.popularity.total_cmp(&a.popularity));
    entries
        .into_iter()
        .take(MAX_RESULTS)
        .map(|entry| format_result(entry, corpus, confidence))
        .collect()
}

pub fn format_result(entry: &CorpusEntry, corpus: &Corpus, score: f64) -> SearchResult {
    let verse_ref = entry.verse_refs.first();
    let verse = verse_ref.and_then(|r| corpus.verses.get(r));

    let excerpt = match (verse_ref, verse) {
        (Some(r), Some(v)) => format!("{}\n\nVerse: \"{}\" ({})", entry.answer, v.translation, r),
        _ => entry.answer.clone(),
    };

    SearchResult {
        title: entry.question.clone(),
        reference: verse_ref
            .cloned()
            .unwrap_or_else(|| format!("Srimad Bhagavatam Canto {}", entry.canto_id)),
        description: strip_citation(&entry.answer),
        excerpt,
        confidence: confidence(score),
        question_id: entry.id.clone(),
    }
}

pub fn strip_citation(answer: &str) -> String {
    TRAILING_CITATION.replace(answer, "").into_owned()
}

/// `min(100, round(score))`, never negative.
pub fn confidence(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}

/// Entry point for callers: loads the corpus for a language and ranks a query.
pub struct SearchEngine {
    repository: Arc<CorpusRepository>,
}

impl SearchEngine {
    pub fn new(repository: Arc<CorpusRepository>) -> Arc<Self> {
        Arc::new(Self { repository })
    }

    pub fn repository(&self) -> &Arc<CorpusRepository> {
        &self.repository
    }

    /// Top results for `query`, at most `MAX_RESULTS`.
    ///
    /// Fails only when no corpus can be loaded at all.
    pub async fn find_relevant_content(
        &self,
        query: &str,
        language: Language,
    ) -> Result<Vec<SearchResult>, LoadError> {
        Ok(self.search(query, language).await?.results)
    }

    /// Like `find_relevant_content`, but also reports how the results were produced.
    ///
    /// When a non-default corpus has no match for a query with keywords, the query is
    /// re-scored once against the default corpus (keeping its own language's stop
    /// words) before degrading to the most popular entries.
    pub async fn search(&self, query: &str, language: Language) -> Result<Ranking, LoadError> {
        let corpus = self.repository.load(language).await?;
        let ranking = rank(query, &corpus);

        if ranking.kind != RankingKind::MostPopular || corpus.language.is_default() {
            return Ok(ranking);
        }

        let query_language = Language::detect(query);
        if tokenize(query, query_language).is_empty() {
            return Ok(ranking);
        }

        match self.repository.get(Language::DEFAULT).await {
            Ok(default) => {
                let matched = match_entries_in(query, &default, query_language);
                if !matched.is_empty() {
                    tracing::info!(
                        "No {} match for '{}', using {} results",
                        corpus.language,
                        query,
                        default.language
                    );
                    return Ok(Ranking {
                        kind: RankingKind::Matched,
                        results: matched,
                    });
                }
            }
            Err(err) => {
                tracing::warn!("Default corpus unavailable for re-scoring: {}", err);
            }
        }

        Ok(ranking)
    }
}
