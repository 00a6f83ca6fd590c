//! Relevance Scoring
//!
//! A hand-tuned lexical heuristic. Four signals are computed per entry and combined
//! with fixed weights:
//!
//! | signal      | weight | source                                              |
//! |-------------|--------|-----------------------------------------------------|
//! | keyword     | 0.35   | substring / tag / theme matches                     |
//! | semantic    | 0.40   | Jaccard overlap of query and question words         |
//! | index boost | 0.15   | curated `importance` from the shipped search index  |
//! | popularity  | 0.10   | curated `popularity` of the entry                   |
//!
//! The constants below are tuned against the shipped corpus; changing any of them
//! changes which answer a user sees.

use super::tokenizer::{normalize, words};
use crate::corpus::types::{CorpusEntry, SearchIndex};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub const KEYWORD_WEIGHT: f64 = 0.35;
pub const SEMANTIC_WEIGHT: f64 = 0.40;
pub const INDEX_WEIGHT: f64 = 0.15;
pub const POPULARITY_WEIGHT: f64 = 0.10;

pub const EXACT_QUESTION_MATCH: f64 = 100.0;
pub const KEYWORD_TAG_MATCH: f64 = 15.0;
pub const QUESTION_TEXT_MATCH: f64 = 10.0;
pub const ANSWER_TEXT_MATCH: f64 = 5.0;
pub const THEME_MATCH: f64 = 12.0;

pub const INTERROGATIVE_BONUS: f64 = 0.10;
pub const SEMANTIC_SCALE: f64 = 100.0;
pub const INDEX_IMPORTANCE_SCALE: f64 = 10.0;
pub const POPULARITY_DIVISOR: f64 = 10.0;

static WH_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(what|who|where|when|why|how)").expect("valid regex"));

/// Per-signal scores for one entry, before weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub keyword: f64,
    pub semantic: f64,
    pub index_boost: f64,
    pub popularity: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.keyword * KEYWORD_WEIGHT
            + self.semantic * SEMANTIC_WEIGHT
            + self.index_boost * INDEX_WEIGHT
            + self.popularity * POPULARITY_WEIGHT
    }
}

pub fn score(
    query: &str,
    entry: &CorpusEntry,
    expanded: &BTreeSet<String>,
    index: &SearchIndex,
) -> ScoreBreakdown {
    ScoreBreakdown {
        keyword: keyword_score(query, entry, expanded),
        semantic: semantic_score(query, entry, expanded),
        index_boost: index_boost(entry, expanded, index),
        popularity: entry.popularity / POPULARITY_DIVISOR,
    }
}

pub fn keyword_score(query: &str, entry: &CorpusEntry, expanded: &BTreeSet<String>) -> f64 {
    let query_norm = normalize(query);
    let question_norm = normalize(&entry.question);
    let answer_norm = normalize(&entry.answer);
    let mut score = 0.0;

    if question_norm.contains(&query_norm) {
        score += EXACT_QUESTION_MATCH;
    }

    for keyword in &entry.keywords {
        if expanded.contains(&normalize(keyword)) {
            score += KEYWORD_TAG_MATCH;
        }
    }

    for keyword in expanded {
        if question_norm.contains(keyword.as_str()) {
            score += QUESTION_TEXT_MATCH;
        }
        if answer_norm.contains(keyword.as_str()) {
            score += ANSWER_TEXT_MATCH;
        }
    }

    for theme in &entry.themes {
        if expanded.contains(&normalize(theme)) {
            score += THEME_MATCH;
        }
    }

    score
}

/// Jaccard-style overlap between query words and question words.
///
/// A query word counts as shared when the question contains it or when it is one
/// of the expanded keywords. Stop words are not removed here.
pub fn semantic_score(query: &str, entry: &CorpusEntry, expanded: &BTreeSet<String>) -> f64 {
    let query_words = words(query);
    let question_words = words(&entry.question);

    let shared = query_words
        .iter()
        .filter(|w| question_words.contains(*w) || expanded.contains(*w))
        .count();
    let union = query_words.union(&question_words).count();

    let jaccard = if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    };
    let bonus = if is_interrogative(query) {
        INTERROGATIVE_BONUS
    } else {
        0.0
    };

    (jaccard + bonus) * SEMANTIC_SCALE
}

pub fn index_boost(entry: &CorpusEntry, expanded: &BTreeSet<String>, index: &SearchIndex) -> f64 {
    expanded
        .iter()
        .filter_map(|keyword| index.get(keyword))
        .filter(|term| term.question_ids.iter().any(|id| *id == entry.id))
        .map(|term| term.importance * INDEX_IMPORTANCE_SCALE)
        .sum()
}

/// Whether the raw (unnormalized) query reads as a question.
pub fn is_interrogative(query: &str) -> bool {
    query.contains('?') || WH_PREFIX.is_match(query)
}
