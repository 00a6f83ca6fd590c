//! Knowledge Base Data Types
//!
//! Mirrors the JSON layout of the knowledge-base files. Field names on the wire are
//! camelCase (`cantoId`, `verseRefs`, `searchIndex`, `questionIds`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Supported corpus languages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Hi,
}

impl Language {
    /// The language every other language falls back to.
    pub const DEFAULT: Language = Language::En;

    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Hi => "hi",
        }
    }

    /// File name of this language's knowledge base.
    pub fn corpus_file(&self) -> &'static str {
        match self {
            Language::En => "srimad-bhagavatam.json",
            Language::Hi => "srimad-bhagavatam-hi.json",
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }

    /// Guesses the language of free text: any Devanagari character means Hindi.
    pub fn detect(text: &str) -> Language {
        if text.chars().any(|c| ('\u{0900}'..='\u{097F}').contains(&c)) {
            Language::Hi
        } else {
            Language::En
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "hi" | "hindi" => Ok(Language::Hi),
            other => Err(format!("unsupported language: {}", other)),
        }
    }
}

/// Difficulty tier of an entry. Hindi corpora use localized tier names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "मूलभूत")]
    Foundational,
    #[serde(alias = "मध्यम")]
    Intermediate,
    #[serde(alias = "उन्नत")]
    Advanced,
    #[default]
    #[serde(other)]
    Unspecified,
}

/// One question/answer unit of the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusEntry {
    pub id: String,
    pub canto_id: u32,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub verse_refs: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub popularity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verse {
    pub text: String,
    pub translation: String,
    #[serde(default)]
    pub themes: Vec<String>,
}

/// Precomputed term statistics shipped with the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchIndexEntry {
    pub question_ids: Vec<String>,
    #[serde(default)]
    pub frequency: u64,
    #[serde(default)]
    pub importance: f64,
}

/// Canonical term -> alternate terms.
pub type SynonymTable = BTreeMap<String, Vec<String>>;

pub type SearchIndex = HashMap<String, SearchIndexEntry>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusMetadata {
    pub version: String,
    #[serde(default)]
    pub total_questions: usize,
    #[serde(default)]
    pub total_cantos: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Canto {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub themes: Vec<String>,
}

/// The full knowledge base for one language.
///
/// `language` is not part of the file; the loader stamps it after parsing so callers
/// can tell whether they were served a fallback corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corpus {
    #[serde(skip)]
    pub language: Language,
    #[serde(default)]
    pub metadata: Option<CorpusMetadata>,
    #[serde(default)]
    pub cantos: Vec<Canto>,
    pub questions: Vec<CorpusEntry>,
    #[serde(default)]
    pub verses: HashMap<String, Verse>,
    #[serde(default)]
    pub synonyms: SynonymTable,
    #[serde(default)]
    pub search_index: SearchIndex,
}

impl Corpus {
    pub fn entry(&self, id: &str) -> Option<&CorpusEntry> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
