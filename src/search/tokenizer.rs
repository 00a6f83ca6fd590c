use crate::corpus::types::Language;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Anything that is not an ASCII word character, whitespace, a hyphen or Devanagari.
static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_\s\-\x{0900}-\x{097F}]").expect("valid regex"));

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "should", "could", "can", "may", "might", "must",
    "what", "when", "where", "who", "why", "how", "which", "this", "that", "these", "those",
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "my", "your",
    "his", "its", "our", "their", "about", "to", "from", "in", "on", "at", "by", "for", "with",
    "of",
];

const HINDI_STOP_WORDS: &[&str] = &[
    "का", "की", "के", "है", "हैं", "में", "से", "को", "और", "क्या", "यह", "वह", "एक", "पर",
    "भी", "तो", "ही", "था", "थे", "थी", "हो", "कर", "लिए", "मैं", "आप", "कौन", "कैसे",
    "क्यों", "कब", "कहाँ", "मेरा", "मेरी", "हम", "इस", "उस",
];

static ENGLISH: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

static HINDI: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    ENGLISH_STOP_WORDS
        .iter()
        .chain(HINDI_STOP_WORDS.iter())
        .copied()
        .collect()
});

/// Stop words for `language`. Hindi includes the English set, since Hindi-mode users
/// often type English.
pub fn stop_words(language: Language) -> &'static HashSet<&'static str> {
    match language {
        Language::En => &ENGLISH,
        Language::Hi => &HINDI,
    }
}

/// Lowercases, blanks out punctuation and collapses whitespace.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned = DISALLOWED.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&cleaned, " ").trim().to_string()
}

/// Splits normalized text into words. Stop words and short words are kept; this is
/// the word set the semantic score compares.
pub fn words(text: &str) -> HashSet<String> {
    normalize(text).split(' ').map(str::to_string).collect()
}

/// Query keywords: normalized words longer than two characters that are not stop words.
/// Order follows the input; duplicates are kept.
pub fn tokenize(text: &str, language: Language) -> Vec<String> {
    let stop = stop_words(language);
    normalize(text)
        .split(' ')
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !stop.contains(word))
        .map(str::to_string)
        .collect()
}

/// Keywords describing an answer, used to carry context into the next turn:
/// longer than three characters, stop words removed, first occurrence wins, at most `limit`.
pub fn answer_keywords(text: &str, language: Language, limit: usize) -> Vec<String> {
    let stop = stop_words(language);
    let mut seen = HashSet::new();
    normalize(text)
        .split(' ')
        .filter(|word| word.chars().count() > 3)
        .filter(|word| !stop.contains(word))
        .filter(|word| seen.insert(word.to_string()))
        .take(limit)
        .map(str::to_string)
        .collect()
}
