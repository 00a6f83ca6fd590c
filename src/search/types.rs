use serde::{Deserialize, Serialize};

/// One ranked answer, shaped for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// The entry's question text.
    pub title: String,
    /// First verse reference, or the canto when the entry cites none.
    pub reference: String,
    /// Answer text with a trailing `(SB x.y.z)` citation removed.
    pub description: String,
    /// Full answer followed by the quoted verse translation, when available.
    pub excerpt: String,
    /// Rounded relevance, always in `0..=100`.
    pub confidence: u8,
    pub question_id: String,
}

/// How a result list was produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RankingKind {
    /// Entries scored above the noise floor.
    Matched,
    /// The query had no usable keywords; popular foundational entries were returned.
    Foundational,
    /// Nothing scored above the noise floor; the most popular entries were returned.
    MostPopular,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking {
    pub kind: RankingKind,
    pub results: Vec<SearchResult>,
}

impl Ranking {
    pub fn is_degraded(&self) -> bool {
        self.kind != RankingKind::Matched
    }
}
