//! Follow-up Classification
//!
//! Two ordered rule tables, both evaluated first-match:
//! - `FOLLOW_UP_RULES` decides *whether* a message continues the previous topic.
//! - `REWRITE_RULES` decides *how* a follow-up is rewritten into a search query.

use regex::Regex;
use std::sync::LazyLock;

/// Why a message was recognised as a follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUpIntent {
    TellMeMore,
    Practice,
    Obstacles,
    ExplainWithExample,
    MoreAbout,
    Elaborate,
    ShowExample,
    HowTo,
}

static FOLLOW_UP_RULES: LazyLock<Vec<(Regex, FollowUpIntent)>> = LazyLock::new(|| {
    [
        (r"(?i)\btell me more\b", FollowUpIntent::TellMeMore),
        (r"(?i)\bhow (do|can) i practice", FollowUpIntent::Practice),
        (r"(?i)\bwhat are the obstacles\b", FollowUpIntent::Obstacles),
        (
            r"(?i)\bexplain\b.*\b(with|using)\s+(an\s+)?example",
            FollowUpIntent::ExplainWithExample,
        ),
        (r"(?i)\bmore (about|on|regarding)\b", FollowUpIntent::MoreAbout),
        (r"(?i)\belaborate", FollowUpIntent::Elaborate),
        (r"(?i)\b(give|show) me an example\b", FollowUpIntent::ShowExample),
        (r"(?i)\bhow (to|can)\b", FollowUpIntent::HowTo),
    ]
    .into_iter()
    .map(|(pattern, intent)| (Regex::new(pattern).expect("valid regex"), intent))
    .collect()
});

/// Returns the first follow-up intent `text` matches.
pub fn classify(text: &str) -> Option<FollowUpIntent> {
    FOLLOW_UP_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, intent)| *intent)
}

pub fn is_follow_up(text: &str) -> bool {
    classify(text).is_some()
}

/// Template family used to rewrite a follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteKind {
    Practice,
    Obstacle,
    Example,
    Deeper,
    /// No intent keyword: the raw text plus prior keywords.
    Continue,
}

const REWRITE_RULES: &[(&str, RewriteKind)] = &[
    ("practice", RewriteKind::Practice),
    ("obstacle", RewriteKind::Obstacle),
    ("example", RewriteKind::Example),
    ("more", RewriteKind::Deeper),
];

/// Picks the rewrite template by keyword presence in the lowercased text.
pub fn rewrite_kind(text: &str) -> RewriteKind {
    let lowered = text.to_lowercase();
    REWRITE_RULES
        .iter()
        .find(|(needle, _)| lowered.contains(needle))
        .map(|(_, kind)| *kind)
        .unwrap_or(RewriteKind::Continue)
}
