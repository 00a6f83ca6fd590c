use super::context::ConversationContext;
use super::intent::{rewrite_kind, RewriteKind};

/// How many prior keywords a rewrite carries.
pub const REWRITE_KEYWORDS: usize = 3;

/// Rewrites a follow-up into a self-contained search query.
///
/// Without prior context the text is returned unchanged.
pub fn build_contextual_query(raw: &str, context: &ConversationContext) -> String {
    if !context.has_context() {
        return raw.to_string();
    }

    let raw = raw.trim();
    let topic = context.last_topic.as_str();
    let keywords = context
        .last_keywords
        .iter()
        .take(REWRITE_KEYWORDS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    let parts: Vec<&str> = match rewrite_kind(raw) {
        RewriteKind::Practice => vec![raw, "how to practice", topic, "in daily life sadhana discipline"],
        RewriteKind::Obstacle => vec![raw, "obstacles challenges on the path of", topic],
        RewriteKind::Example => vec![raw, "example story illustration of", topic],
        RewriteKind::Deeper => vec![
            topic,
            keywords.as_str(),
            "detailed explanation deeper advanced understanding",
        ],
        RewriteKind::Continue => vec![raw, keywords.as_str()],
    };

    parts
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
