use crate::corpus::types::Language;
use crate::search::tokenizer::answer_keywords;
use crate::search::types::SearchResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Keywords carried from one answer into the next turn.
pub const MAX_CONTEXT_KEYWORDS: usize = 8;

/// What the conversation was last about.
///
/// `used_ids` only grows until `reset`, which replaces the whole value at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversationContext {
    pub last_topic: String,
    pub last_keywords: Vec<String>,
    pub last_entry_id: Option<String>,
    pub used_ids: HashSet<String>,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a previous answer left a topic or keywords to build on.
    pub fn has_context(&self) -> bool {
        !self.last_topic.is_empty() || !self.last_keywords.is_empty()
    }

    /// Updates the context from the answer the user was shown.
    pub fn record_match(&mut self, result: &SearchResult, language: Language) {
        self.last_keywords = answer_keywords(&result.description, language, MAX_CONTEXT_KEYWORDS);
        self.last_topic = result.title.to_lowercase();
        self.last_entry_id = Some(result.question_id.clone());
        self.used_ids.insert(result.question_id.clone());
    }

    pub fn is_used(&self, id: &str) -> bool {
        self.used_ids.contains(id)
    }

    /// First result not shown earlier in this conversation, or the top result when
    /// every candidate has already been used.
    pub fn pick<'a>(&self, results: &'a [SearchResult]) -> Option<&'a SearchResult> {
        results
            .iter()
            .find(|r| !self.is_used(&r.question_id))
            .or_else(|| results.first())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
