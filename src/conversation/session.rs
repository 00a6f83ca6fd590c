//! Conversation Session
//!
//! Drives one conversation turn by turn: follow-up rewriting, retrieval, answer
//! selection and context bookkeeping. The session owns all conversational state;
//! the search engine stays stateless apart from its corpus cache.

use super::context::ConversationContext;
use super::intent::classify;
use super::query::build_contextual_query;
use crate::corpus::error::LoadError;
use crate::corpus::types::Language;
use crate::search::engine::SearchEngine;
use crate::search::types::{RankingKind, SearchResult};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Turns kept for prompt context; older turns are dropped first.
pub const MAX_HISTORY: usize = 20;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// The outcome of one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The query actually sent to the engine (rewritten for follow-ups).
    pub query: String,
    pub rewritten: bool,
    pub kind: RankingKind,
    /// The result chosen for display.
    pub result: SearchResult,
    /// Every ranked result, including the chosen one.
    pub results: Vec<SearchResult>,
}

pub struct ConversationSession {
    id: Uuid,
    language: Language,
    context: ConversationContext,
    history: Vec<Turn>,
}

impl ConversationSession {
    pub fn new(language: Language) -> Self {
        Self {
            id: Uuid::new_v4(),
            language,
            context: ConversationContext::new(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        if self.language != language {
            tracing::info!("Session {} switched language {} -> {}", self.id, self.language, language);
            self.language = language;
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// The last `n` turns, oldest first.
    pub fn recent_turns(&self, n: usize) -> &[Turn] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// The query to search for: rewritten when `text` is a follow-up and there is a
    /// previous answer to build on.
    pub fn effective_query(&self, text: &str) -> (String, bool) {
        if self.context.has_context() {
            if let Some(intent) = classify(text) {
                let query = build_contextual_query(text, &self.context);
                tracing::debug!("Follow-up {:?}: '{}' -> '{}'", intent, text, query);
                return (query, true);
            }
        }
        (text.trim().to_string(), false)
    }

    /// Answers one user message.
    ///
    /// Returns `Ok(None)` for blank input or an empty corpus; a `LoadError` only when
    /// no corpus could be loaded at all.
    pub async fn ask(&mut self, engine: &SearchEngine, text: &str) -> Result<Option<Answer>, LoadError> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let (query, rewritten) = self.effective_query(text);
        let ranking = engine.search(&query, self.language).await?;

        let Some(result) = self.context.pick(&ranking.results).cloned() else {
            tracing::warn!("No results for '{}' (empty corpus?)", query);
            return Ok(None);
        };

        self.context.record_match(&result, self.language);
        self.push_turn(Role::User, text.trim().to_string());
        self.push_turn(Role::Assistant, result.description.clone());

        Ok(Some(Answer {
            query,
            rewritten,
            kind: ranking.kind,
            result,
            results: ranking.results,
        }))
    }

    /// Starts over: context and history are cleared together; the id is renewed.
    pub fn reset(&mut self) {
        self.context.reset();
        self.history.clear();
        self.id = Uuid::new_v4();
        tracing::info!("Conversation reset, new session {}", self.id);
    }

    fn push_turn(&mut self, role: Role, content: String) {
        self.history.push(Turn { role, content });
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }
}
