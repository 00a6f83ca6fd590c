//! LLM Synthesis Client
//!
//! Sends retrieval results and recent turns to an OpenAI-compatible
//! chat-completions endpoint.
//!
//! ## Operations
//! - **`query_ai`**: bullet-point synthesis of the top results for a question.
//! - **`deeper_insights`**: a short reflection on one answer and its verses.
//! - **`follow_up_questions`**: three suggested next questions, or a fixed list when
//!   the endpoint cannot help.
//!
//! ## Behaviour
//! - **No key**: fails fast with `NoApiKey`, no network traffic.
//! - **Model rotation**: tries each configured model once, starting from the last one
//!   that succeeded. Rate limits back off briefly before moving on.
//! - **Caching**: successful replies are reused for an hour until `clear_cache`.

use super::types::*;
use crate::conversation::session::{Role, Turn};
use crate::corpus::types::Language;
use crate::search::types::SearchResult;

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

pub const DEFAULT_MODELS: &[&str] = &[
    "llama-3.1-8b-instant",
    "openai/gpt-oss-20b",
    "llama-3.3-70b-versatile",
    "meta-llama/llama-4-scout-17b-16e-instruct",
    "qwen/qwen3-32b",
    "openai/gpt-oss-120b",
];

const CACHE_TTL: Duration = Duration::from_secs(60 * 60);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Search results included in the prompt.
pub const PROMPT_RESULTS: usize = 3;
/// Conversation turns included in the prompt, each cut to `TURN_PREVIEW_CHARS`.
pub const PROMPT_TURNS: usize = 2;
const TURN_PREVIEW_CHARS: usize = 100;

pub const FOLLOW_UP_COUNT: usize = 3;
const FOLLOW_UP_CONTEXT_CHARS: usize = 200;

pub const FALLBACK_FOLLOW_UPS_EN: [&str; FOLLOW_UP_COUNT] =
    ["Tell me more", "How to apply this daily?", "What is the deeper meaning?"];
pub const FALLBACK_FOLLOW_UPS_HI: [&str; FOLLOW_UP_COUNT] =
    ["और बताएं", "दैनिक जीवन में कैसे अपनाएं?", "इसका गहरा अर्थ क्या है?"];

/// Sampling settings for one kind of request.
#[derive(Debug, Clone, Copy)]
struct Sampling {
    max_tokens: Option<u32>,
    temperature: f32,
    top_p: Option<f32>,
    frequency_penalty: Option<f32>,
    presence_penalty: Option<f32>,
    response_format: Option<ResponseFormat>,
}

const SYNTHESIS: Sampling = Sampling {
    max_tokens: Some(600),
    temperature: 0.7,
    top_p: Some(0.9),
    frequency_penalty: Some(0.3),
    presence_penalty: Some(0.2),
    response_format: None,
};

const INSIGHT: Sampling = Sampling {
    max_tokens: Some(400),
    temperature: 0.4,
    top_p: None,
    frequency_penalty: None,
    presence_penalty: None,
    response_format: None,
};

const FOLLOW_UPS: Sampling = Sampling {
    max_tokens: Some(200),
    temperature: 0.4,
    top_p: None,
    frequency_penalty: None,
    presence_penalty: None,
    response_format: Some(ResponseFormat::JSON_OBJECT),
};

struct Cached<T> {
    value: T,
    stored_at: Instant,
}

impl<T: Clone> Cached<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    fn fresh(&self) -> Option<T> {
        (self.stored_at.elapsed() < CACHE_TTL).then(|| self.value.clone())
    }
}

pub struct GroqClient {
    api_key: Option<String>,
    api_url: String,
    models: Vec<String>,
    current_model: AtomicUsize,
    cache: DashMap<String, Cached<AiResponse>>,
    follow_up_cache: DashMap<String, Cached<Vec<String>>>,
    http_client: reqwest::Client,
}

impl GroqClient {
    pub fn new(api_key: Option<String>, api_url: &str) -> Arc<Self> {
        Self::with_models(api_key, api_url, DEFAULT_MODELS)
    }

    pub fn with_models(api_key: Option<String>, api_url: &str, models: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            api_url: api_url.to_string(),
            models: models.iter().map(|m| m.to_string()).collect(),
            current_model: AtomicUsize::new(0),
            cache: DashMap::new(),
            follow_up_cache: DashMap::new(),
            http_client: reqwest::Client::new(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Forgets every cached reply.
    pub fn clear_cache(&self) {
        self.cache.clear();
        self.follow_up_cache.clear();
        tracing::debug!("Synthesis caches cleared");
    }

    /// Synthesizes an answer to `question` grounded on `results`.
    pub async fn query_ai(
        &self,
        question: &str,
        results: &[SearchResult],
        turns: &[Turn],
        language: Language,
    ) -> Result<AiResponse, EnrichmentError> {
        let api_key = self.api_key()?;

        let top = results.first().map(|r| r.description.as_str()).unwrap_or("");
        let key = cache_key(&["ai", language.code(), question, top]);
        if let Some(hit) = self.cache.get(&key).and_then(|c| c.fresh()) {
            tracing::debug!("Synthesis cache hit for '{}'", question);
            return Ok(hit);
        }

        let messages = [
            message("system", build_system_prompt(language)),
            message("user", &build_user_prompt(question, results, turns, language)),
        ];
        let (content, model) = self.complete_rotating(api_key, &messages, SYNTHESIS).await?;

        let response = AiResponse {
            content,
            model,
            source_verses: results.iter().map(|r| r.reference.clone()).collect(),
        };
        self.cache.insert(key, Cached::new(response.clone()));
        Ok(response)
    }

    /// A focused reflection on a single answer: its deeper meaning and how to live it.
    pub async fn deeper_insights(
        &self,
        answer: &str,
        verse_refs: &[String],
        language: Language,
    ) -> Result<AiResponse, EnrichmentError> {
        let api_key = self.api_key()?;

        let key = cache_key(&["insight", language.code(), answer]);
        if let Some(hit) = self.cache.get(&key).and_then(|c| c.fresh()) {
            return Ok(hit);
        }

        let messages = [message("user", &build_insight_prompt(answer, verse_refs, language))];
        let (content, model) = self.complete_rotating(api_key, &messages, INSIGHT).await?;

        let response = AiResponse {
            content,
            model,
            source_verses: verse_refs.to_vec(),
        };
        self.cache.insert(key, Cached::new(response.clone()));
        Ok(response)
    }

    /// Up to three suggested next questions based on the latest turn.
    ///
    /// Never fails: without a key, without history, or on any endpoint problem the
    /// fixed suggestions for `language` are returned.
    pub async fn follow_up_questions(&self, history: &[Turn], language: Language) -> Vec<String> {
        let Some(last) = history.last() else {
            return fallback_follow_ups(language);
        };
        let Ok(api_key) = self.api_key() else {
            return fallback_follow_ups(language);
        };

        let context: String = last.content.chars().take(FOLLOW_UP_CONTEXT_CHARS).collect();
        let key = cache_key(&["follow-up", language.code(), &context]);
        if let Some(hit) = self.follow_up_cache.get(&key).and_then(|c| c.fresh()) {
            return hit;
        }

        let messages = [
            message("system", &format!("Context: {}...", context)),
            message("user", &build_follow_up_prompt(language)),
        ];

        let parsed = match self.complete_rotating(api_key, &messages, FOLLOW_UPS).await {
            Ok((content, _)) => parse_follow_ups(&content),
            Err(e) => {
                tracing::debug!("Follow-up suggestions unavailable: {}", e);
                None
            }
        };

        match parsed {
            Some(questions) => {
                self.follow_up_cache.insert(key, Cached::new(questions.clone()));
                questions
            }
            None => fallback_follow_ups(language),
        }
    }

    fn api_key(&self) -> Result<&str, EnrichmentError> {
        self.api_key.as_deref().ok_or(EnrichmentError::NoApiKey)
    }

    /// Sends `messages` to each model in turn until one answers. Returns the content and
    /// the model that produced it.
    async fn complete_rotating(
        &self,
        api_key: &str,
        messages: &[ChatMessage],
        sampling: Sampling,
    ) -> Result<(String, String), EnrichmentError> {
        let start = self.current_model.load(Ordering::Relaxed);
        let mut last_error = EnrichmentError::Other("no models configured".to_string());

        for attempt in 0..self.models.len() {
            let index = (start + attempt) % self.models.len();
            let model = &self.models[index];

            let request = ChatRequest {
                model,
                messages,
                max_tokens: sampling.max_tokens,
                temperature: sampling.temperature,
                top_p: sampling.top_p,
                frequency_penalty: sampling.frequency_penalty,
                presence_penalty: sampling.presence_penalty,
                response_format: sampling.response_format,
            };

            match self.complete(api_key, &request).await {
                Ok(content) => {
                    self.current_model.store(index, Ordering::Relaxed);
                    tracing::info!("Completion served by {}", model);
                    return Ok((content, model.clone()));
                }
                Err(EnrichmentError::RateLimit) => {
                    tracing::warn!("Model {} rate limited", model);
                    last_error = EnrichmentError::RateLimit;
                    let jitter = rand::random::<u64>() % 100;
                    tokio::time::sleep(Duration::from_millis(200 + jitter)).await;
                }
                Err(err) => {
                    tracing::warn!("Model {} failed: {}", model, err);
                    last_error = err;
                }
            }
        }

        Err(last_error)
    }

    async fn complete(&self, api_key: &str, request: &ChatRequest<'_>) -> Result<String, EnrichmentError> {
        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(request)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| EnrichmentError::Other(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(EnrichmentError::RateLimit);
        }
        if !status.is_success() {
            let message = response
                .json::<ApiErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|detail| detail.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(EnrichmentError::Other(message));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::Other(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(EnrichmentError::EmptyResponse)
    }
}

fn message(role: &str, content: &str) -> ChatMessage {
    ChatMessage {
        role: role.to_string(),
        content: content.to_string(),
    }
}

/// Lowercased, whitespace-collapsed key from `parts`.
fn cache_key(parts: &[&str]) -> String {
    parts
        .join(":")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn fallback_follow_ups(language: Language) -> Vec<String> {
    let questions = match language {
        Language::En => FALLBACK_FOLLOW_UPS_EN,
        Language::Hi => FALLBACK_FOLLOW_UPS_HI,
    };
    questions.iter().map(|q| q.to_string()).collect()
}

/// Reads `{ "questions": [...] }`, keeping at most three non-blank questions.
/// `None` when the content is not that shape or holds no usable question.
pub fn parse_follow_ups(content: &str) -> Option<Vec<String>> {
    let payload: FollowUpPayload = serde_json::from_str(content.trim()).ok()?;
    let questions: Vec<String> = payload
        .questions
        .into_iter()
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .take(FOLLOW_UP_COUNT)
        .collect();

    (!questions.is_empty()).then_some(questions)
}

pub fn build_system_prompt(language: Language) -> &'static str {
    match language {
        Language::En => {
            "You are a Vedantic scholar. Synthesize the supplied teachings of the Srimad Bhagavatam.\n\
             Format: open with one sentence, then 3-5 bullet points (•) of 8-15 words each, \
             then one line of practical guidance. Cite verses in parentheses, e.g. (SB 1.2.10). \
             Be precise and concise."
        }
        Language::Hi => {
            "आप एक वैदांतिक विद्वान हैं। श्रीमद्भागवतम् की दी गई शिक्षाओं का सार प्रस्तुत करें।\n\
             प्रारूप: एक वाक्य से आरंभ करें, फिर 3-5 बुलेट (•), हर बुलेट 8-15 शब्द, \
             अंत में एक व्यावहारिक सुझाव। श्लोक संदर्भ कोष्ठक में दें, जैसे (SB 1.2.10)।"
        }
    }
}

/// Numbered teachings, the last few turns, then the question.
pub fn build_user_prompt(
    question: &str,
    results: &[SearchResult],
    turns: &[Turn],
    language: Language,
) -> String {
    let mut prompt = String::from("Teachings:\n\n");

    for (i, result) in results.iter().take(PROMPT_RESULTS).enumerate() {
        prompt.push_str(&format!("{}. [{}]\n{}\n\n", i + 1, result.reference, result.description));
    }

    let recent = &turns[turns.len().saturating_sub(PROMPT_TURNS)..];
    if !recent.is_empty() {
        prompt.push_str("Context:\n");
        for turn in recent {
            let label = match turn.role {
                Role::User => "Q",
                Role::Assistant => "A",
            };
            let preview: String = turn.content.chars().take(TURN_PREVIEW_CHARS).collect();
            prompt.push_str(&format!("{}: {}...\n", label, preview));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("Question:\n{}\n\n", question));
    prompt.push_str("Synthesize into 5-7 bullets.");

    if language == Language::Hi {
        prompt.push_str(
            "\n\nपूरा उत्तर हिंदी में दें। श्लोक संदर्भ (SB X.Y.Z) जैसे हैं वैसे रखें।",
        );
    }

    prompt
}

pub fn build_insight_prompt(answer: &str, verse_refs: &[String], language: Language) -> String {
    format!(
        "Synthesize a deeper spiritual insight from the text below.\n\n\
         Constraints:\n\
         1. Focus on the essential meaning (tattva) and its practice (sadhana).\n\
         2. Length: 100-150 words.\n\
         3. Language: {}.\n\
         4. No filler.\n\n\
         Text: \"{}\"\n\
         Verses: {}",
        language_name(language),
        answer,
        verse_refs.join(", ")
    )
}

pub fn build_follow_up_prompt(language: Language) -> String {
    format!(
        "Generate exactly {} short follow-up questions that deepen this inquiry \
         (sadhana, philosophy, application).\n\
         Language: {}. At most 12 words each. Be specific to the content; \
         avoid generic questions like \"Tell me more\".\n\
         Reply as JSON: {{ \"questions\": [\"Q1\", \"Q2\", \"Q3\"] }}",
        FOLLOW_UP_COUNT,
        language_name(language)
    )
}

fn language_name(language: Language) -> &'static str {
    match language {
        Language::En => "English",
        Language::Hi => "Hindi",
    }
}
