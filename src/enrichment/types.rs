use serde::{Deserialize, Serialize};

/// Synthesized prose returned by the LLM collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AiResponse {
    pub content: String,
    pub model: String,
    /// References of the search results the synthesis was grounded on.
    pub source_verses: Vec<String>,
}

/// Why an enrichment call produced nothing. Callers degrade to the retrieval answer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("NO_API_KEY")]
    NoApiKey,
    #[error("RATE_LIMIT")]
    RateLimit,
    #[error("EMPTY_RESPONSE")]
    EmptyResponse,
    #[error("{0}")]
    Other(String),
}

impl EnrichmentError {
    /// Text shown to the user in place of the synthesis.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            EnrichmentError::RateLimit => {
                "The AI is busy right now. The teaching above stands on its own; try synthesis again shortly."
            }
            EnrichmentError::NoApiKey => {
                "AI synthesis is not configured. The teaching above comes straight from the Srimad Bhagavatam."
            }
            EnrichmentError::EmptyResponse => {
                "No synthesis came back this time. The verse-backed teaching above still answers your question."
            }
            EnrichmentError::Other(_) => {
                "Deeper synthesis is unavailable at the moment. The teaching above is authentic guidance."
            }
        }
    }
}

// OpenAI-compatible chat-completions wire types.

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

/// Asks the endpoint for a JSON object instead of free text.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl ResponseFormat {
    pub const JSON_OBJECT: ResponseFormat = ResponseFormat { kind: "json_object" };
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorDetail {
    pub message: Option<String>,
}

/// Body of a follow-up suggestion reply: `{ "questions": [...] }`.
#[derive(Debug, Deserialize)]
pub(crate) struct FollowUpPayload {
    #[serde(default)]
    pub questions: Vec<String>,
}
