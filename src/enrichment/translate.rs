//! Best-effort machine translation.
//!
//! Uses the free `gtx` endpoint. Any failure returns the input unchanged so that
//! a translation problem never hides an answer.

use crate::corpus::types::Language;

use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct Translator {
    endpoint: String,
    cache: DashMap<(Language, String), String>,
    http_client: reqwest::Client,
}

impl Translator {
    pub fn new(endpoint: &str) -> Arc<Self> {
        Arc::new(Self {
            endpoint: endpoint.to_string(),
            cache: DashMap::new(),
            http_client: reqwest::Client::new(),
        })
    }

    /// Translates `text` into `target`. Returns `text` itself when it is blank,
    /// already in `target`, or the service cannot be reached.
    pub async fn translate(&self, text: &str, target: Language) -> String {
        if text.trim().is_empty() || Language::detect(text) == target {
            return text.to_string();
        }

        let key = (target, text.to_string());
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        match self.request(text, target).await {
            Ok(translated) => {
                self.cache.insert(key, translated.clone());
                translated
            }
            Err(e) => {
                tracing::warn!("Translation to {} failed: {}", target, e);
                text.to_string()
            }
        }
    }

    async fn request(&self, text: &str, target: Language) -> anyhow::Result<String> {
        let url = format!(
            "{}?client=gtx&sl=auto&tl={}&dt=t&q={}",
            self.endpoint,
            target.code(),
            urlencoding::encode(text)
        );

        let response = self
            .http_client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let payload: Value = response.json().await?;
        parse_gtx_response(&payload).ok_or_else(|| anyhow::anyhow!("unexpected translation payload"))
    }
}

/// Joins the translated segments of a `gtx` reply: `[[["seg", "src", ...], ...], ...]`.
pub fn parse_gtx_response(payload: &Value) -> Option<String> {
    let segments = payload.get(0)?.as_array()?;
    let joined: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();

    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
