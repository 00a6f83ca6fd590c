//! Enrichment Module Tests
//!
//! ## Test Scopes
//! - **Synthesis**: missing key short-circuits, unreachable endpoints degrade, prompt layout.
//! - **Endpoint**: a local chat-completions server checks model rotation, caching,
//!   follow-up suggestions and insights end to end.
//! - **Translation**: payload parsing and unchanged passthrough on failure.

#[cfg(test)]
mod tests {
    use crate::conversation::session::{Role, Turn};
    use crate::corpus::types::Language;
    use crate::enrichment::groq::{
        build_system_prompt, build_user_prompt, fallback_follow_ups, parse_follow_ups, GroqClient,
        DEFAULT_API_URL, FALLBACK_FOLLOW_UPS_EN, FALLBACK_FOLLOW_UPS_HI,
    };
    use crate::enrichment::translate::{parse_gtx_response, Translator};
    use crate::enrichment::types::EnrichmentError;
    use crate::search::types::SearchResult;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    // Nothing listens on port 1 locally: connection refused comes back immediately.
    const UNREACHABLE: &str = "http://127.0.0.1:1/v1/chat/completions";

    fn result(reference: &str, description: &str) -> SearchResult {
        SearchResult {
            title: "What is the soul?".to_string(),
            reference: reference.to_string(),
            description: description.to_string(),
            excerpt: description.to_string(),
            confidence: 70,
            question_id: "q-self".to_string(),
        }
    }

    fn turn(role: Role, content: &str) -> Turn {
        Turn {
            role,
            content: content.to_string(),
        }
    }

    // ============================================================
    // SYNTHESIS
    // ============================================================

    #[tokio::test]
    async fn test_query_without_key_fails_fast() {
        let client = GroqClient::new(None, DEFAULT_API_URL);
        assert!(!client.is_configured());

        let err = client
            .query_ai("Who am I?", &[result("SB 2.2.6", "The soul is eternal")], &[], Language::En)
            .await
            .unwrap_err();

        assert_eq!(err, EnrichmentError::NoApiKey);
        assert!(!err.fallback_message().is_empty());
    }

    #[tokio::test]
    async fn test_blank_key_counts_as_missing() {
        let client = GroqClient::new(Some("   ".to_string()), DEFAULT_API_URL);
        assert!(!client.is_configured());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades_to_other() {
        let client = GroqClient::with_models(Some("test-key".to_string()), UNREACHABLE, &["model-a", "model-b"]);

        let err = client
            .query_ai("Who am I?", &[result("SB 2.2.6", "The soul is eternal")], &[], Language::En)
            .await
            .unwrap_err();

        assert!(matches!(err, EnrichmentError::Other(_)));
        assert_eq!(
            err.fallback_message(),
            EnrichmentError::Other(String::new()).fallback_message()
        );
    }

    #[tokio::test]
    async fn test_no_models_is_an_error() {
        let client = GroqClient::with_models(Some("test-key".to_string()), UNREACHABLE, &[]);
        let err = client.query_ai("q", &[], &[], Language::En).await.unwrap_err();
        assert!(matches!(err, EnrichmentError::Other(_)));
    }

    #[test]
    fn test_fallback_messages_are_distinct() {
        let messages = [
            EnrichmentError::NoApiKey.fallback_message(),
            EnrichmentError::RateLimit.fallback_message(),
            EnrichmentError::EmptyResponse.fallback_message(),
            EnrichmentError::Other("boom".into()).fallback_message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_user_prompt_layout() {
        let results = vec![
            result("SB 2.2.6", "The soul is eternal"),
            result("SB 1.2.6", "Devotion satisfies the self"),
            result("SB 3.31.1", "Death is a change of body"),
            result("SB 9.9.9", "Fourth result is left out"),
        ];
        let long = "x".repeat(250);
        let turns = vec![
            turn(Role::User, "oldest turn is left out"),
            turn(Role::User, "Who am I?"),
            turn(Role::Assistant, &long),
        ];

        let prompt = build_user_prompt("Tell me more", &results, &turns, Language::En);

        assert!(prompt.contains("1. [SB 2.2.6]\nThe soul is eternal"));
        assert!(prompt.contains("3. [SB 3.31.1]\nDeath is a change of body"));
        assert!(!prompt.contains("Fourth result"));
        assert!(prompt.contains("Q: Who am I?..."));
        assert!(prompt.contains(&format!("A: {}...", "x".repeat(100))));
        assert!(!prompt.contains(&"x".repeat(101)));
        assert!(!prompt.contains("oldest turn"));
        assert!(prompt.contains("Question:\nTell me more"));
        assert!(!prompt.contains("हिंदी"));
    }

    #[test]
    fn test_hindi_prompts_ask_for_hindi() {
        let prompt = build_user_prompt("भक्ति क्या है?", &[result("SB 1.2.6", "भक्ति")], &[], Language::Hi);
        assert!(prompt.contains("हिंदी"));
        assert!(!prompt.contains("Context:"));

        assert_eq!(Language::detect(build_system_prompt(Language::Hi)), Language::Hi);
        assert!(build_system_prompt(Language::En).contains("Srimad Bhagavatam"));
    }

    // ============================================================
    // ENDPOINT
    // ============================================================

    /// Serves `status` and `body` for every chat request and records the request bodies.
    async fn chat_endpoint(status: StatusCode, body: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let app = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(request): Json<Value>| {
                let seen = Arc::clone(&seen);
                let body = body.clone();
                async move {
                    seen.lock().unwrap().push(request);
                    (status, Json(body))
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/v1/chat/completions", addr), requests)
    }

    fn completion(content: &str) -> Value {
        json!({ "choices": [ { "message": { "role": "assistant", "content": content } } ] })
    }

    fn request_count(requests: &Arc<Mutex<Vec<Value>>>) -> usize {
        requests.lock().unwrap().len()
    }

    fn keyed_client(url: &str) -> Arc<GroqClient> {
        GroqClient::with_models(Some("test-key".to_string()), url, &["model-a", "model-b"])
    }

    #[tokio::test]
    async fn test_synthesis_is_cached_until_cleared() {
        let (url, requests) = chat_endpoint(StatusCode::OK, completion("• The soul is eternal (SB 2.2.6)")).await;
        let client = keyed_client(&url);
        let results = [result("SB 2.2.6", "The soul is eternal")];

        let first = client.query_ai("Who am I?", &results, &[], Language::En).await.unwrap();
        assert_eq!(first.content, "• The soul is eternal (SB 2.2.6)");
        assert_eq!(first.model, "model-a");
        assert_eq!(first.source_verses, vec!["SB 2.2.6".to_string()]);

        // Case and spacing do not defeat the cache
        let second = client.query_ai("who  am i?", &results, &[], Language::En).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(request_count(&requests), 1);

        client.clear_cache();
        client.query_ai("Who am I?", &results, &[], Language::En).await.unwrap();
        assert_eq!(request_count(&requests), 2);

        let sent = requests.lock().unwrap()[0].clone();
        assert_eq!(sent["model"], "model-a");
        assert_eq!(sent["max_tokens"], 600);
        assert_eq!(sent["messages"][0]["role"], "system");
        assert!(sent.get("response_format").is_none());
    }

    #[tokio::test]
    async fn test_rate_limit_tries_every_model() {
        let (url, requests) =
            chat_endpoint(StatusCode::TOO_MANY_REQUESTS, json!({ "error": { "message": "slow down" } })).await;
        let client = keyed_client(&url);

        let err = client
            .query_ai("Who am I?", &[result("SB 2.2.6", "The soul is eternal")], &[], Language::En)
            .await
            .unwrap_err();

        assert_eq!(err, EnrichmentError::RateLimit);
        let models: Vec<Value> = requests.lock().unwrap().iter().map(|r| r["model"].clone()).collect();
        assert_eq!(models, vec![json!("model-a"), json!("model-b")]);
    }

    #[tokio::test]
    async fn test_api_error_message_is_reported() {
        let (url, requests) =
            chat_endpoint(StatusCode::BAD_REQUEST, json!({ "error": { "message": "model decommissioned" } })).await;
        let client = keyed_client(&url);

        let err = client.query_ai("q", &[], &[], Language::En).await.unwrap_err();

        assert_eq!(err, EnrichmentError::Other("model decommissioned".to_string()));
        assert_eq!(request_count(&requests), 2);
    }

    #[tokio::test]
    async fn test_blank_completion_is_empty_response() {
        let (url, _requests) = chat_endpoint(StatusCode::OK, completion("   ")).await;
        let client = keyed_client(&url);

        let err = client.query_ai("q", &[], &[], Language::En).await.unwrap_err();
        assert_eq!(err, EnrichmentError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_follow_ups_are_parsed_and_cached() {
        let content = json!({
            "questions": ["How does the soul relate to God?", "  ", "What is the nature of the body?", "Why serve?", "Extra"]
        })
        .to_string();
        let (url, requests) = chat_endpoint(StatusCode::OK, completion(&content)).await;
        let client = keyed_client(&url);
        let history = [
            turn(Role::User, "Who am I?"),
            turn(Role::Assistant, "You are an eternal spiritual soul"),
        ];

        let questions = client.follow_up_questions(&history, Language::En).await;
        assert_eq!(
            questions,
            vec![
                "How does the soul relate to God?".to_string(),
                "What is the nature of the body?".to_string(),
                "Why serve?".to_string(),
            ]
        );

        assert_eq!(client.follow_up_questions(&history, Language::En).await, questions);
        assert_eq!(request_count(&requests), 1);

        let sent = requests.lock().unwrap()[0].clone();
        assert_eq!(sent["response_format"]["type"], "json_object");
        assert!(sent["messages"][0]["content"]
            .as_str()
            .unwrap()
            .contains("You are an eternal spiritual soul"));
    }

    #[tokio::test]
    async fn test_follow_ups_fall_back_on_any_failure() {
        let history = [turn(Role::Assistant, "Bhakti is loving service")];

        let no_key = GroqClient::new(None, DEFAULT_API_URL);
        assert_eq!(no_key.follow_up_questions(&history, Language::En).await, fallback_follow_ups(Language::En));
        assert_eq!(no_key.follow_up_questions(&history, Language::Hi).await, fallback_follow_ups(Language::Hi));

        let unreachable = keyed_client(UNREACHABLE);
        assert_eq!(
            unreachable.follow_up_questions(&history, Language::Hi).await,
            fallback_follow_ups(Language::Hi)
        );

        let (url, requests) = chat_endpoint(StatusCode::OK, completion("not json at all")).await;
        let malformed = keyed_client(&url);
        assert_eq!(malformed.follow_up_questions(&history, Language::En).await, fallback_follow_ups(Language::En));
        // Fallbacks are not cached, so the next call asks again
        malformed.follow_up_questions(&history, Language::En).await;
        assert_eq!(request_count(&requests), 2);

        // Nothing to build on yet
        assert_eq!(malformed.follow_up_questions(&[], Language::En).await, fallback_follow_ups(Language::En));
        assert_eq!(request_count(&requests), 2);
    }

    #[test]
    fn test_fallback_follow_ups_per_language() {
        assert_eq!(fallback_follow_ups(Language::En), FALLBACK_FOLLOW_UPS_EN.map(String::from).to_vec());
        assert_eq!(fallback_follow_ups(Language::Hi), FALLBACK_FOLLOW_UPS_HI.map(String::from).to_vec());
        assert!(fallback_follow_ups(Language::Hi).iter().all(|q| Language::detect(q) == Language::Hi));
        // The English suggestions continue the conversation when typed back in
        assert!(crate::conversation::is_follow_up(FALLBACK_FOLLOW_UPS_EN[0]));
    }

    #[test]
    fn test_parse_follow_ups() {
        assert_eq!(
            parse_follow_ups(r#"{ "questions": ["A?", "B?"] }"#),
            Some(vec!["A?".to_string(), "B?".to_string()])
        );
        assert_eq!(parse_follow_ups(r#"{ "questions": ["", "  "] }"#), None);
        assert_eq!(parse_follow_ups(r#"{ "other": 1 }"#), None);
        assert_eq!(parse_follow_ups("Here are some questions"), None);
    }

    #[tokio::test]
    async fn test_deeper_insights() {
        let refs = vec!["SB 2.2.6".to_string()];

        let no_key = GroqClient::new(None, DEFAULT_API_URL);
        assert_eq!(
            no_key.deeper_insights("The soul is eternal", &refs, Language::En).await.unwrap_err(),
            EnrichmentError::NoApiKey
        );

        let (url, requests) = chat_endpoint(StatusCode::OK, completion("The self is never born.")).await;
        let client = keyed_client(&url);

        let insight = client.deeper_insights("The soul is eternal", &refs, Language::Hi).await.unwrap();
        assert_eq!(insight.content, "The self is never born.");
        assert_eq!(insight.source_verses, refs);

        client.deeper_insights("The soul is eternal", &refs, Language::Hi).await.unwrap();
        assert_eq!(request_count(&requests), 1);

        let sent = requests.lock().unwrap()[0].clone();
        let prompt = sent["messages"][0]["content"].as_str().unwrap().to_string();
        assert!(prompt.contains("Text: \"The soul is eternal\""));
        assert!(prompt.contains("Verses: SB 2.2.6"));
        assert!(prompt.contains("Language: Hindi"));
    }

    // ============================================================
    // TRANSLATION
    // ============================================================

    #[test]
    fn test_parse_gtx_joins_segments() {
        let payload = serde_json::json!([
            [
                ["भक्ति प्रेम है। ", "Bhakti is love. ", null, null, 10],
                ["आत्मा शाश्वत है।", "The soul is eternal.", null, null, 10]
            ],
            null,
            "en"
        ]);

        assert_eq!(
            parse_gtx_response(&payload).as_deref(),
            Some("भक्ति प्रेम है। आत्मा शाश्वत है।")
        );
    }

    #[test]
    fn test_parse_gtx_rejects_unexpected_shapes() {
        assert!(parse_gtx_response(&serde_json::json!({"error": "nope"})).is_none());
        assert!(parse_gtx_response(&serde_json::json!([[]])).is_none());
        assert!(parse_gtx_response(&serde_json::json!([])).is_none());
    }

    #[tokio::test]
    async fn test_translate_failure_returns_original() {
        let translator = Translator::new("http://127.0.0.1:1/translate_a/single");
        let text = "The soul is eternal.";
        assert_eq!(translator.translate(text, Language::Hi).await, text);
    }

    #[tokio::test]
    async fn test_translate_same_language_is_passthrough() {
        let translator = Translator::new("http://127.0.0.1:1/translate_a/single");
        assert_eq!(translator.translate("भक्ति", Language::Hi).await, "भक्ति");
        assert_eq!(translator.translate("  ", Language::Hi).await, "  ");
    }
}
