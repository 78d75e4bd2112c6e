//! LLM Client — the single point of entry for all language-model calls in the screener.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! Extraction goes through `extraction::LlmExtractionService`, which wraps this client.
//!
//! Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in the screener.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 1024;
/// Transport-level failures get exactly one more attempt.
const MAX_RETRIES: u32 = 1;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM disabled by configuration")]
    Disabled,
}

impl LlmError {
    /// Failures worth one retry: the request never completed, or the API was overloaded.
    fn is_transport(&self) -> bool {
        match self {
            LlmError::Http(e) => !e.is_decode(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Stateless wrapper around the Messages API. Cheap to clone; every call is independent.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    endpoint: String,
    retry_delay: Duration,
}

impl LlmClient {
    pub fn new(api_key: String, timeout: Duration, retry_delay: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            endpoint: ANTHROPIC_API_URL.to_string(),
            retry_delay,
        })
    }

    /// Points the client at a different Messages-compatible endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Makes a raw call to the API, returning the full response object.
    ///
    /// A transport-level failure (send error, 429, 5xx) is retried once after the fixed
    /// `retry_delay`. Anything else, or a second failure, is returned to the caller.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt = 0;
        loop {
            match self.send(&request_body).await {
                Err(e) if e.is_transport() && attempt < MAX_RETRIES => {
                    attempt += 1;
                    warn!(
                        "LLM call failed ({e}), retrying once after {}ms...",
                        self.retry_delay.as_millis()
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                other => return other,
            }
        }
    }

    async fn send(&self, request_body: &AnthropicRequest<'_>) -> Result<LlmResponse, LlmError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<AnthropicError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        debug!(
            "LLM call succeeded: input_tokens={}, output_tokens={}",
            llm_response.usage.input_tokens, llm_response.usage.output_tokens
        );

        Ok(llm_response)
    }

    /// Calls the LLM and returns the JSON object found in its text response, unparsed.
    /// The prompt must instruct the model to return a single JSON object.
    pub async fn call_json_text(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let response = self.call(prompt, system).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        let cleaned = clean_json(text);
        if cleaned.is_empty() {
            return Err(LlmError::EmptyContent);
        }
        Ok(cleaned.to_string())
    }
}

/// Strips code fences and any prose around the outermost `{ ... }`.
fn clean_json(text: &str) -> &str {
    let text = strip_json_fences(text);
    match (text.find('{'), text.rfind('}')) {
        (Some(first), Some(last)) if first < last => &text[first..=last],
        _ => text,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::{http::StatusCode, routing::post, Router};

    const OK_BODY: &str = r#"{
        "content": [{"type": "text", "text": "Here you go:\n```json\n{\"skills\": [\"rust\"]}\n```"}],
        "usage": {"input_tokens": 12, "output_tokens": 8}
    }"#;

    /// Serves the given statuses in order (200 once they run out) and counts requests.
    async fn spawn_stub(statuses: Vec<u16>) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let statuses = Arc::new(statuses);
        let counter = hits.clone();

        let app = Router::new().route(
            "/v1/messages",
            post(move || {
                let hits = counter.clone();
                let statuses = statuses.clone();
                async move {
                    let n = hits.fetch_add(1, Ordering::SeqCst);
                    let status = statuses.get(n).copied().unwrap_or(200);
                    if status == 200 {
                        (StatusCode::OK, OK_BODY.to_string())
                    } else {
                        (
                            StatusCode::from_u16(status).unwrap(),
                            r#"{"error": {"message": "stub failure"}}"#.to_string(),
                        )
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}/v1/messages"), hits)
    }

    fn client(endpoint: String) -> LlmClient {
        LlmClient::new(
            "test-key".to_string(),
            Duration::from_secs(5),
            Duration::from_millis(10),
        )
        .unwrap()
        .with_endpoint(endpoint)
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_clean_json_drops_surrounding_prose() {
        let input = "Sure! Here is the data: {\"a\": {\"b\": 1}} Hope this helps.";
        assert_eq!(clean_json(input), "{\"a\": {\"b\": 1}}");
    }

    #[test]
    fn test_clean_json_without_object_returns_trimmed_text() {
        assert_eq!(clean_json("  I cannot help with that.  "), "I cannot help with that.");
    }

    #[test]
    fn test_transport_classification() {
        assert!(LlmError::Api { status: 429, message: String::new() }.is_transport());
        assert!(LlmError::Api { status: 503, message: String::new() }.is_transport());
        assert!(!LlmError::Api { status: 400, message: String::new() }.is_transport());
        assert!(!LlmError::EmptyContent.is_transport());
        assert!(!LlmError::Disabled.is_transport());
    }

    #[tokio::test]
    async fn test_success_returns_cleaned_json() {
        let (endpoint, hits) = spawn_stub(vec![]).await;
        let text = client(endpoint).call_json_text("p", "s").await.unwrap();
        assert_eq!(text, "{\"skills\": [\"rust\"]}");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_retried_once() {
        let (endpoint, hits) = spawn_stub(vec![503]).await;
        let text = client(endpoint).call_json_text("p", "s").await.unwrap();
        assert_eq!(text, "{\"skills\": [\"rust\"]}");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_transport_failure_is_not_retried() {
        let (endpoint, hits) = spawn_stub(vec![503, 503, 503]).await;
        let err = client(endpoint).call("p", "s").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (endpoint, hits) = spawn_stub(vec![400]).await;
        let err = client(endpoint).call("p", "s").await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "stub failure");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_after_retry() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(format!("http://{addr}/v1/messages"))
            .call("p", "s")
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Http(_)));
    }
}
