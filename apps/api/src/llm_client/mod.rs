//! LLM client: the single point of entry for all Anthropic API calls.
//!
//! ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
//! All LLM interactions MUST go through this module.
//!
//! Each call is a single attempt. A failed call ends the request and the
//! dashboard lets the user retry by hand.
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const HTTP_TIMEOUT_SECS: u64 = 120;

/// Model and token budget for one kind of generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelSpec {
    pub model: &'static str,
    pub max_tokens: u32,
}

/// Short structured observations; a small fast model is enough.
pub const INSIGHTS_MODEL: ModelSpec = ModelSpec {
    model: "claude-3-5-haiku-20241022",
    max_tokens: 1024,
};

/// Longer investor-facing narrative.
pub const STORY_MODEL: ModelSpec = ModelSpec {
    model: "claude-sonnet-4-6",
    max_tokens: 2048,
};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx from the API. `body` is the raw response text.
    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    pub usage: Option<Usage>,
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

/// Anything that can turn a prompt into completion text.
///
/// Carried in `AppState` as `Arc<dyn TextGenerator>` so handlers can be
/// exercised without the hosted API.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str, spec: ModelSpec) -> Result<String, LlmError>;
}

/// Thin wrapper over the Anthropic Messages API.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_url: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
                .build()?,
            api_key,
            api_url,
        })
    }

    /// Makes one call to the Messages API, returning the full response object.
    pub async fn call(&self, prompt: &str, spec: ModelSpec) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: spec.model,
            max_tokens: spec.max_tokens,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(usage) = &llm_response.usage {
            debug!(
                "LLM call succeeded: model={}, input_tokens={}, output_tokens={}",
                spec.model, usage.input_tokens, usage.output_tokens
            );
        }

        Ok(llm_response)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn complete(&self, prompt: &str, spec: ModelSpec) -> Result<String, LlmError> {
        let response = self.call(prompt, spec).await?;
        Ok(response.text().unwrap_or_default().to_string())
    }
}

fn array_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[\s\S]*\]").expect("array pattern is valid"))
}

fn object_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{[\s\S]*\}").expect("object pattern is valid"))
}

/// Parses the widest `[...]` span in free text. `None` when there is no
/// such span or it is not valid JSON of the requested shape.
pub fn extract_json_array<T: DeserializeOwned>(text: &str) -> Option<Vec<T>> {
    extract_with(array_pattern(), text)
}

/// Parses the widest `{...}` span in free text.
pub fn extract_json_object<T: DeserializeOwned>(text: &str) -> Option<T> {
    extract_with(object_pattern(), text)
}

fn extract_with<T: DeserializeOwned>(pattern: &Regex, text: &str) -> Option<T> {
    let matched = pattern.find(text)?;
    match serde_json::from_str(matched.as_str()) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("LLM response contained unparsable JSON: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_extract_array_from_prose() {
        let text = "Here you go:\n[{\"title\": \"a\"}, {\"title\": \"b\"}]\nHope this helps.";
        let items: Vec<Value> = extract_json_array(text).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_extract_array_without_brackets_is_none() {
        assert!(extract_json_array::<Value>("No observations today.").is_none());
    }

    #[test]
    fn test_extract_array_with_invalid_json_is_none() {
        assert!(extract_json_array::<Value>("[not json]").is_none());
    }

    #[test]
    fn test_extract_object_strips_fences() {
        let text = "```json\n{\"headline\": \"x\", \"nested\": {\"a\": 1}}\n```";
        let obj: Value = extract_json_object(text).unwrap();
        assert_eq!(obj["nested"]["a"], 1);
    }

    #[test]
    fn test_extract_object_without_braces_is_none() {
        assert!(extract_json_object::<Value>("I cannot help with that.").is_none());
    }

    async fn fake_messages_api(status: axum::http::StatusCode, reply: Value) -> String {
        use axum::{http::HeaderMap, routing::post, Json, Router};

        let router = Router::new().route(
            "/v1/messages",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let reply = reply.clone();
                async move {
                    assert_eq!(headers["x-api-key"], "test-key");
                    assert_eq!(headers["anthropic-version"], ANTHROPIC_VERSION);
                    assert_eq!(body["model"], INSIGHTS_MODEL.model);
                    assert_eq!(body["messages"][0]["role"], "user");
                    (status, Json(reply))
                }
            }),
        );
        format!("{}/v1/messages", crate::state::test_support::serve(router).await)
    }

    #[tokio::test]
    async fn test_complete_returns_text_block() {
        let url = fake_messages_api(
            axum::http::StatusCode::OK,
            serde_json::json!({
                "content": [{"type": "text", "text": "[]"}],
                "usage": {"input_tokens": 10, "output_tokens": 2}
            }),
        )
        .await;
        let client = LlmClient::new("test-key".to_string(), url).unwrap();
        assert_eq!(client.complete("prompt", INSIGHTS_MODEL).await.unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_non_success_keeps_status_and_body() {
        let url = fake_messages_api(
            axum::http::StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({"error": "rate limited"}),
        )
        .await;
        let client = LlmClient::new("test-key".to_string(), url).unwrap();
        match client.complete("prompt", INSIGHTS_MODEL).await {
            Err(LlmError::Api { status, body }) => {
                assert_eq!(status, 429);
                assert!(body.contains("rate limited"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_response_text_picks_first_text_block() {
        let resp: LlmResponse = serde_json::from_str(
            r#"{"content": [{"type": "tool_use"}, {"type": "text", "text": "hi"}]}"#,
        )
        .unwrap();
        assert_eq!(resp.text(), Some("hi"));
    }
}
