//! OpenAI-compatible LLM client.
//!
//! Works with OpenRouter, OpenAI, and any endpoint exposing the
//! `/v1/chat/completions` dialect. Maps HTTP failures to the typed
//! `GenerationError` taxonomy so the invoker can branch on a stable error
//! kind instead of matching provider-specific error text.

use async_trait::async_trait;
use deskmate_core::error::GenerationError;
use deskmate_core::llm::{ChatRequest, ChatResponse, LlmClient};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// An OpenAI-compatible LLM client.
pub struct OpenAiCompatClient {
    name: String,
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Create an OpenRouter client (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key)
    }

    /// Flatten a ChatRequest into the API message array:
    /// system first, then history, then the new user message.
    fn to_api_messages(request: &ChatRequest) -> Vec<ApiMessage> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        if !request.system.is_empty() {
            messages.push(ApiMessage {
                role: "system".into(),
                content: request.system.clone(),
            });
        }
        for turn in &request.history {
            messages.push(ApiMessage {
                role: turn.role.clone(),
                content: turn.text.clone(),
            });
        }
        messages.push(ApiMessage {
            role: "user".into(),
            content: request.message.clone(),
        });
        messages
    }

    /// Map a non-200 response to the error taxonomy.
    fn classify_status(status: u16, retry_after: Option<u64>, body: &str) -> GenerationError {
        match status {
            429 => {
                // Some gateways signal exhausted credit with 429 + a quota
                // error code rather than a retry window.
                if body.contains("insufficient_quota") {
                    GenerationError::QuotaExhausted(body.to_string())
                } else {
                    GenerationError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(5),
                    }
                }
            }
            402 => GenerationError::QuotaExhausted(body.to_string()),
            401 | 403 => GenerationError::Auth(
                "Invalid API key or insufficient permissions".into(),
            ),
            408 => GenerationError::Timeout(format!("status 408: {body}")),
            _ => GenerationError::Api {
                status,
                message: body.to_string(),
            },
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request),
            "stream": false,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        debug!(client = %self.name, model = %request.model, "Sending completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(e.to_string())
                } else {
                    GenerationError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status != 200 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Model endpoint returned error");
            return Err(Self::classify_status(status, retry_after, &error_body));
        }

        let api_response: ApiResponse =
            response.json().await.map_err(|e| GenerationError::Api {
                status: 200,
                message: format!("Failed to parse response: {e}"),
            })?;

        let text = api_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GenerationError::Empty);
        }

        Ok(ChatResponse {
            text,
            model: api_response.model,
        })
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskmate_core::error::ErrorClass;
    use deskmate_core::llm::ChatTurn;

    fn request() -> ChatRequest {
        ChatRequest {
            model: "test-model".into(),
            system: "You are a test assistant.".into(),
            history: vec![
                ChatTurn {
                    role: "user".into(),
                    text: "earlier question".into(),
                },
                ChatTurn {
                    role: "assistant".into(),
                    text: "earlier answer".into(),
                },
            ],
            message: "new question".into(),
            max_tokens: Some(256),
        }
    }

    #[test]
    fn message_array_order_is_system_history_user() {
        let messages = OpenAiCompatClient::to_api_messages(&request());
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages.last().unwrap().content, "new question");
    }

    #[test]
    fn empty_system_is_omitted() {
        let mut req = request();
        req.system = String::new();
        let messages = OpenAiCompatClient::to_api_messages(&req);
        assert_ne!(messages[0].role, "system");
    }

    #[test]
    fn status_429_is_rate_limited_and_retryable() {
        let err = OpenAiCompatClient::classify_status(429, Some(10), "slow down");
        assert!(matches!(
            err,
            GenerationError::RateLimited {
                retry_after_secs: 10
            }
        ));
        assert_eq!(err.class(), ErrorClass::Retryable);
    }

    #[test]
    fn missing_retry_after_header_gets_default() {
        let err = OpenAiCompatClient::classify_status(429, None, "slow down");
        assert!(matches!(
            err,
            GenerationError::RateLimited { retry_after_secs: 5 }
        ));
    }

    #[test]
    fn status_429_with_quota_code_is_quota() {
        let err = OpenAiCompatClient::classify_status(
            429,
            None,
            r#"{"error": {"code": "insufficient_quota"}}"#,
        );
        assert!(matches!(err, GenerationError::QuotaExhausted(_)));
        assert_eq!(err.class(), ErrorClass::Retryable);
    }

    #[test]
    fn status_402_is_quota() {
        let err = OpenAiCompatClient::classify_status(402, None, "payment required");
        assert!(matches!(err, GenerationError::QuotaExhausted(_)));
    }

    #[test]
    fn auth_and_server_errors_are_fatal() {
        let auth = OpenAiCompatClient::classify_status(401, None, "bad key");
        assert_eq!(auth.class(), ErrorClass::Fatal);

        let server = OpenAiCompatClient::classify_status(500, None, "boom");
        assert!(matches!(server, GenerationError::Api { status: 500, .. }));
        assert_eq!(server.class(), ErrorClass::Fatal);
    }

    #[test]
    fn response_parse_shape() {
        let json = r#"{
            "model": "test-model",
            "choices": [{"message": {"role": "assistant", "content": "hello there"}}]
        }"#;
        let parsed: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("hello there"));
    }
}
