//! Completion backend for enrichment calls.

use crate::config::EnrichmentConfig;
use crate::error::{Result, ScribeError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// One enrichment request: a fixed instruction plus the transcript payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_content: String,
}

/// Trait for completion services.
///
/// This trait allows swapping implementations (real HTTP client vs mock).
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion and return the response text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Implement CompletionBackend for Arc<T> to allow sharing across tasks.
#[async_trait]
impl<T: CompletionBackend> CompletionBackend for Arc<T> {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        (**self).complete(request).await
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// HTTP completion client for an OpenAI-compatible chat endpoint.
#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl HttpCompletionClient {
    /// Builds a client from the enrichment configuration.
    pub fn new(config: &EnrichmentConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(ScribeError::MissingApiKey {
                variable: "MEDSCRIBE_LLM_API_KEY".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScribeError::CompletionRequest {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_content,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScribeError::CompletionRequest {
                message: format!("request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(ScribeError::CompletionRequest {
                message: format!("completion endpoint returned status {}", response.status()),
            });
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|e| ScribeError::CompletionResponse {
                    message: format!("invalid response body: {e}"),
                })?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ScribeError::CompletionResponse {
                message: "response contained no choices".to_string(),
            })
    }
}

/// Mock completion backend for testing.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionBackend {
    default_response: String,
    responses: Vec<(String, String)>,
    failing_needles: Vec<String>,
    fail_all: bool,
}

impl MockCompletionBackend {
    /// Create a new mock backend with default settings.
    pub fn new() -> Self {
        Self {
            default_response: "mock completion".to_string(),
            responses: Vec::new(),
            failing_needles: Vec::new(),
            fail_all: false,
        }
    }

    /// Configure the mock to return a specific response for all requests.
    pub fn with_response(mut self, response: &str) -> Self {
        self.default_response = response.to_string();
        self
    }

    /// Configure a response for requests whose system prompt contains the
    /// needle (case-insensitive).
    pub fn with_response_for(mut self, needle: &str, response: &str) -> Self {
        self.responses
            .push((needle.to_lowercase(), response.to_string()));
        self
    }

    /// Configure the mock to fail every request.
    pub fn with_failure(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Configure the mock to fail requests whose system prompt contains the
    /// needle (case-insensitive).
    pub fn with_failure_for(mut self, needle: &str) -> Self {
        self.failing_needles.push(needle.to_lowercase());
        self
    }
}

#[async_trait]
impl CompletionBackend for MockCompletionBackend {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let prompt = request.system_prompt.to_lowercase();

        if self.fail_all || self.failing_needles.iter().any(|n| prompt.contains(n)) {
            return Err(ScribeError::CompletionRequest {
                message: "mock completion failure".to_string(),
            });
        }

        for (needle, response) in &self.responses {
            if prompt.contains(needle) {
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(system: &str) -> CompletionRequest {
        CompletionRequest {
            system_prompt: system.to_string(),
            user_content: "Transcript:\n\nDoctor: Hello.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_returns_default_response() {
        let backend = MockCompletionBackend::new().with_response("hello");
        let result = backend.complete(&request("anything")).await.unwrap();
        assert_eq!(result, "hello");
    }

    #[tokio::test]
    async fn test_mock_matches_response_by_needle() {
        let backend = MockCompletionBackend::new()
            .with_response("default")
            .with_response_for("scribe", "note text");

        let matched = backend
            .complete(&request("You are an expert medical scribe."))
            .await
            .unwrap();
        assert_eq!(matched, "note text");

        let unmatched = backend.complete(&request("other")).await.unwrap();
        assert_eq!(unmatched, "default");
    }

    #[tokio::test]
    async fn test_mock_failure_for_needle_only() {
        let backend = MockCompletionBackend::new().with_failure_for("compliance");

        assert!(
            backend
                .complete(&request("You are a HIPAA compliance specialist."))
                .await
                .is_err()
        );
        assert!(backend.complete(&request("other")).await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_fail_all() {
        let backend = MockCompletionBackend::new().with_failure();
        let result = backend.complete(&request("anything")).await;

        match result {
            Err(ScribeError::CompletionRequest { message }) => {
                assert_eq!(message, "mock completion failure");
            }
            _ => panic!("expected CompletionRequest error"),
        }
    }

    #[tokio::test]
    async fn test_backend_trait_is_object_safe() {
        let backend: Box<dyn CompletionBackend> =
            Box::new(MockCompletionBackend::new().with_response("boxed"));
        let result = backend.complete(&request("x")).await.unwrap();
        assert_eq!(result, "boxed");
    }

    #[test]
    fn test_http_client_requires_api_key() {
        let config = EnrichmentConfig::default();
        let result = HttpCompletionClient::new(&config);
        assert!(matches!(result, Err(ScribeError::MissingApiKey { .. })));
    }

    #[test]
    fn test_http_client_builds_with_api_key() {
        let config = EnrichmentConfig {
            api_key: "sk-test".to_string(),
            ..EnrichmentConfig::default()
        };
        assert!(HttpCompletionClient::new(&config).is_ok());
    }

    #[test]
    fn test_chat_request_wire_format() {
        let body = ChatRequest {
            model: "test-model",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
            max_tokens: 4000,
            temperature: 0.1,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "test-model");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "usr");
        assert_eq!(json["max_tokens"], 4000);
    }

    #[test]
    fn test_chat_response_parses_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"result text"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content, "result text");
    }
}
