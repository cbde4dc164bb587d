//! OpenAI chat-completions client
//!
//! A native implementation of the OpenAI Chat Completions API, reduced to the
//! single-shot text path the pipeline needs: no tool calling, no streaming.
//! Generation parameters (model, temperature, output token cap) are fixed at
//! construction; the per-request payload is just the message list.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core_types::{Message, Role};
use crate::errors::PipelineError;
use crate::llm::CompletionClient;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            api_base: OPENAI_API_BASE.to_string(),
            model,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_api_base(mut self, api_base: String) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        self
    }

    fn format_role(role: &Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn build_request<'a>(&'a self, messages: &'a [Message]) -> OpenAiRequest<'a> {
        OpenAiRequest {
            model: &self.model,
            messages: messages
                .iter()
                .map(|m| OpenAiMessage {
                    role: Self::format_role(&m.role),
                    content: &m.content,
                })
                .collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, messages: Vec<Message>) -> Result<String, PipelineError> {
        let url = format!("{}/chat/completions", self.api_base);
        let request = self.build_request(&messages);

        log::debug!("completion request to {} with {} messages", url, messages.len());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| PipelineError::UpstreamError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| PipelineError::UpstreamError(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            if let Ok(body) = serde_json::from_str::<OpenAiErrorBody>(&response_text) {
                return Err(PipelineError::UpstreamError(format!(
                    "API error ({}): {}",
                    status, body.error.message
                )));
            }
            return Err(PipelineError::UpstreamError(format!(
                "API request failed with status {}: {}",
                status, response_text
            )));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&response_text)
            .map_err(|e| PipelineError::ParsingError(format!("invalid JSON response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PipelineError::ParsingError("response contained no completion text".to_string())
            })?;

        log::debug!("completion response: {} bytes", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_client() -> OpenAiClient {
        OpenAiClient::new("test-key".to_string(), "gpt-4o".to_string())
            .with_temperature(0.5)
            .with_max_tokens(4000)
    }

    #[test]
    fn test_client_defaults() {
        let client = OpenAiClient::new("test-key".to_string(), "gpt-4o".to_string());
        assert_eq!(client.api_base, OPENAI_API_BASE);
        assert_eq!(client.model, "gpt-4o");
        assert!(client.temperature.is_none());
        assert!(client.max_tokens.is_none());
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let client = OpenAiClient::new("k".to_string(), "gpt-4o".to_string())
            .with_api_base("http://localhost:8080/".to_string());
        assert_eq!(client.api_base, "http://localhost:8080");
    }

    #[test]
    fn test_request_serialization() {
        let client = create_test_client();
        let messages = vec![
            Message::system("You are a planner"),
            Message::user("make an email"),
        ];
        let request = client.build_request(&messages);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["max_tokens"], 4000);
        let temp = value["temperature"].as_f64().unwrap();
        assert!((temp - 0.5).abs() < 0.001);
        let wire_messages = value["messages"].as_array().unwrap();
        assert_eq!(wire_messages.len(), 2);
        assert_eq!(wire_messages[0]["role"], "system");
        assert_eq!(wire_messages[1]["role"], "user");
        assert_eq!(wire_messages[1]["content"], "make an email");
    }

    #[test]
    fn test_request_omits_unset_parameters() {
        let client = OpenAiClient::new("k".to_string(), "gpt-4o".to_string());
        let messages = vec![Message::user("hi")];
        let value = serde_json::to_value(client.build_request(&messages)).unwrap();
        assert!(value.get("temperature").is_none());
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "a plan"}, "finish_reason": "stop"}
            ]
        }"#;
        let parsed: OpenAiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            parsed.choices[0].message.content.as_deref(),
            Some("a plan")
        );
    }

    #[test]
    fn test_error_body_deserialization() {
        let json = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        let body: OpenAiErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.error.message, "Incorrect API key provided");
    }
}
