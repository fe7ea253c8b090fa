//! OpenRouter chat-completion client
//!
//! All "interesting" AI behavior (content generation, research,
//! analysis) is delegated to a hosted model behind the OpenAI-compatible
//! chat completions endpoint.

use serde::{Deserialize, Serialize};

use crate::IntegrationError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// A single chat message in OpenAI wire format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// OpenRouter API client
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one chat completion and return the assistant reply text
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, IntegrationError> {
        self.chat_with_model(&self.model, messages).await
    }

    /// Run one chat completion against an explicit model
    pub async fn chat_with_model(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<String, IntegrationError> {
        let request = ChatCompletionRequest {
            model,
            messages,
            max_tokens: Some(1024),
            temperature: Some(0.7),
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", "https://greenline365.com")
            .header("X-Title", "GreenLine365")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IntegrationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| IntegrationError::InvalidResponse("no choices in completion".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_builders() {
        assert_eq!(ChatMessage::system("s").role, "system");
        assert_eq!(ChatMessage::user("u").role, "user");
        assert_eq!(ChatMessage::assistant("a").role, "assistant");
    }

    #[test]
    fn test_request_serialization_skips_empty_options() {
        let messages = vec![ChatMessage::user("hello")];
        let request = ChatCompletionRequest {
            model: "test-model",
            messages: &messages,
            max_tokens: None,
            temperature: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("max_tokens"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "hi");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = LlmClient::new(
            reqwest::Client::new(),
            "https://openrouter.ai/api/v1/",
            "key",
            "model",
        );
        assert_eq!(client.base_url, "https://openrouter.ai/api/v1");
    }
}
