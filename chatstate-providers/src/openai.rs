//! OpenAI-compatible chat completions client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use chatstate_core::config::ProviderConfig;
use chatstate_core::session::{Message, Role};

use crate::base::{InferenceGateway, ProviderError, ProviderResult};

/// Chat completions request format
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f64,
}

/// One message on the wire
#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

impl WireMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system",
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }

    fn from_history(message: &Message) -> Self {
        Self {
            role: match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            },
            content: message.content.clone(),
        }
    }
}

/// Chat completions response format
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible gateway client
pub struct OpenAiClient {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

impl OpenAiClient {
    /// Create a new client from provider configuration
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Map instructions + history into the wire message sequence.
    ///
    /// The history already carries the new prompt as its last user turn;
    /// the prompt is only appended when a caller passes history that does
    /// not end with it.
    fn build_messages(instructions: &str, history: &[Message], prompt: &str) -> Vec<WireMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(WireMessage::system(instructions));
        messages.extend(history.iter().map(WireMessage::from_history));

        let ends_with_prompt = history
            .last()
            .map(|m| m.role == Role::User && m.content == prompt)
            .unwrap_or(false);
        if !ends_with_prompt {
            messages.push(WireMessage::user(prompt));
        }

        messages
    }

    fn apply_headers(&self, mut req_builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(api_key) = &self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }
        req_builder
    }

    fn parse_response(response: ChatCompletionResponse) -> ProviderResult<String> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?;

        choice
            .message
            .content
            .filter(|content| !content.is_empty())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("No answer content in response".to_string())
            })
    }
}

#[async_trait]
impl InferenceGateway for OpenAiClient {
    async fn generate(
        &self,
        instructions: &str,
        history: &[Message],
        prompt: &str,
    ) -> ProviderResult<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: Self::build_messages(instructions, history, prompt),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        debug!(
            "Sending chat request to {} with model {}",
            self.api_base, self.model
        );

        let url = format!("{}/chat/completions", self.api_base);
        let req_builder = self.apply_headers(self.client.post(&url).json(&request));

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let response_data: ChatCompletionResponse = response.json().await?;
        Self::parse_response(response_data)
    }
}
