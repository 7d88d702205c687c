//! Async LLM client for plan generation
//!
//! A model-agnostic HTTP client for chat completion APIs. Supports the
//! Anthropic messages format and OpenAI-compatible APIs (Mistral, OpenAI,
//! DeepSeek, etc).

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::config::LlmConfig;
use crate::core::error::{DeskError, Result};

/// API format type
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Anthropic,
    OpenAI,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
    max_tokens: u32,
    api_format: ApiFormat,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let api_format = Self::detect_api_format(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            max_tokens: 1024,
            api_format,
        }
    }

    /// Create a client from the `[llm]` config section
    ///
    /// Fails when no API key is configured.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| DeskError::LlmError("LLM_API_KEY not set".into()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DeskError::LlmError(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            api_url: config.api_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            api_format: Self::detect_api_format(&config.api_url),
        })
    }

    /// Detect API format from URL
    fn detect_api_format(url: &str) -> ApiFormat {
        if url.contains("anthropic.com") {
            ApiFormat::Anthropic
        } else {
            ApiFormat::OpenAI
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model for one completion and return its text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let text = match self.api_format {
            ApiFormat::Anthropic => {
                let request = MessagesRequest {
                    model: &self.model,
                    max_tokens: self.max_tokens,
                    system,
                    messages: [ChatTurn::user(user)],
                };
                let headers = [
                    ("x-api-key", self.api_key.clone()),
                    ("anthropic-version", ANTHROPIC_VERSION.to_string()),
                ];
                let reply: MessagesReply = self.post(&request, &headers).await?;
                reply.content.into_iter().next().map(|block| block.text)
            }
            ApiFormat::OpenAI => {
                let request = ChatRequest {
                    model: &self.model,
                    max_tokens: self.max_tokens,
                    messages: [ChatTurn::system(system), ChatTurn::user(user)],
                };
                let headers = [("authorization", format!("Bearer {}", self.api_key))];
                let reply: ChatReply = self.post(&request, &headers).await?;
                reply.choices.into_iter().next().map(|choice| choice.message.content)
            }
        };
        text.ok_or_else(|| DeskError::LlmError("Empty response".into()))
    }

    /// POST `body` as JSON and decode the reply; non-2xx is an error carrying
    /// the status and body text
    async fn post<B, R>(&self, body: &B, headers: &[(&str, String)]) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.client.post(&self.api_url).json(body);
        for (name, value) in headers {
            request = request.header(*name, value);
        }
        debug!(url = %self.api_url, model = %self.model, "Sending planner request");

        let response = request
            .send()
            .await
            .map_err(|e| DeskError::LlmError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DeskError::LlmError(format!("API error {}: {}", status, detail)));
        }

        response
            .json()
            .await
            .map_err(|e| DeskError::LlmError(format!("Undecodable reply: {}", e)))
    }
}

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// One turn of a chat transcript, borrowed for the request body
#[derive(Debug, Serialize)]
struct ChatTurn<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatTurn<'a> {
    fn system(content: &'a str) -> Self {
        Self { role: "system", content }
    }

    fn user(content: &'a str) -> Self {
        Self { role: "user", content }
    }
}

/// Anthropic messages API: the system prompt travels outside the transcript
#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [ChatTurn<'a>; 1],
}

#[derive(Deserialize)]
struct MessagesReply {
    content: Vec<TextBlock>,
}

#[derive(Deserialize)]
struct TextBlock {
    text: String,
}

/// Chat-completions body understood by Mistral, OpenAI and DeepSeek
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatTurn<'a>; 2],
}

#[derive(Deserialize)]
struct ChatReply {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: String,
}
