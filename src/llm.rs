use crate::memory::ChatMessage;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Request to language model failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Language model returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("Language model returned an unreadable body: {0}")]
    Body(#[source] reqwest::Error),
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Client for an Ollama-compatible completion API. One instance per session,
/// reused across turns; the request timeout is applied at the client level so
/// a hung model call surfaces as a turn-level error instead of stalling the
/// session forever.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: ModelOptions,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ModelOptions,
}

#[derive(Serialize)]
struct ModelOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

impl LlmClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LlmError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Single-shot completion, temperature 0. Used by the SQL translator.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: ModelOptions { temperature: 0.0 },
        };

        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::Status(response.status()));
        }

        let body: GenerateResponse = response.json().await.map_err(LlmError::Body)?;
        Ok(body.response)
    }

    /// Multi-turn chat completion: the session's prior messages plus the new
    /// user message. Used by the general-chat path.
    pub async fn chat(&self, history: &[ChatMessage], input: &str) -> Result<String, LlmError> {
        let mut messages = history.to_vec();
        messages.push(ChatMessage::user(input));

        let request = ChatRequest {
            model: &self.model,
            messages,
            stream: false,
            options: ModelOptions { temperature: 0.0 },
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LlmError::Status(response.status()));
        }

        let body: ChatResponse = response.json().await.map_err(LlmError::Body)?;
        Ok(body.message.content)
    }
}
