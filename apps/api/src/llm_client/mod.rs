/// LLM Client — the single point of entry for all completion calls in JobScout.
///
/// No other module may call the inference endpoint directly. The pipeline depends
/// on the `CompletionClient` trait so tests can swap in a stub.
///
/// Policy: one attempt per call, bounded by the configured timeout. No retry, no
/// caching — identical prompts always produce two network calls.
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::CompletionConfig;

pub mod prompts;

/// Hugging Face inference router (OpenAI-compatible chat completions).
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co";
pub const DEFAULT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("completion endpoint timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("malformed completion response: {0}")]
    Malformed(String),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CompletionError::Timeout
        } else if err.is_decode() {
            CompletionError::Malformed(err.to_string())
        } else {
            CompletionError::Http(err)
        }
    }
}

/// Prompt in, text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiErrorBody {
    Message(String),
    Object { message: String },
}

impl ApiErrorBody {
    fn into_message(self) -> String {
        match self {
            ApiErrorBody::Message(m) | ApiErrorBody::Object { message: m } => m,
        }
    }
}

/// Completion client backed by a hosted chat-completions endpoint.
#[derive(Clone)]
pub struct HostedCompletionClient {
    client: Client,
    config: CompletionConfig,
}

impl HostedCompletionClient {
    pub fn new(config: CompletionConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            CHAT_COMPLETIONS_PATH
        )
    }

    /// Makes a raw call to the endpoint, returning the full response object.
    pub async fn call(&self, prompt: &str) -> Result<ChatResponse, CompletionError> {
        let request_body = ChatRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let body = response.text().await?;
        let chat: ChatResponse =
            serde_json::from_str(&body).map_err(|e| CompletionError::Malformed(e.to_string()))?;

        if let Some(usage) = &chat.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(chat)
    }
}

#[async_trait]
impl CompletionClient for HostedCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let response = self.call(prompt).await?;
        response
            .text()
            .map(str::to_string)
            .ok_or(CompletionError::EmptyContent)
    }
}

/// Pulls a readable message out of an error body, falling back to the raw body.
fn api_error_message(body: String) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.into_message())
        .unwrap_or(body)
}
