//! Outbound AI and media vendors.
//!
//! Handlers only see the traits below; `Vendors::from_config` wires the
//! reqwest-backed clients and tests substitute their own implementations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::VendorConfig;

pub mod gemini;
pub mod images;
pub mod openai;

pub use gemini::GeminiClient;
pub use images::OpenIClient;
pub use openai::OpenAiClient;

#[derive(Debug, Error)]
pub enum VendorError {
    #[error("{0} API key is not configured")]
    NotConfigured(&'static str),

    #[error("HTTP request failed: {0}")]
    Network(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    InvalidResponse(String),
}

/// Billing units reported by the vendor: tokens for LLMs, characters for
/// speech, seconds for transcription.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input_tokens: i64,
    pub output_tokens: i64,
}

#[derive(Debug, Clone)]
pub struct Generation {
    pub text: String,
    pub model: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::text(ChatRole::User, content)
    }

    pub fn text(role: ChatRole, content: impl Into<String>) -> Self {
        Self { role, content: Some(content.into()), tool_calls: vec![], tool_call_id: None }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: Some(content.into()),
            tool_calls: vec![],
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// Function the chat model may call, `parameters` is a JSON Schema object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// One assistant reply; non-empty `message.tool_calls` means the model
/// wants tool results before answering.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub message: ChatMessage,
    pub model: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone)]
pub struct Speech {
    pub audio: Vec<u8>,
    pub content_type: String,
    pub model: String,
    pub characters: i64,
}

#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub model: String,
    pub seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    pub titulo: String,
    pub url: String,
    pub miniatura: Option<String>,
    pub fonte: String,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation, VendorError>;
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatTurn, VendorError>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<Speech, VendorError>;
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: AudioUpload) -> Result<Transcription, VendorError>;
}

#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, term: &str, limit: usize) -> Result<Vec<ImageResult>, VendorError>;
}

#[derive(Clone)]
pub struct Vendors {
    pub text: Arc<dyn TextGenerator>,
    pub chat: Arc<dyn ChatModel>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub transcriber: Arc<dyn Transcriber>,
    pub images: Arc<dyn ImageSearch>,
}

impl Vendors {
    pub fn from_config(config: &VendorConfig) -> Result<Self, VendorError> {
        let client = build_client(config.timeout_ms)?;
        let openai = Arc::new(OpenAiClient::new(client.clone(), config));

        Ok(Self {
            text: Arc::new(GeminiClient::new(client.clone(), config)),
            chat: openai.clone(),
            speech: openai.clone(),
            transcriber: openai,
            images: Arc::new(OpenIClient::new(client, &config.image_search_url)),
        })
    }
}

/// One pooled client shared by every vendor, with the configured timeout
pub fn build_client(timeout_ms: u64) -> Result<reqwest::Client, VendorError> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| VendorError::Network(format!("Failed to create HTTP client: {}", e)))
}

/// Non-2xx responses become `VendorError::Api` carrying the body text
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, VendorError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
    Err(VendorError::Api { status: status.as_u16(), message })
}

pub(crate) fn network_error(e: reqwest::Error) -> VendorError {
    VendorError::Network(e.to_string())
}
