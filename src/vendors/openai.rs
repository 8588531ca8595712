use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{
    check_status, network_error, AudioUpload, ChatMessage, ChatModel, ChatRole, ChatTurn, Speech, SpeechSynthesizer,
    TokenUsage, ToolCall, ToolSpec, Transcriber, Transcription, VendorError,
};
use crate::config::VendorConfig;

/// Whisper bills by duration; uploads are assumed to be ~16 kB per second.
const BYTES_PER_AUDIO_SECOND: usize = 16_000;

/// OpenAI-compatible client: chat completions with tools, speech and transcription
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    tts_model: String,
    tts_voice: String,
    stt_model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: i64,
    #[serde(default)]
    completion_tokens: i64,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Messages go out in the chat/completions shape; tool arguments travel as strings.
fn to_wire(message: &ChatMessage) -> Value {
    let mut wire = json!({
        "role": message.role,
        "content": message.content,
    });
    if !message.tool_calls.is_empty() {
        wire["tool_calls"] = message
            .tool_calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": {"name": call.name, "arguments": call.arguments.to_string()},
                })
            })
            .collect();
    }
    if let Some(id) = &message.tool_call_id {
        wire["tool_call_id"] = json!(id);
    }
    wire
}

fn tool_to_wire(tool: &ToolSpec) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}

impl OpenAiClient {
    pub fn new(client: Client, config: &VendorConfig) -> Self {
        Self {
            client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            tts_model: config.tts_model.clone(),
            tts_voice: config.tts_voice.clone(),
            stt_model: config.stt_model.clone(),
        }
    }

    fn ensure_key(&self) -> Result<(), VendorError> {
        if self.api_key.is_empty() {
            return Err(VendorError::NotConfigured("OpenAI"));
        }
        Ok(())
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ChatTurn, VendorError> {
        self.ensure_key()?;

        let request = ChatRequest {
            model: &self.chat_model,
            messages: messages.iter().map(to_wire).collect(),
            tools: tools.iter().map(tool_to_wire).collect(),
        };

        let response = self
            .client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        let body: ChatResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| VendorError::InvalidResponse(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| VendorError::InvalidResponse("No choices in response".to_string()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: serde_json::from_str(&call.function.arguments).unwrap_or(Value::Null),
            })
            .collect::<Vec<_>>();

        debug!("Chat completion returned {} tool calls", tool_calls.len());

        Ok(ChatTurn {
            message: ChatMessage {
                role: ChatRole::Assistant,
                content: choice.message.content,
                tool_calls,
                tool_call_id: None,
            },
            model: self.chat_model.clone(),
            usage: body
                .usage
                .map(|u| TokenUsage { input_tokens: u.prompt_tokens, output_tokens: u.completion_tokens })
                .unwrap_or_default(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiClient {
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<Speech, VendorError> {
        self.ensure_key()?;

        let response = self
            .client
            .post(self.url("audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.tts_model,
                "input": text,
                "voice": voice.unwrap_or(&self.tts_voice),
                "response_format": "mp3",
            }))
            .send()
            .await
            .map_err(network_error)?;

        let audio = check_status(response).await?.bytes().await.map_err(network_error)?;
        if audio.is_empty() {
            return Err(VendorError::InvalidResponse("Empty audio response".to_string()));
        }

        Ok(Speech {
            audio: audio.to_vec(),
            content_type: "audio/mpeg".to_string(),
            model: self.tts_model.clone(),
            characters: text.chars().count() as i64,
        })
    }
}

#[async_trait]
impl Transcriber for OpenAiClient {
    async fn transcribe(&self, audio: AudioUpload) -> Result<Transcription, VendorError> {
        self.ensure_key()?;

        let seconds = (audio.data.len() / BYTES_PER_AUDIO_SECOND).max(1) as i64;
        let file = Part::bytes(audio.data)
            .file_name(audio.file_name)
            .mime_str(&audio.content_type)
            .map_err(network_error)?;
        let form = Form::new()
            .text("model", self.stt_model.clone())
            .text("language", "pt")
            .part("file", file);

        let response = self
            .client
            .post(self.url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(network_error)?;

        let body: TranscriptionResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| VendorError::InvalidResponse(e.to_string()))?;

        Ok(Transcription { text: body.text, model: self.stt_model.clone(), seconds })
    }
}
