use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use super::{check_status, network_error, Generation, TextGenerator, TokenUsage, VendorError};
use crate::config::VendorConfig;

/// Gemini `generateContent` client used for summaries and image prompts
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i64,
    #[serde(default)]
    candidates_token_count: i64,
}

impl GeminiClient {
    pub fn new(client: Client, config: &VendorConfig) -> Self {
        Self {
            client,
            api_key: config.gemini_api_key.clone(),
            model: config.gemini_model.clone(),
            base_url: config.gemini_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn api_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Generation, VendorError> {
        if self.api_key.is_empty() {
            return Err(VendorError::NotConfigured("Gemini"));
        }
        let start_time = Instant::now();

        let request = ContentRequest {
            contents: vec![Content { role: "user", parts: vec![Part { text: prompt }] }],
        };

        let response = self
            .client
            .post(self.api_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(network_error)?;

        let body: ContentResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| VendorError::InvalidResponse(e.to_string()))?;

        let text = body
            .candidates
            .iter()
            .filter_map(|c| c.content.as_ref())
            .flat_map(|c| &c.parts)
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(VendorError::InvalidResponse("No content in response".to_string()));
        }

        let usage = body
            .usage_metadata
            .map(|u| TokenUsage { input_tokens: u.prompt_token_count, output_tokens: u.candidates_token_count })
            .unwrap_or_default();

        debug!("Gemini generation finished in {}ms", start_time.elapsed().as_millis());

        Ok(Generation { text, model: self.model.clone(), usage })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, key: &str) -> GeminiClient {
        let mut config = AppConfig::development().vendors;
        config.gemini_api_key = key.to_string();
        config.gemini_base_url = server.uri();
        GeminiClient::new(Client::new(), &config)
    }

    #[tokio::test]
    async fn generates_text_and_reports_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "# Resumo"}, {"text": "- ponto"}]}}],
                "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 45}
            })))
            .mount(&server)
            .await;

        let generation = client_for(&server, "test-key").generate("Resuma").await.unwrap();
        assert_eq!(generation.text, "# Resumo\n- ponto");
        assert_eq!(generation.usage, TokenUsage { input_tokens: 120, output_tokens: 45 });
    }

    #[tokio::test]
    async fn upstream_errors_surface_as_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let err = client_for(&server, "test-key").generate("x").await.unwrap_err();
        assert!(matches!(err, VendorError::Api { status: 429, .. }));
    }

    #[tokio::test]
    async fn missing_key_is_not_configured() {
        let server = MockServer::start().await;
        let err = client_for(&server, "").generate("x").await.unwrap_err();
        assert!(matches!(err, VendorError::NotConfigured("Gemini")));
    }
}
