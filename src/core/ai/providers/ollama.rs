use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ai::provider::{AIProvider, ProviderSettings};
use crate::infrastructure::error::{Result, ReviewError};

const PROVIDER_NAME: &str = "ollama";

/// Ollama `/api/chat` 请求结构
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Ollama 选项
#[derive(Debug, Serialize)]
pub(crate) struct GenerateOptions {
    // Ollama 使用 num_predict 而不是 max_tokens
    pub num_predict: u32,
}

/// Ollama `/api/chat` 响应结构
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Ollama 错误响应
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Direct client: one stateless chat call per prompt.
pub struct OllamaProvider {
    client: Client,
    settings: ProviderSettings,
}

impl OllamaProvider {
    pub fn new(client: Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
            options: self
                .settings
                .max_tokens
                .map(|num_predict| GenerateOptions { num_predict }),
        }
    }
}

#[async_trait]
impl AIProvider for OllamaProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.settings.endpoint("/api/chat");
        let request = self.build_request(prompt);
        debug!(url = %url, model = %self.settings.model, "sending chat request");

        let body = post_json(&self.client, PROVIDER_NAME, &url, &request).await?;
        let response: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ReviewError::decode(PROVIDER_NAME, e.to_string()))?;

        // A reply without message content counts as an empty review.
        Ok(response
            .message
            .and_then(|m| m.content)
            .unwrap_or_default())
    }
}

/// POST `request` as JSON and return the body of a successful response.
/// Non-2xx responses become [`ReviewError::Status`], using the runtime's
/// `{"error": ...}` message when it sends one.
pub(crate) async fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    provider: &str,
    url: &str,
    request: &T,
) -> Result<String> {
    let response = client
        .post(url)
        .json(request)
        .send()
        .await
        .map_err(|e| ReviewError::request(provider, e.to_string()))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ReviewError::request(provider, e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error)
            .unwrap_or(text);
        return Err(ReviewError::status(provider, status.as_u16(), message));
    }

    Ok(text)
}
