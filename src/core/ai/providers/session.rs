use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::ai::provider::{AIProvider, ProviderSettings};
use crate::core::ai::providers::ollama::{post_json, GenerateOptions};
use crate::infrastructure::error::{Result, ReviewError};

const PROVIDER_NAME: &str = "ollama-session";

/// Token ceiling used when the settings do not carry one.
pub const DEFAULT_MAX_TOKENS: u32 = 300;

/// Ollama `/api/generate` 请求结构
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    prompt: Option<&'a str>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Session client: every call opens a [`ChatSession`], generates once with a
/// token ceiling, and lets the session go.
pub struct SessionProvider {
    client: Client,
    settings: ProviderSettings,
}

impl SessionProvider {
    pub fn new(client: Client, settings: ProviderSettings) -> Self {
        Self { client, settings }
    }

    pub fn max_tokens(&self) -> u32 {
        self.settings.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

#[async_trait]
impl AIProvider for SessionProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let session = ChatSession::open(&self.client, &self.settings).await?;
        let reply = session.generate(prompt, self.max_tokens()).await;
        drop(session);
        reply
    }
}

/// A scoped conversation with the runtime. Opening preloads the model;
/// dropping the value releases it.
pub struct ChatSession<'a> {
    client: &'a Client,
    settings: &'a ProviderSettings,
}

impl<'a> ChatSession<'a> {
    pub async fn open(client: &'a Client, settings: &'a ProviderSettings) -> Result<Self> {
        if let Some(dir) = &settings.model_path {
            let file = dir.join(&settings.model);
            if !file.exists() {
                return Err(ReviewError::model_unavailable(format!(
                    "model file not found: {}",
                    file.display()
                )));
            }
        }

        let preload = GenerateRequest {
            model: &settings.model,
            prompt: None,
            stream: false,
            options: None,
        };
        post_json(client, PROVIDER_NAME, &settings.endpoint("/api/generate"), &preload).await?;
        debug!(model = %settings.model, "session opened");

        Ok(Self { client, settings })
    }

    pub async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let request = GenerateRequest {
            model: &self.settings.model,
            prompt: Some(prompt),
            stream: false,
            options: Some(GenerateOptions {
                num_predict: max_tokens,
            }),
        };

        let body = post_json(
            self.client,
            PROVIDER_NAME,
            &self.settings.endpoint("/api/generate"),
            &request,
        )
        .await?;
        let response: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| ReviewError::decode(PROVIDER_NAME, e.to_string()))?;

        // A null or missing response counts as an empty review.
        Ok(response.response.unwrap_or_default())
    }
}

impl Drop for ChatSession<'_> {
    fn drop(&mut self) {
        debug!(model = %self.settings.model, "session released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_token_ceiling() {
        let provider = SessionProvider::new(Client::new(), ProviderSettings::default());
        assert_eq!(provider.max_tokens(), DEFAULT_MAX_TOKENS);

        let provider = SessionProvider::new(
            Client::new(),
            ProviderSettings {
                max_tokens: Some(64),
                ..Default::default()
            },
        );
        assert_eq!(provider.max_tokens(), 64);
    }

    #[test]
    fn test_preload_request_omits_prompt() {
        let request = GenerateRequest {
            model: "codellama",
            prompt: None,
            stream: false,
            options: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"model": "codellama", "stream": false}));
    }

    #[test]
    fn test_generate_request_carries_ceiling() {
        let request = GenerateRequest {
            model: "codellama",
            prompt: Some("review"),
            stream: false,
            options: Some(GenerateOptions { num_predict: 300 }),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["prompt"], "review");
        assert_eq!(json["options"]["num_predict"], 300);
    }

    #[test]
    fn test_generate_response_tolerates_null() {
        let null: GenerateResponse =
            serde_json::from_str(r#"{"response":null,"done":true}"#).unwrap();
        assert_eq!(null.response.unwrap_or_default(), "");

        let missing: GenerateResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(missing.response.is_none());
    }

    #[tokio::test]
    async fn test_open_fails_when_model_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ProviderSettings {
            model: "missing.gguf".to_string(),
            model_path: Some(dir.path().to_path_buf()),
            // unroutable: the check must fail before any request is made
            base_url: "http://127.0.0.1:9".to_string(),
            ..Default::default()
        };
        let client = Client::new();

        let err = ChatSession::open(&client, &settings).await.err().unwrap();
        assert!(matches!(err, ReviewError::ModelUnavailable { .. }));
        assert!(err.to_string().contains("missing.gguf"));
    }
}
