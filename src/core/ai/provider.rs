use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::ai::providers::{OllamaProvider, SessionProvider};
use crate::infrastructure::error::{Result, ReviewError};

/// AI 提供商配置
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Base URL of the runtime, e.g. `http://localhost:11434`.
    pub base_url: String,
    pub model: String,
    /// Token ceiling forwarded as `num_predict`.
    pub max_tokens: Option<u32>,
    /// Directory expected to contain the model file (session variant only).
    pub model_path: Option<PathBuf>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: String::from("http://localhost:11434"),
            model: String::from("llama3.1:8b"),
            max_tokens: None,
            model_path: None,
        }
    }
}

impl ProviderSettings {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

/// Which client variant talks to the runtime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    /// One stateless chat call per review
    #[default]
    Direct,
    /// A scoped generation session with a token ceiling
    Session,
}

impl ClientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientKind::Direct => "direct",
            ClientKind::Session => "session",
        }
    }
}

/// A provider sends one single-turn conversation per call: the prompt is the
/// only user message. Failures are returned as errors, never as text.
#[async_trait]
pub trait AIProvider: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// AI 提供商工厂
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create(
        kind: ClientKind,
        settings: ProviderSettings,
        client: Client,
    ) -> Result<Arc<dyn AIProvider>> {
        Self::validate(&settings)?;

        match kind {
            ClientKind::Direct => Ok(Arc::new(OllamaProvider::new(client, settings))),
            ClientKind::Session => Ok(Arc::new(SessionProvider::new(client, settings))),
        }
    }

    fn validate(settings: &ProviderSettings) -> Result<()> {
        if settings.model.trim().is_empty() {
            return Err(ReviewError::config("model name is required"));
        }
        url::Url::parse(&settings.base_url).map_err(|e| {
            ReviewError::config(format!("invalid model runtime URL '{}': {}", settings.base_url, e))
        })?;
        if settings.max_tokens == Some(0) {
            return Err(ReviewError::config("max_tokens must be greater than zero"));
        }
        Ok(())
    }
}
