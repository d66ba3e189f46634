pub mod review_file;
pub mod serve;

pub use review_file::{infer_file_type, review_file};
pub use serve::serve;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use crate::cli::args::{Args, Command};
use crate::config::Config;
use crate::core::ai::{build_http_client, ClientKind, PromptBuilder, ProviderFactory, ProviderSettings};
use crate::review::ReviewService;

/// Build the review pipeline for one entry point: owned HTTP client,
/// provider and prompt builder.
pub fn build_service(
    config: &Config,
    kind: ClientKind,
    settings: ProviderSettings,
) -> anyhow::Result<ReviewService> {
    let client = build_http_client(config.timeout_secs.map(Duration::from_secs))?;
    let provider = ProviderFactory::create(kind, settings, client)?;
    let prompt_builder = PromptBuilder::from_options(
        config.prompt_path.as_deref(),
        config.request_section_headers,
    )
    .context("failed to load prompt template")?;

    tracing::info!(
        client = kind.as_str(),
        provider = provider.name(),
        model = provider.model(),
        "pipeline ready"
    );
    Ok(ReviewService::new(provider, prompt_builder))
}

/// 命令路由器
pub async fn route_command(args: &Args, config: &Config) -> anyhow::Result<()> {
    match &args.command {
        Command::Review(review) => {
            let settings = ProviderSettings {
                base_url: config.ollama_url.clone(),
                model: config.script.model_name.clone(),
                max_tokens: Some(config.script.max_tokens),
                model_path: config.script.model_path.clone(),
            };
            let service = build_service(config, config.script.client, settings)?;

            let mut out = std::io::stdout();
            review_file(
                &service,
                &config.script.input_path,
                review.file_type.as_deref(),
                review.format,
                &mut out,
            )
            .await?;
            Ok(())
        }
        Command::Serve(_) => {
            let settings = ProviderSettings {
                base_url: config.ollama_url.clone(),
                model: config.server.model_name.clone(),
                max_tokens: config.server.max_tokens,
                model_path: None,
            };
            let service = build_service(config, config.server.client, settings)?;
            serve(Arc::new(service), config.server.clone()).await
        }
    }
}
