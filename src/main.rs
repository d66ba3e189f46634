use ai_review::cli::args::Args;
use ai_review::commands;
use ai_review::config::Config;
use ai_review::infrastructure::logging::{setup_logging, LoggingConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    setup_logging(LoggingConfig {
        format: args.log_format,
        filter: args.log_level.clone(),
        ..Default::default()
    })?;

    let config = Config::load(&args)?;
    tracing::debug!(?config, "configuration loaded");

    commands::route_command(&args, &config).await
}
