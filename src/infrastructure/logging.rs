use std::io;

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV_VAR: &str = "AI_REVIEW_LOG";

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: Level,
    pub format: LogFormat,
    pub include_file_location: bool,
    pub include_span_events: bool,
    /// Full filter directive; overrides `level` and the environment.
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Pretty,
            include_file_location: false,
            include_span_events: false,
            filter: None,
        }
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// 人类可读的格式
    Pretty,
    /// 紧凑格式
    Compact,
    /// JSON 格式
    Json,
}

/// Install the global subscriber. Output goes to stderr so that review text
/// printed on stdout stays clean.
pub fn setup_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = build_filter(&config, |key| std::env::var(key).ok())?;

    tracing_subscriber::registry()
        .with(create_fmt_layer(&config))
        .with(env_filter)
        .try_init()?;

    Ok(())
}

fn build_filter(
    config: &LoggingConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<EnvFilter> {
    if let Some(filter) = &config.filter {
        return Ok(EnvFilter::try_new(filter)?);
    }

    if let Some(directives) = lookup(LOG_ENV_VAR).or_else(|| lookup("RUST_LOG")) {
        return Ok(EnvFilter::try_new(directives)?);
    }

    Ok(EnvFilter::try_new(default_directives(config.level))?)
}

fn default_directives(level: Level) -> String {
    let level = level.to_string().to_lowercase();
    format!("ai_review={level},tower_http={level}")
}

fn create_fmt_layer(config: &LoggingConfig) -> Box<dyn Layer<Registry> + Send + Sync> {
    let mut layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_level(true);

    if config.include_file_location {
        layer = layer.with_file(true).with_line_number(true);
    }

    if config.include_span_events {
        layer = layer.with_span_events(FmtSpan::CLOSE);
    }

    match config.format {
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}
