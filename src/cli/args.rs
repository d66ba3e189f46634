use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::core::ai::ClientKind;
use crate::infrastructure::logging::LogFormat;

#[derive(Parser, Debug)]
#[command(
    name = "ai-review",
    version,
    about = "Review source code with a locally hosted LLM",
    long_about = "ai-review sends source code to a local Ollama-compatible model and reports the \
                  detected bugs, a corrected version and documentation of the fix, either once \
                  from the command line or through a small web form."
)]
pub struct Args {
    /// Path to a TOML config file (default: ./ai-review.toml when present)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter directive, e.g. "debug" or "ai_review=trace"
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Review a single file and print the result
    Review(ReviewArgs),
    /// Serve the review web form
    Serve(ServeArgs),
}

impl Command {
    pub fn is_serve(&self) -> bool {
        matches!(self, Command::Serve(_))
    }
}

#[derive(clap::Args, Debug, Default)]
pub struct ReviewArgs {
    /// File to review (default: code_to_review/example.py)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Directory containing local model weights
    #[arg(long, value_name = "DIR")]
    pub model_path: Option<PathBuf>,

    /// Upper bound on generated tokens
    #[arg(long, value_name = "N")]
    pub max_tokens: Option<u32>,

    /// Model client variant
    #[arg(long, value_enum)]
    pub client: Option<ClientKind>,

    /// Language label used in the prompt (default: inferred from the file extension)
    #[arg(long, value_name = "LABEL")]
    pub file_type: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(clap::Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Model to use
    #[arg(short, long)]
    pub model: Option<String>,

    /// Model client variant
    #[arg(long, value_enum)]
    pub client: Option<ClientKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Raw review text between console delimiters
    #[default]
    Text,
    /// Raw review plus extracted fields as JSON
    Json,
}
