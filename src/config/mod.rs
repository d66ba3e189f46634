use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::args::{Args, Command};
use crate::core::ai::ClientKind;
use crate::infrastructure::error::{Result, ReviewError};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "ai-review.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Ollama-compatible runtime.
    pub ollama_url: String,
    /// Optional client-side timeout for model calls. No timeout when unset.
    pub timeout_secs: Option<u64>,
    /// Replaces the built-in review prompt. Must reference `{{code}}`.
    pub prompt_path: Option<PathBuf>,
    /// Ask the model for literal `Problem:`/`Solution:`/`Suggestions:` headings.
    pub request_section_headers: bool,
    pub script: ScriptConfig,
    pub server: ServerConfig,
}

/// Settings for the one-shot `review` command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScriptConfig {
    pub model_name: String,
    /// Directory holding local model weights. When set, the model file must
    /// exist there before a session is opened.
    pub model_path: Option<PathBuf>,
    pub max_tokens: u32,
    pub input_path: PathBuf,
    pub client: ClientKind,
}

/// Settings for the `serve` command.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub model_name: String,
    pub host: String,
    pub port: u16,
    /// Label used in the prompt for code submitted through the form.
    pub file_type: String,
    pub max_tokens: Option<u32>,
    pub max_upload_bytes: usize,
    pub client: ClientKind,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            timeout_secs: None,
            prompt_path: None,
            request_section_headers: false,
            script: ScriptConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            model_name: "CodeLlama-7B.Q5_K_S.gguf".to_string(),
            model_path: Some(PathBuf::from("./models")),
            max_tokens: 300,
            input_path: PathBuf::from("code_to_review/example.py"),
            client: ClientKind::Session,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            model_name: "llama3.1:8b".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            file_type: "web".to_string(),
            max_tokens: None,
            max_upload_bytes: 2 * 1024 * 1024,
            client: ClientKind::Direct,
        }
    }
}

impl Config {
    /// Build the effective configuration: defaults, then the TOML file, then
    /// `.env` and `AI_REVIEW_*` variables, then command-line flags.
    pub fn load(args: &Args) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::load_with(args, |key| env::var(key).ok())
    }

    /// [`Config::load`] with the environment supplied by `lookup`.
    pub fn load_with(args: &Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.load_from_env(lookup)?;
        config.update_from_args(args);
        config.validate(args.command.is_serve())?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ReviewError::io(path, e))?;
        Self::from_toml(&content)
            .map_err(|e| ReviewError::config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ReviewError::config(e.to_string()))
    }

    /// Apply `AI_REVIEW_*` overrides. `lookup` is `std::env::var` in production.
    pub fn load_from_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("AI_REVIEW_OLLAMA_URL") {
            self.ollama_url = url;
        }
        if let Some(secs) = lookup("AI_REVIEW_TIMEOUT_SECS") {
            self.timeout_secs = Some(parse_env("AI_REVIEW_TIMEOUT_SECS", &secs)?);
        }
        if let Some(path) = lookup("AI_REVIEW_PROMPT_PATH") {
            self.prompt_path = Some(PathBuf::from(path));
        }
        if let Some(flag) = lookup("AI_REVIEW_SECTION_HEADERS") {
            self.request_section_headers = parse_env("AI_REVIEW_SECTION_HEADERS", &flag)?;
        }
        if let Some(model) = lookup("AI_REVIEW_SCRIPT_MODEL") {
            self.script.model_name = model;
        }
        if let Some(path) = lookup("AI_REVIEW_MODEL_PATH") {
            self.script.model_path = (!path.is_empty()).then(|| PathBuf::from(path));
        }
        if let Some(tokens) = lookup("AI_REVIEW_MAX_TOKENS") {
            self.script.max_tokens = parse_env("AI_REVIEW_MAX_TOKENS", &tokens)?;
        }
        if let Some(path) = lookup("AI_REVIEW_INPUT_PATH") {
            self.script.input_path = PathBuf::from(path);
        }
        if let Some(model) = lookup("AI_REVIEW_SERVER_MODEL") {
            self.server.model_name = model;
        }
        if let Some(host) = lookup("AI_REVIEW_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("AI_REVIEW_PORT") {
            self.server.port = parse_env("AI_REVIEW_PORT", &port)?;
        }
        if let Some(file_type) = lookup("AI_REVIEW_FILE_TYPE") {
            self.server.file_type = file_type;
        }
        Ok(())
    }

    pub fn update_from_args(&mut self, args: &Args) {
        // 命令行参数优先级最高
        match &args.command {
            Command::Review(review) => {
                if let Some(input) = &review.input {
                    self.script.input_path = input.clone();
                }
                if let Some(model) = &review.model {
                    self.script.model_name = model.clone();
                }
                if let Some(path) = &review.model_path {
                    self.script.model_path = Some(path.clone());
                }
                if let Some(tokens) = review.max_tokens {
                    self.script.max_tokens = tokens;
                }
                if let Some(client) = review.client {
                    self.script.client = client;
                }
            }
            Command::Serve(serve) => {
                if let Some(host) = &serve.host {
                    self.server.host = host.clone();
                }
                if let Some(port) = serve.port {
                    self.server.port = port;
                }
                if let Some(model) = &serve.model {
                    self.server.model_name = model.clone();
                }
                if let Some(client) = serve.client {
                    self.server.client = client;
                }
            }
        }
    }

    pub fn validate(&self, serving: bool) -> Result<()> {
        url::Url::parse(&self.ollama_url).map_err(|e| {
            ReviewError::config(format!("invalid ollama_url '{}': {}", self.ollama_url, e))
        })?;

        if self.timeout_secs == Some(0) {
            return Err(ReviewError::config("timeout_secs must be greater than zero"));
        }

        if serving {
            if self.server.model_name.trim().is_empty() {
                return Err(ReviewError::config("server.model_name must not be empty"));
            }
            if self.server.port == 0 {
                return Err(ReviewError::config("server.port must not be zero"));
            }
            if self.server.max_tokens == Some(0) {
                return Err(ReviewError::config("server.max_tokens must be greater than zero"));
            }
        } else {
            if self.script.model_name.trim().is_empty() {
                return Err(ReviewError::config("script.model_name must not be empty"));
            }
            if self.script.max_tokens == 0 {
                return Err(ReviewError::config("script.max_tokens must be greater than zero"));
            }
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ReviewError::config(format!("{key}='{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::collections::HashMap;
    use std::io::Write;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.ollama_url, "http://localhost:11434");
        assert!(config.timeout_secs.is_none());
        assert!(!config.request_section_headers);

        assert_eq!(config.script.model_name, "CodeLlama-7B.Q5_K_S.gguf");
        assert_eq!(config.script.model_path, Some(PathBuf::from("./models")));
        assert_eq!(config.script.max_tokens, 300);
        assert_eq!(
            config.script.input_path,
            PathBuf::from("code_to_review/example.py")
        );
        assert_eq!(config.script.client, ClientKind::Session);

        assert_eq!(config.server.model_name, "llama3.1:8b");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.file_type, "web");
        assert_eq!(config.server.client, ClientKind::Direct);
    }

    #[test]
    fn test_config_from_toml_keeps_defaults_for_missing_keys() {
        let config = Config::from_toml(
            r#"
ollama_url = "http://gpu-box:11434"

[server]
port = 9000
client = "session"
"#,
        )
        .unwrap();

        assert_eq!(config.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.client, ClientKind::Session);
        assert_eq!(config.server.model_name, "llama3.1:8b");
        assert_eq!(config.script.max_tokens, 300);
    }

    #[test]
    fn test_config_from_toml_rejects_bad_types() {
        let err = Config::from_toml("[server]\nport = \"eighty\"").unwrap_err();
        assert!(matches!(err, ReviewError::Config { .. }));
    }

    #[test]
    fn test_config_from_env() {
        let mut config = Config::default();
        config
            .load_from_env(env_of(&[
                ("AI_REVIEW_OLLAMA_URL", "http://localhost:8080"),
                ("AI_REVIEW_TIMEOUT_SECS", "45"),
                ("AI_REVIEW_SCRIPT_MODEL", "codellama:7b"),
                ("AI_REVIEW_MODEL_PATH", ""),
                ("AI_REVIEW_MAX_TOKENS", "512"),
                ("AI_REVIEW_SERVER_MODEL", "qwen2.5-coder:7b"),
                ("AI_REVIEW_PORT", "3000"),
                ("AI_REVIEW_SECTION_HEADERS", "true"),
            ]))
            .unwrap();

        assert_eq!(config.ollama_url, "http://localhost:8080");
        assert_eq!(config.timeout_secs, Some(45));
        assert_eq!(config.script.model_name, "codellama:7b");
        assert!(config.script.model_path.is_none());
        assert_eq!(config.script.max_tokens, 512);
        assert_eq!(config.server.model_name, "qwen2.5-coder:7b");
        assert_eq!(config.server.port, 3000);
        assert!(config.request_section_headers);
    }

    #[test]
    fn test_config_from_env_rejects_bad_numbers() {
        let mut config = Config::default();
        let err = config
            .load_from_env(env_of(&[("AI_REVIEW_PORT", "not-a-port")]))
            .unwrap_err();
        assert!(err.to_string().contains("AI_REVIEW_PORT"));
    }

    #[test]
    fn test_args_override_env() {
        let mut config = Config::default();
        config
            .load_from_env(env_of(&[("AI_REVIEW_SERVER_MODEL", "from-env")]))
            .unwrap();

        let args = Args::parse_from(["ai-review", "serve", "--model", "from-args", "--port", "8123"]);
        config.update_from_args(&args);

        assert_eq!(config.server.model_name, "from-args");
        assert_eq!(config.server.port, 8123);
    }

    #[test]
    fn test_load_layers_file_then_env_then_args() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
ollama_url = "http://from-file:11434"

[server]
port = 9100
model_name = "file-model"
file_type = "python"
"#
        )
        .unwrap();
        let path = file.path().to_str().unwrap();

        let args = Args::parse_from(["ai-review", "--config", path, "serve", "--model", "args-model"]);
        let config = Config::load_with(
            &args,
            env_of(&[
                ("AI_REVIEW_OLLAMA_URL", "http://from-env:11434"),
                ("AI_REVIEW_SERVER_MODEL", "env-model"),
            ]),
        )
        .unwrap();

        // env beats file
        assert_eq!(config.ollama_url, "http://from-env:11434");
        // args beat env
        assert_eq!(config.server.model_name, "args-model");
        // file beats defaults
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.server.file_type, "python");
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_load_with_missing_config_file() {
        let args = Args::parse_from(["ai-review", "--config", "/nonexistent/ai-review.toml", "review"]);
        let err = Config::load_with(&args, env_of(&[])).unwrap_err();
        assert!(matches!(err, ReviewError::FileNotFound { .. }));
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate(false).is_ok());
        assert!(config.validate(true).is_ok());

        config.ollama_url = "not a url".to_string();
        assert!(config.validate(false).is_err());

        let mut config = Config::default();
        config.script.max_tokens = 0;
        assert!(config.validate(false).is_err());
        // script settings are irrelevant when serving
        assert!(config.validate(true).is_ok());

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate(true).is_err());

        let mut config = Config::default();
        config.server.model_name = "  ".to_string();
        assert!(config.validate(true).is_err());

        let mut config = Config::default();
        config.timeout_secs = Some(0);
        assert!(config.validate(false).is_err());
    }
}
