use std::path::PathBuf;
use thiserror::Error;

/// Errors raised anywhere in the review pipeline.
#[derive(Error, Debug)]
pub enum ReviewError {
    #[error("no code provided")]
    EmptyInput,

    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{what} is not valid UTF-8 text")]
    InvalidEncoding { what: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("model unavailable: {message}")]
    ModelUnavailable { message: String },

    #[error("request to {provider} failed: {message}")]
    Request { provider: String, message: String },

    #[error("{provider} returned {status}: {message}")]
    Status {
        provider: String,
        status: u16,
        message: String,
    },

    #[error("failed to decode {provider} response: {message}")]
    Decode { provider: String, message: String },

    #[error("template error: {message}")]
    Template { message: String },
}

pub type Result<T> = std::result::Result<T, ReviewError>;

impl ReviewError {
    /// True when the failure came from talking to the model runtime.
    pub fn is_model_failure(&self) -> bool {
        matches!(
            self,
            ReviewError::ModelUnavailable { .. }
                | ReviewError::Request { .. }
                | ReviewError::Status { .. }
                | ReviewError::Decode { .. }
        )
    }

    pub fn config(message: impl Into<String>) -> Self {
        ReviewError::Config {
            message: message.into(),
        }
    }

    pub fn model_unavailable(message: impl Into<String>) -> Self {
        ReviewError::ModelUnavailable {
            message: message.into(),
        }
    }

    pub fn request(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ReviewError::Request {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn status(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        ReviewError::Status {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn decode(provider: impl Into<String>, message: impl Into<String>) -> Self {
        ReviewError::Decode {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        ReviewError::Template {
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ReviewError::FileNotFound { path }
        } else {
            ReviewError::Io { path, source }
        }
    }
}

impl From<handlebars::RenderError> for ReviewError {
    fn from(err: handlebars::RenderError) -> Self {
        ReviewError::template(err.to_string())
    }
}

impl From<handlebars::TemplateError> for ReviewError {
    fn from(err: handlebars::TemplateError) -> Self {
        ReviewError::template(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_failure_classification() {
        assert!(ReviewError::request("ollama", "connection refused").is_model_failure());
        assert!(ReviewError::status("ollama", 500, "boom").is_model_failure());
        assert!(ReviewError::decode("ollama", "bad json").is_model_failure());
        assert!(ReviewError::model_unavailable("missing").is_model_failure());

        assert!(!ReviewError::EmptyInput.is_model_failure());
        assert!(!ReviewError::config("bad").is_model_failure());
        assert!(!ReviewError::template("bad").is_model_failure());
    }

    #[test]
    fn test_io_not_found_maps_to_file_not_found() {
        let err = ReviewError::io(
            "missing.py",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, ReviewError::FileNotFound { .. }));
        assert_eq!(err.to_string(), "file not found: missing.py");

        let err = ReviewError::io(
            "locked.py",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(matches!(err, ReviewError::Io { .. }));
    }

    #[test]
    fn test_error_messages() {
        let err = ReviewError::status("ollama", 404, "model 'llama3.1:8b' not found");
        assert_eq!(
            err.to_string(),
            "ollama returned 404: model 'llama3.1:8b' not found"
        );

        let err = ReviewError::InvalidEncoding {
            what: "uploaded file".to_string(),
        };
        assert_eq!(err.to_string(), "uploaded file is not valid UTF-8 text");
    }
}
