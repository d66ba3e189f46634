use std::io::Write;
use std::path::Path;

use tracing::{debug, warn};

use crate::cli::args::OutputFormat;
use crate::infrastructure::error::ReviewError;
use crate::review::{ModelResponse, ReviewRequest, ReviewService};

const REVIEW_HEADER: &str = "\n=== Code Review ===\n";
const REVIEW_FOOTER: &str = "\n==================\n";

/// Prompt label for a file, taken from its extension.
pub fn infer_file_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("py") => "python",
        Some("rs") => "rust",
        Some("js" | "mjs" | "cjs") => "javascript",
        Some("ts" | "tsx") => "typescript",
        Some("jsx") => "javascript",
        Some("html" | "htm") => "html",
        Some("css") => "css",
        Some("go") => "go",
        Some("java") => "java",
        Some("kt") => "kotlin",
        Some("c" | "h") => "c",
        Some("cpp" | "cc" | "cxx" | "hpp") => "c++",
        Some("cs") => "c#",
        Some("rb") => "ruby",
        Some("php") => "php",
        Some("sh" | "bash") => "shell",
        Some("sql") => "sql",
        _ => "code",
    }
}

/// Review one local file and write the result to `out`.
///
/// Input problems (missing file, unreadable or empty file) are reported as a
/// line on `out` and are not errors; only failures to write are.
pub async fn review_file<W: Write>(
    service: &ReviewService,
    path: &Path,
    file_type: Option<&str>,
    format: OutputFormat,
    out: &mut W,
) -> std::io::Result<()> {
    let label = file_type.unwrap_or_else(|| infer_file_type(path));
    debug!(path = %path.display(), label, "reviewing file");

    let request = match ReviewRequest::from_path(path, label) {
        Ok(request) => request,
        Err(ReviewError::FileNotFound { path }) => {
            return writeln!(out, "File not found: {}", path.display());
        }
        Err(err) => {
            warn!(error = %err, "cannot review file");
            return writeln!(out, "{err}");
        }
    };

    let outcome = service.review(&request).await;

    match format {
        OutputFormat::Text => {
            let text = match outcome {
                Ok(outcome) => outcome.raw_review,
                Err(err) => ModelResponse::Failed(err).raw_text(),
            };
            writeln!(out, "{REVIEW_HEADER}")?;
            writeln!(out, "{text}")?;
            writeln!(out, "{REVIEW_FOOTER}")
        }
        OutputFormat::Json => {
            let value = match outcome {
                Ok(outcome) => serde_json::to_value(outcome)?,
                Err(err) => {
                    serde_json::json!({ "error": ModelResponse::Failed(err).raw_text() })
                }
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&value)?)
        }
    }
}
