use std::path::{Path, PathBuf};

use crate::infrastructure::error::{Result, ReviewError};

/// Where the source text came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    UploadedFile { filename: String },
    PastedText,
    LocalFile { path: PathBuf },
}

/// One piece of code to review. The source text is never empty.
#[derive(Debug, Clone)]
pub struct ReviewRequest {
    source_text: String,
    file_type: String,
    origin: Origin,
}

impl ReviewRequest {
    pub fn new(
        source_text: impl Into<String>,
        file_type: impl Into<String>,
        origin: Origin,
    ) -> Result<Self> {
        let source_text = source_text.into();
        if source_text.is_empty() {
            return Err(ReviewError::EmptyInput);
        }
        Ok(Self {
            source_text,
            file_type: file_type.into(),
            origin,
        })
    }

    /// Build a request from form input. A non-empty upload wins over pasted
    /// text; an upload that is not UTF-8 is rejected.
    pub fn from_form(
        upload: Option<(String, Vec<u8>)>,
        pasted: Option<String>,
        file_type: &str,
    ) -> Result<Self> {
        if let Some((filename, bytes)) = upload.filter(|(_, bytes)| !bytes.is_empty()) {
            let text = String::from_utf8(bytes).map_err(|_| ReviewError::InvalidEncoding {
                what: format!("uploaded file '{filename}'"),
            })?;
            return Self::new(text, file_type, Origin::UploadedFile { filename });
        }

        match pasted {
            Some(text) if !text.is_empty() => Self::new(text, file_type, Origin::PastedText),
            _ => Err(ReviewError::EmptyInput),
        }
    }

    /// Read a local file as UTF-8.
    pub fn from_path(path: &Path, file_type: &str) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| ReviewError::io(path, e))?;
        let text = String::from_utf8(bytes).map_err(|_| ReviewError::InvalidEncoding {
            what: path.display().to_string(),
        })?;
        Self::new(
            text,
            file_type,
            Origin::LocalFile {
                path: path.to_path_buf(),
            },
        )
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn file_type(&self) -> &str {
        &self.file_type
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}
