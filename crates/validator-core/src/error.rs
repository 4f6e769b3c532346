use std::path::PathBuf;

use shared_pdf::PdfError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::judge::JudgeError;

#[derive(Debug, Error)]
pub enum ValidatorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("PDF processing failed: {0}")]
    Pdf(#[from] PdfError),

    #[error("Model evaluation failed: {0}")]
    Judge(#[from] JudgeError),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ValidatorError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ValidatorError::Io {
            path: path.into(),
            source,
        }
    }
}
