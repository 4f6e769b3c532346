use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PdfError {
    #[error("PDF is empty")]
    Empty,

    #[error("Invalid PDF: {0}")]
    Invalid(String),

    #[error("PDF is password protected")]
    PasswordProtected,

    #[error("Text extraction failed: {0}")]
    Extraction(String),
}
