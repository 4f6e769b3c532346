//! Error types for the validator API

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("File must be a PDF: {0}")]
    NotPdf(String),

    #[error("File too large: {filename} is {size} bytes (maximum {max_mb}MB)")]
    FileTooLarge {
        filename: String,
        size: usize,
        max_mb: u64,
    },

    #[error("Maximum {max} files per batch, got {got}")]
    TooManyFiles { max: usize, got: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    code: &'static str,
}

impl ApiError {
    fn code(&self) -> &'static str {
        match self {
            ApiError::NotPdf(_) => "NOT_PDF",
            ApiError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            ApiError::TooManyFiles { .. } => "TOO_MANY_FILES",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Multipart(_) => "INVALID_MULTIPART",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Multipart(e) => e.status(),
            _ => StatusCode::BAD_REQUEST,
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}
