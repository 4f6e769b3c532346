//! Model-backed evaluation of extracted form data
//!
//! A [`Judge`] turns [`ValidationData`] into a [`JudgeVerdict`]. The
//! production judge is [`GeminiJudge`]; tests plug in their own.

pub mod gemini;
pub mod parse;
pub mod prompt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_pdf::ValidationData;
use shared_types::ValidationStatus;
use thiserror::Error;

pub use gemini::GeminiJudge;
pub use parse::parse_verdict;
pub use prompt::build_prompt;

#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Gemini request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Gemini API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Gemini returned no candidate text")]
    EmptyResponse,

    #[error("Could not parse model verdict: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureAnalysis {
    pub count: u32,
    pub sufficient: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentTypeAnalysis {
    pub detected_type: String,
    pub confidence: f64,
    pub description: String,
}

/// Parsed model answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub is_valid: bool,
    pub status: ValidationStatus,
    /// Always within [0.0, 1.0]
    pub confidence: f64,
    pub issues: Vec<String>,
    pub reasoning: String,
    pub missing_fields: Vec<String>,
    pub signature_analysis: SignatureAnalysis,
    pub document_type_analysis: DocumentTypeAnalysis,
    pub recommendations: Vec<String>,
}

#[async_trait]
pub trait Judge: Send + Sync {
    /// Short name used in logs and telemetry
    fn name(&self) -> &str;

    async fn evaluate(&self, data: &ValidationData) -> Result<JudgeVerdict, JudgeError>;
}
