//! Validation orchestrator
//!
//! [`ValidatorAgent`] runs the pipeline for one document at a time:
//! PDF processing, model evaluation, then the decision merge in [`decide`].
//! Every call produces a [`ValidationRun`], including failures.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_pdf::{PdfProcessor, ProcessedPdf};
use shared_types::{ValidationResult, ValidationStatus};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::batch::{scan_folder, BatchOutcome};
use crate::config::{ConfigError, Settings};
use crate::error::ValidatorError;
use crate::judge::{GeminiJudge, Judge, JudgeVerdict};
use crate::rules::fallback_verdict;
use crate::telemetry::{
    Telemetry, TRACE_JUDGE_EVALUATION, TRACE_VALIDATION_COMPLETE, TRACE_VALIDATION_ERROR,
};

pub const AGENT_VERSION: &str = "1.0.0";

/// Issues listed in a rejection message
const MAX_MESSAGE_ISSUES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Started,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStep {
    pub step: String,
    pub status: StepStatus,
    pub timestamp: DateTime<Utc>,
}

/// What the judge produced for a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JudgeOutcome {
    Verdict(JudgeVerdict),
    /// The model call or its parsing failed; `fallback` holds the rule-based findings
    Failed {
        error: String,
        fallback: JudgeVerdict,
    },
}

/// Full record of one validation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRun {
    pub run_id: Uuid,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    pub timestamp: DateTime<Utc>,
    pub agent_version: String,
    pub processing_steps: Vec<ProcessingStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_processing: Option<ProcessedPdf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judge: Option<JudgeOutcome>,
    pub result: ValidationResult,
    pub processing_time_seconds: f64,
}

impl ValidationRun {
    fn start(filename: &str) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            filename: filename.to_string(),
            file_path: None,
            timestamp: Utc::now(),
            agent_version: AGENT_VERSION.to_string(),
            processing_steps: Vec::new(),
            pdf_processing: None,
            judge: None,
            result: ValidationResult::error(filename, "Validation did not complete"),
            processing_time_seconds: 0.0,
        }
    }

    fn begin_step(&mut self, step: &str) {
        self.processing_steps.push(ProcessingStep {
            step: step.to_string(),
            status: StepStatus::Started,
            timestamp: Utc::now(),
        });
    }

    fn finish_step(&mut self, status: StepStatus) {
        if let Some(step) = self.processing_steps.last_mut() {
            step.status = status;
        }
    }
}

pub struct ValidatorAgent {
    settings: Settings,
    judge: Arc<dyn Judge>,
    telemetry: Telemetry,
}

impl ValidatorAgent {
    /// Build the production agent backed by Gemini.
    ///
    /// # Errors
    /// `ConfigError::MissingApiKey` when `GOOGLE_API_KEY` is not set.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let judge = GeminiJudge::new(&settings)?;
        info!("Gemini judge ready (model {})", judge.model());
        let telemetry = Telemetry::from_settings(&settings);
        Ok(Self {
            settings,
            judge: Arc::new(judge),
            telemetry,
        })
    }

    /// Build an agent around any judge implementation
    pub fn with_judge(settings: Settings, judge: Arc<dyn Judge>) -> Self {
        let telemetry = Telemetry::from_settings(&settings);
        Self {
            settings,
            judge,
            telemetry,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn judge_name(&self) -> &str {
        self.judge.name()
    }

    pub fn telemetry_enabled(&self) -> bool {
        self.telemetry.is_enabled()
    }

    /// Validate an in-memory PDF
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn validate_bytes(&self, filename: &str, bytes: &[u8]) -> ValidationRun {
        let started = Instant::now();
        let mut run = ValidationRun::start(filename);

        run.begin_step("pdf_processing");
        let processed = match self.process_pdf(bytes).await {
            Ok(processed) => processed,
            Err(e) => {
                run.finish_step(StepStatus::Failed);
                warn!("PDF processing failed for {}: {}", filename, e);
                return self.fail(run, started, e.to_string());
            }
        };
        run.finish_step(StepStatus::Completed);

        run.begin_step("llm_evaluation");
        let outcome = match self.judge.evaluate(&processed.validation_data).await {
            Ok(verdict) => {
                run.finish_step(StepStatus::Completed);
                JudgeOutcome::Verdict(verdict)
            }
            Err(e) => {
                run.finish_step(StepStatus::Failed);
                warn!("{} evaluation failed for {}: {}", self.judge.name(), filename, e);
                JudgeOutcome::Failed {
                    error: e.to_string(),
                    fallback: fallback_verdict(
                        &processed.validation_data,
                        &self.settings,
                        &e.to_string(),
                    ),
                }
            }
        };
        self.trace_evaluation(&processed, &outcome);

        run.begin_step("final_decision");
        run.result = decide(filename, &processed, &outcome, self.settings.min_signatures);
        run.finish_step(StepStatus::Completed);

        run.pdf_processing = Some(processed);
        run.judge = Some(outcome);
        run.processing_time_seconds = started.elapsed().as_secs_f64();

        info!(
            "Validated {} in {:.2}s: {}",
            filename, run.processing_time_seconds, run.result.status
        );
        self.trace_complete(&run);
        run
    }

    /// Read and validate a file on disk
    pub async fn validate_file(&self, path: &Path) -> ValidationRun {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut run = match tokio::fs::read(path).await {
            Ok(bytes) => self.validate_bytes(&filename, &bytes).await,
            Err(e) => {
                let run = ValidationRun::start(&filename);
                self.fail(run, Instant::now(), format!("Could not read file: {}", e))
            }
        };
        run.file_path = Some(path.to_path_buf());
        run
    }

    /// Validate files one after another
    pub async fn validate_files(&self, paths: &[PathBuf]) -> Vec<ValidationRun> {
        let mut runs = Vec::with_capacity(paths.len());
        for (idx, path) in paths.iter().enumerate() {
            info!(
                "Processing PDF {}/{}: {}",
                idx + 1,
                paths.len(),
                path.display()
            );
            runs.push(self.validate_file(path).await);
        }
        runs
    }

    /// Validate every `.pdf` file directly inside `folder`
    pub async fn validate_folder(&self, folder: &Path) -> Result<BatchOutcome, ValidatorError> {
        let paths = scan_folder(folder)?;
        if paths.is_empty() {
            warn!("No PDF files found in {}", folder.display());
        }
        let runs = self.validate_files(&paths).await;
        let outcome = BatchOutcome::from_runs(runs);
        info!(
            "Batch complete: {} total, {} approved, {} rejected, {} errors",
            outcome.summary.total,
            outcome.summary.approved,
            outcome.summary.rejected,
            outcome.summary.errors
        );
        Ok(outcome)
    }

    async fn process_pdf(&self, bytes: &[u8]) -> Result<ProcessedPdf, ValidatorError> {
        let processor = PdfProcessor::new(self.settings.min_signatures);
        let bytes = bytes.to_vec();
        // pdf-extract is CPU-bound
        let processed = tokio::task::spawn_blocking(move || processor.process(&bytes))
            .await
            .map_err(|e| {
                ValidatorError::Pdf(shared_pdf::PdfError::Extraction(format!(
                    "extraction task failed: {}",
                    e
                )))
            })??;
        Ok(processed)
    }

    fn fail(&self, mut run: ValidationRun, started: Instant, message: String) -> ValidationRun {
        run.result = ValidationResult::error(&run.filename, message.clone());
        run.processing_time_seconds = started.elapsed().as_secs_f64();

        self.telemetry.emit(
            TRACE_VALIDATION_ERROR,
            json!({ "filename": run.filename, "error_message": message }),
            json!({ "status": "error", "is_valid": false }),
            json!({
                "agent_version": run.agent_version,
                "app_name": self.settings.app_name,
                "error_type": "validation_error",
            }),
        );
        run
    }

    fn trace_evaluation(&self, processed: &ProcessedPdf, outcome: &JudgeOutcome) {
        if !self.telemetry.is_enabled() {
            return;
        }
        let (status, verdict) = match outcome {
            JudgeOutcome::Verdict(v) => ("success", v),
            JudgeOutcome::Failed { fallback, .. } => ("llm_error", fallback),
        };
        let data = &processed.validation_data;
        self.telemetry.emit(
            TRACE_JUDGE_EVALUATION,
            serde_json::to_value(data).unwrap_or_default(),
            serde_json::to_value(verdict).unwrap_or_default(),
            json!({
                "status": status,
                "judge": self.judge.name(),
                "document_type": data.document_type,
                "signature_count": data.signature_count,
                "is_valid": verdict.is_valid,
                "confidence": verdict.confidence,
            }),
        );
    }

    fn trace_complete(&self, run: &ValidationRun) {
        self.telemetry.emit(
            TRACE_VALIDATION_COMPLETE,
            json!({
                "filename": run.filename,
                "processing_steps": run.processing_steps.len(),
            }),
            json!({
                "final_status": run.result.status,
                "is_valid": run.result.is_valid,
                "confidence": run.result.confidence,
                "document_type": run.result.document_type,
                "signature_count": run.result.signature_count,
                "processing_time": run.processing_time_seconds,
            }),
            json!({
                "agent_version": run.agent_version,
                "app_name": self.settings.app_name,
                "validation_timestamp": run.timestamp,
            }),
        );
    }
}

fn push_unique(target: &mut Vec<String>, items: impl IntoIterator<Item = String>) {
    for item in items {
        if !target.contains(&item) {
            target.push(item);
        }
    }
}

/// Merge PDF processing output and the judge outcome into the final result.
///
/// Order of precedence:
/// 1. too few signatures: `rejected`, whatever the model said
/// 2. model failed: `rejected` at the fallback's confidence, carrying the
///    rule-based issues
/// 3. model says valid: `approved`
/// 4. otherwise `rejected`, listing up to three issues
pub fn decide(
    filename: &str,
    processed: &ProcessedPdf,
    outcome: &JudgeOutcome,
    min_signatures: u32,
) -> ValidationResult {
    let signatures = &processed.signatures;
    let document_type = processed.document_type.document_type;
    let verdict = match outcome {
        JudgeOutcome::Verdict(v) => v,
        JudgeOutcome::Failed { fallback, .. } => fallback,
    };

    let mut missing_fields = processed.missing_fields.clone();
    push_unique(&mut missing_fields, verdict.missing_fields.iter().cloned());

    let mut result = ValidationResult {
        filename: filename.to_string(),
        is_valid: false,
        status: ValidationStatus::Rejected,
        message: String::new(),
        confidence: verdict.confidence.clamp(0.0, 1.0),
        document_type,
        signature_count: signatures.signature_count,
        signature_valid: signatures.signature_valid,
        issues: Vec::new(),
        missing_fields,
        reasoning: verdict.reasoning.clone(),
        recommendations: verdict.recommendations.clone(),
        form_fields_completeness: processed.form_fields_completeness,
    };

    if !signatures.signature_valid {
        push_unique(
            &mut result.issues,
            [format!(
                "Insufficient signatures: {}/{} required",
                signatures.signature_count, min_signatures
            )],
        );
        push_unique(&mut result.issues, verdict.issues.iter().cloned());
        result.message = rejection_message(&result.issues);
        return result;
    }

    match outcome {
        // The fallback's own verdict is only recorded; rules alone never approve
        JudgeOutcome::Failed { error, fallback } => {
            push_unique(
                &mut result.issues,
                [format!("Model evaluation failed: {}", error)],
            );
            push_unique(&mut result.issues, fallback.issues.iter().cloned());
            result.message = rejection_message(&result.issues);
        }
        JudgeOutcome::Verdict(verdict) if verdict.is_valid => {
            result.is_valid = true;
            result.status = ValidationStatus::Approved;
            push_unique(&mut result.issues, verdict.issues.iter().cloned());
            result.message = format!(
                "Document approved. Type: {}, Signatures: {}, Confidence: {:.2}",
                document_type, signatures.signature_count, result.confidence
            );
        }
        JudgeOutcome::Verdict(verdict) => {
            push_unique(&mut result.issues, verdict.issues.iter().cloned());
            result.message = rejection_message(&result.issues);
        }
    }

    result
}

fn rejection_message(issues: &[String]) -> String {
    if issues.is_empty() {
        return "Document rejected. Reasons: Document does not meet validation criteria"
            .to_string();
    }
    let reasons: Vec<&str> = issues
        .iter()
        .take(MAX_MESSAGE_ISSUES)
        .map(String::as_str)
        .collect();
    format!("Document rejected. Reasons: {}", reasons.join("; "))
}
