//! API handlers for the validator server
//!
//! Provides REST endpoints for:
//! - Service info, health and configuration
//! - Single PDF validation
//! - Batch validation (up to [`MAX_BATCH_FILES`] files)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use shared_types::{ValidationResult, ValidationStatus};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{debug, info, warn};
use validator_core::{
    render_report, ConfigError, PublicSettings, Settings, ValidationRun, ValidatorAgent,
};

use crate::error::ApiError;

pub const MAX_BATCH_FILES: usize = 10;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    /// `Err` when the judge could not be configured (e.g. no API key)
    pub agent: Result<Arc<ValidatorAgent>, ConfigError>,
}

impl AppState {
    pub fn new(settings: Settings, agent: Result<ValidatorAgent, ConfigError>) -> Self {
        Self {
            settings: Arc::new(settings),
            agent: agent.map(Arc::new),
        }
    }
}

/// Router with every endpoint, CORS, tracing and body limits
pub fn router(state: AppState) -> Router {
    // Room for a full batch plus multipart framing
    let body_limit = usize::try_from(state.settings.max_file_size_bytes())
        .unwrap_or(usize::MAX)
        .saturating_mul(MAX_BATCH_FILES)
        .saturating_add(1024 * 1024);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/config", get(handle_config))
        .route("/validate-pdf", post(handle_validate_pdf))
        .route("/validate-multiple-pdfs", post(handle_validate_multiple))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .map_response(IntoResponse::into_response)
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(body_limit)),
        )
        .with_state(state)
}

#[derive(Serialize)]
pub struct RootResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub status: &'static str,
    pub app_name: String,
    pub endpoints: Vec<&'static str>,
}

/// Handler: GET /
pub async fn handle_root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        service: "PDF Validator API",
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
        app_name: state.settings.app_name.clone(),
        endpoints: vec![
            "GET /health",
            "GET /config",
            "POST /validate-pdf",
            "POST /validate-multiple-pdfs",
        ],
    })
}

#[derive(Serialize)]
pub struct ServiceStatus {
    pub pdf_processor: &'static str,
    pub gemini_judge: &'static str,
    pub langfuse: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub services: ServiceStatus,
}

/// Handler: GET /health
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (gemini_judge, langfuse) = match &state.agent {
        Ok(agent) => (
            "configured",
            if agent.telemetry_enabled() {
                "enabled"
            } else {
                "disabled"
            },
        ),
        Err(_) => ("not_configured", "disabled"),
    };

    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        services: ServiceStatus {
            pdf_processor: "ready",
            gemini_judge,
            langfuse,
        },
    })
}

/// Handler: GET /config
pub async fn handle_config(State(state): State<AppState>) -> Json<PublicSettings> {
    Json(state.settings.public_view())
}

/// An uploaded file pulled out of a multipart body
struct Upload {
    filename: String,
    bytes: Vec<u8>,
}

async fn read_uploads(multipart: &mut Multipart, field_name: &str) -> Result<Vec<Upload>, ApiError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(field_name) {
            debug!("Ignoring multipart field {:?}", field.name());
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?.to_vec();
        uploads.push(Upload { filename, bytes });
    }
    Ok(uploads)
}

fn check_upload(upload: &Upload, settings: &Settings) -> Result<(), ApiError> {
    if !upload.filename.to_lowercase().ends_with(".pdf") {
        return Err(ApiError::NotPdf(upload.filename.clone()));
    }
    if upload.bytes.len() as u64 > settings.max_file_size_bytes() {
        return Err(ApiError::FileTooLarge {
            filename: upload.filename.clone(),
            size: upload.bytes.len(),
            max_mb: settings.max_file_size_mb,
        });
    }
    Ok(())
}

/// Validate one upload, or produce a configuration error result when no judge exists
async fn validate_upload(state: &AppState, upload: &Upload) -> (ValidationResult, Option<ValidationRun>, f64) {
    match &state.agent {
        Ok(agent) => {
            let run = agent.validate_bytes(&upload.filename, &upload.bytes).await;
            let seconds = run.processing_time_seconds;
            (run.result.clone(), Some(run), seconds)
        }
        Err(e) => {
            warn!("Rejecting {}: {}", upload.filename, e);
            (
                ValidationResult::error(&upload.filename, format!("Configuration error: {}", e)),
                None,
                0.0,
            )
        }
    }
}

#[derive(Serialize)]
pub struct ValidatePdfResponse {
    pub success: bool,
    pub filename: String,
    pub file_size: usize,
    pub validation_result: ValidationResult,
    pub processing_time_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<ValidationRun>,
}

/// Handler: POST /validate-pdf
pub async fn handle_validate_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ValidatePdfResponse>, ApiError> {
    let started = Instant::now();
    let upload = read_uploads(&mut multipart, "file")
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::InvalidRequest("missing multipart field 'file'".to_string()))?;
    check_upload(&upload, &state.settings)?;

    info!("Validating {} ({} bytes)", upload.filename, upload.bytes.len());
    let (result, run, _) = validate_upload(&state, &upload).await;
    let report = run
        .as_ref()
        .map(|run| render_report(run, state.settings.min_signatures));

    Ok(Json(ValidatePdfResponse {
        success: result.status != ValidationStatus::Error,
        filename: upload.filename,
        file_size: upload.bytes.len(),
        validation_result: result,
        processing_time_seconds: started.elapsed().as_secs_f64(),
        report,
        run,
    }))
}

/// Per-file entry in a batch response
#[derive(Serialize)]
pub struct BatchFileResult {
    pub filename: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<ValidationResult>,
    pub processing_time_seconds: f64,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct BatchResponseSummary {
    pub total_files: usize,
    pub successful_validations: usize,
    pub failed_validations: usize,
    pub approved_count: usize,
    pub rejected_count: usize,
    pub error_count: usize,
}

impl BatchResponseSummary {
    /// Counts per entry. `successful + failed == total`; failed entries are
    /// uploads refused before validation plus results with `error` status.
    pub fn from_results(results: &[BatchFileResult]) -> Self {
        let mut summary = BatchResponseSummary {
            total_files: results.len(),
            ..Default::default()
        };
        for entry in results {
            match entry.validation_result.as_ref().map(|r| r.status) {
                Some(ValidationStatus::Approved) => summary.approved_count += 1,
                Some(ValidationStatus::Rejected) => summary.rejected_count += 1,
                Some(ValidationStatus::Error) => summary.error_count += 1,
                None => {}
            }
            if entry.success {
                summary.successful_validations += 1;
            } else {
                summary.failed_validations += 1;
            }
        }
        summary
    }
}

#[derive(Serialize)]
pub struct ValidateMultipleResponse {
    pub success: bool,
    pub summary: BatchResponseSummary,
    pub results: Vec<BatchFileResult>,
}

/// Handler: POST /validate-multiple-pdfs
pub async fn handle_validate_multiple(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ValidateMultipleResponse>, ApiError> {
    let uploads = read_uploads(&mut multipart, "files").await?;
    if uploads.is_empty() {
        return Err(ApiError::InvalidRequest(
            "missing multipart field 'files'".to_string(),
        ));
    }
    if uploads.len() > MAX_BATCH_FILES {
        return Err(ApiError::TooManyFiles {
            max: MAX_BATCH_FILES,
            got: uploads.len(),
        });
    }

    info!("Validating batch of {} file(s)", uploads.len());
    let mut results = Vec::with_capacity(uploads.len());
    for upload in &uploads {
        if let Err(e) = check_upload(upload, &state.settings) {
            results.push(BatchFileResult {
                filename: upload.filename.clone(),
                success: false,
                error: Some(e.to_string()),
                validation_result: None,
                processing_time_seconds: 0.0,
            });
            continue;
        }

        let (result, _, seconds) = validate_upload(&state, upload).await;
        results.push(BatchFileResult {
            filename: upload.filename.clone(),
            success: result.status != ValidationStatus::Error,
            error: None,
            validation_result: Some(result),
            processing_time_seconds: seconds,
        });
    }

    Ok(Json(ValidateMultipleResponse {
        success: true,
        summary: BatchResponseSummary::from_results(&results),
        results,
    }))
}
