//! VPN request form validation
//!
//! Reads a PDF, extracts its text and form fields, counts signature-like
//! marks, asks a [`Judge`] (Gemini in production) for a verdict, and merges
//! everything into a [`ValidationResult`](shared_types::ValidationResult).
//!
//! # Example
//! ```no_run
//! use std::path::Path;
//! use validator_core::{Settings, ValidatorAgent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = Settings::from_env()?;
//! let agent = ValidatorAgent::from_settings(settings)?;
//! let run = agent.validate_file(Path::new("form.pdf")).await;
//! println!("{}: {}", run.filename, run.result.message);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod batch;
pub mod config;
pub mod error;
pub mod judge;
pub mod report;
pub mod rules;
pub mod telemetry;

pub use agent::{
    decide, JudgeOutcome, ProcessingStep, StepStatus, ValidationRun, ValidatorAgent, AGENT_VERSION,
};
pub use batch::{save_runs, scan_folder, BatchOutcome};
pub use config::{ConfigError, PublicSettings, Settings};
pub use error::ValidatorError;
pub use judge::{GeminiJudge, Judge, JudgeError, JudgeVerdict};
pub use report::{render_report, render_summary};
pub use rules::{check_rules, fallback_verdict, RuleFindings};
pub use telemetry::Telemetry;
