//! Aggregate counts over a batch of validation results

use serde::{Deserialize, Serialize};

use crate::types::{ValidationResult, ValidationStatus};

/// Batch outcome totals.
///
/// `approved + rejected + errors` always equals `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub approved: usize,
    pub rejected: usize,
    pub errors: usize,
    /// Fraction of approved documents, 0.0 for an empty batch
    pub approval_rate: f64,
    pub average_processing_seconds: f64,
}

impl BatchSummary {
    /// Summarize `(result, processing_seconds)` pairs
    pub fn from_outcomes<'a, I>(outcomes: I) -> Self
    where
        I: IntoIterator<Item = (&'a ValidationResult, f64)>,
    {
        let mut total = 0;
        let mut approved = 0;
        let mut rejected = 0;
        let mut errors = 0;
        let mut seconds = 0.0;

        for (result, elapsed) in outcomes {
            total += 1;
            seconds += elapsed;
            match result.status {
                ValidationStatus::Approved => approved += 1,
                ValidationStatus::Rejected => rejected += 1,
                ValidationStatus::Error => errors += 1,
            }
        }

        let (approval_rate, average_processing_seconds) = if total == 0 {
            (0.0, 0.0)
        } else {
            (approved as f64 / total as f64, seconds / total as f64)
        };

        Self {
            total,
            approved,
            rejected,
            errors,
            approval_rate,
            average_processing_seconds,
        }
    }

    pub fn from_results(results: &[ValidationResult]) -> Self {
        Self::from_outcomes(results.iter().map(|r| (r, 0.0)))
    }
}
