//! Plain-text validation reports

use std::fmt::{self, Write};

use shared_types::BatchSummary;

use crate::agent::ValidationRun;

fn yes_no(value: bool) -> &'static str {
    if value {
        "YES"
    } else {
        "NO"
    }
}

fn numbered(out: &mut String, items: &[String]) -> fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        writeln!(out, "{}. {}", idx + 1, item)?;
    }
    Ok(())
}

/// Human-readable report for one run
pub fn render_report(run: &ValidationRun, min_signatures: u32) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, run, min_signatures);
    out
}

fn write_report(out: &mut String, run: &ValidationRun, min_signatures: u32) -> fmt::Result {
    let result = &run.result;

    write!(
        out,
        "=== PDF VALIDATION REPORT ===\n\
         File: {}\n\
         Timestamp: {}\n\
         Processing Time: {:.2} seconds\n\
         \n\
         FINAL DECISION:\n\
         Status: {}\n\
         Valid: {}\n\
         Confidence: {:.2}\n\
         Message: {}\n\
         \n\
         DOCUMENT ANALYSIS:\n\
         Type: {}\n\
         Signatures: {}/{} required\n\
         Signature Valid: {}\n\
         Form Completeness: {:.0}%\n\
         \n\
         REASONING:\n",
        run.filename,
        run.timestamp.to_rfc3339(),
        run.processing_time_seconds,
        result.status.as_str().to_uppercase(),
        yes_no(result.is_valid),
        result.confidence,
        result.message,
        result.document_type,
        result.signature_count,
        min_signatures,
        yes_no(result.signature_valid),
        result.form_fields_completeness * 100.0,
    )?;

    if result.reasoning.is_empty() {
        writeln!(out, "No reasoning provided")?;
    } else {
        writeln!(out, "{}", result.reasoning)?;
    }

    writeln!(out, "\nISSUES FOUND:")?;
    if result.issues.is_empty() {
        writeln!(out, "No issues found.")?;
    } else {
        numbered(out, &result.issues)?;
    }

    if !result.missing_fields.is_empty() {
        writeln!(out, "\nMISSING FIELDS:\n{}", result.missing_fields.join(", "))?;
    }

    if !result.recommendations.is_empty() {
        writeln!(out, "\nRECOMMENDATIONS:")?;
        numbered(out, &result.recommendations)?;
    }
    Ok(())
}

pub fn render_summary(summary: &BatchSummary) -> String {
    format!(
        "=== BATCH SUMMARY ===\n\
         Total processed: {}\n\
         Approved: {}\n\
         Rejected: {}\n\
         Errors: {}\n\
         Approval rate: {:.1}%\n\
         Average processing time: {:.2}s\n",
        summary.total,
        summary.approved,
        summary.rejected,
        summary.errors,
        summary.approval_rate * 100.0,
        summary.average_processing_seconds
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AGENT_VERSION;
    use chrono::Utc;
    use shared_types::{ValidationResult, ValidationStatus};
    use uuid::Uuid;

    fn run(result: ValidationResult) -> ValidationRun {
        ValidationRun {
            run_id: Uuid::new_v4(),
            filename: result.filename.clone(),
            file_path: None,
            timestamp: Utc::now(),
            agent_version: AGENT_VERSION.to_string(),
            processing_steps: Vec::new(),
            pdf_processing: None,
            judge: None,
            result,
            processing_time_seconds: 1.234,
        }
    }

    #[test]
    fn test_report_for_rejection() {
        let mut result = ValidationResult::error("form.pdf", "x");
        result.status = ValidationStatus::Rejected;
        result.issues = vec!["NIK is invalid".to_string(), "Email domain".to_string()];
        result.recommendations = vec!["Fix the NIK".to_string()];
        result.signature_count = 2;

        let report = render_report(&run(result), 3);
        assert!(report.contains("File: form.pdf"));
        assert!(report.contains("Status: REJECTED"));
        assert!(report.contains("Valid: NO"));
        assert!(report.contains("Signatures: 2/3 required"));
        assert!(report.contains("1. NIK is invalid\n2. Email domain"));
        assert!(report.contains("RECOMMENDATIONS:\n1. Fix the NIK"));
        assert!(report.contains("Processing Time: 1.23 seconds"));
    }

    #[test]
    fn test_report_without_issues() {
        let mut result = ValidationResult::error("ok.pdf", "x");
        result.issues.clear();
        let report = render_report(&run(result), 3);
        assert!(report.contains("No issues found."));
        assert!(!report.contains("RECOMMENDATIONS"));
        assert!(report.contains("Form Completeness: 0%\n\nREASONING:\nNo reasoning provided\n"));
        assert!(report.contains("Message: x\n\nDOCUMENT ANALYSIS:\nType: unknown\n"));
    }

    #[test]
    fn test_summary_rendering() {
        let summary = BatchSummary {
            total: 4,
            approved: 1,
            rejected: 2,
            errors: 1,
            approval_rate: 0.25,
            average_processing_seconds: 2.5,
        };
        let text = render_summary(&summary);
        assert!(text.contains("Total processed: 4"));
        assert!(text.contains("Approval rate: 25.0%"));
        assert!(text.contains("Average processing time: 2.50s"));
    }
}
