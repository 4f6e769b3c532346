//! Terminal output for validation runs

use shared_types::ValidationStatus;
use validator_core::{render_report, Settings, ValidationRun};

fn set_or_not(value: &str) -> &'static str {
    if value.is_empty() {
        "✗ Not set"
    } else {
        "✓ Set"
    }
}

pub fn status_label(status: ValidationStatus) -> &'static str {
    match status {
        ValidationStatus::Approved => "✓ APPROVED",
        ValidationStatus::Rejected => "✗ REJECTED",
        ValidationStatus::Error => "⚠ ERROR",
    }
}

/// Settings overview; secrets are only reported as set or missing
pub fn render_configuration(settings: &Settings) -> String {
    format!(
        "=== PDF VALIDATOR CONFIGURATION ===\n\
         App Name: {}\n\
         Gemini Model: {}\n\
         Min Signatures: {}\n\
         Max File Size: {}MB\n\
         Company Email Domain: @{}\n\
         Log Level: {}\n\
         Google API Key: {}\n\
         Langfuse Public Key: {}\n\
         Langfuse Secret Key: {}\n\
         Langfuse Host: {}\n",
        settings.app_name,
        settings.gemini_model,
        settings.min_signatures,
        settings.max_file_size_mb,
        settings.company_email_domain,
        settings.log_level,
        set_or_not(&settings.google_api_key),
        set_or_not(&settings.langfuse_public_key),
        set_or_not(&settings.langfuse_secret_key),
        settings.langfuse_host,
    )
}

/// Short result block, or the full report when `detailed`
pub fn render_run(run: &ValidationRun, min_signatures: u32, detailed: bool) -> String {
    if detailed {
        return render_report(run, min_signatures);
    }

    let result = &run.result;
    let mut out = format!(
        "Status: {}\n\
         Valid: {}\n\
         Confidence: {:.2}\n\
         Document Type: {}\n\
         Signatures: {}/{}\n\
         Processing Time: {:.2}s\n",
        status_label(result.status),
        if result.is_valid { "YES" } else { "NO" },
        result.confidence,
        result.document_type,
        result.signature_count,
        min_signatures,
        run.processing_time_seconds,
    );
    if !result.is_valid {
        out.push_str(&format!("Message: {}\n", result.message));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;
    use shared_types::ValidationResult;
    use uuid::Uuid;
    use validator_core::AGENT_VERSION;

    fn run(status: ValidationStatus) -> ValidationRun {
        let mut result = ValidationResult::error("form.pdf", "Insufficient signatures: 1/3 required");
        result.status = status;
        result.is_valid = status == ValidationStatus::Approved;
        result.signature_count = 1;
        ValidationRun {
            run_id: Uuid::new_v4(),
            filename: "form.pdf".to_string(),
            file_path: None,
            timestamp: Utc::now(),
            agent_version: AGENT_VERSION.to_string(),
            processing_steps: Vec::new(),
            pdf_processing: None,
            judge: None,
            result,
            processing_time_seconds: 0.5,
        }
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(ValidationStatus::Approved), "✓ APPROVED");
        assert_eq!(status_label(ValidationStatus::Rejected), "✗ REJECTED");
        assert_eq!(status_label(ValidationStatus::Error), "⚠ ERROR");
    }

    #[test]
    fn test_configuration_hides_key_values() {
        let settings = Settings {
            google_api_key: "secret-key".to_string(),
            ..Settings::default()
        };
        let text = render_configuration(&settings);
        assert!(text.contains("Google API Key: ✓ Set"));
        assert!(text.contains("Langfuse Secret Key: ✗ Not set"));
        assert!(!text.contains("secret-key"));
    }

    #[test]
    fn test_short_rejection_shows_message() {
        let text = render_run(&run(ValidationStatus::Rejected), 3, false);
        assert!(text.contains("Status: ✗ REJECTED"));
        assert!(text.contains("Signatures: 1/3"));
        assert!(text.contains("Message: Insufficient signatures"));
    }

    #[test]
    fn test_short_approval_layout() {
        let text = render_run(&run(ValidationStatus::Approved), 3, false);
        assert_eq!(
            text,
            "Status: ✓ APPROVED\n\
             Valid: YES\n\
             Confidence: 0.00\n\
             Document Type: unknown\n\
             Signatures: 1/3\n\
             Processing Time: 0.50s\n"
        );
    }

    #[test]
    fn test_detailed_uses_full_report() {
        let text = render_run(&run(ValidationStatus::Approved), 3, true);
        assert!(text.starts_with("=== PDF VALIDATION REPORT ==="));
        assert!(text.contains("FINAL DECISION:"));
        assert!(!text.contains("Status: ✓ APPROVED"));
    }
}
