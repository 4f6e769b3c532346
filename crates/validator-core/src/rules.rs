//! Rule-based checks used when the model cannot give a verdict

use chrono::{NaiveDate, NaiveTime};
use shared_pdf::{missing_required_fields, ValidationData};
use shared_types::ValidationStatus;

use crate::config::Settings;
use crate::judge::{DocumentTypeAnalysis, JudgeVerdict, SignatureAnalysis};

pub const FALLBACK_CONFIDENCE: f64 = 0.3;

const DATE_FORMAT: &str = "%d %b %Y";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Issues and missing fields found by the rule checks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleFindings {
    pub issues: Vec<String>,
    pub missing_fields: Vec<String>,
}

impl RuleFindings {
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }
}

fn field<'a>(data: &'a ValidationData, name: &str) -> Option<&'a str> {
    data.form_fields
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn split_range(value: &str) -> Option<(&str, &str)> {
    let (start, end) = value
        .split_once('–')
        .or_else(|| value.split_once(" - "))
        .or_else(|| value.split_once('-'))?;
    Some((start.trim(), end.trim()))
}

fn check_date_range(value: &str) -> Option<String> {
    let Some((start, end)) = split_range(value) else {
        return Some("Range Tanggal has an invalid format".to_string());
    };
    match (
        NaiveDate::parse_from_str(start, DATE_FORMAT),
        NaiveDate::parse_from_str(end, DATE_FORMAT),
    ) {
        (Ok(start), Ok(end)) if start >= end => {
            Some("Range Tanggal is not logical (start is not before end)".to_string())
        }
        (Ok(_), Ok(_)) => None,
        _ => Some("Range Tanggal has an invalid format".to_string()),
    }
}

fn check_time_range(value: &str) -> Option<String> {
    let valid = split_range(value).is_some_and(|(start, end)| {
        NaiveTime::parse_from_str(start, TIME_FORMAT).is_ok()
            && NaiveTime::parse_from_str(end, TIME_FORMAT).is_ok()
    });
    (!valid).then(|| "Range Waktu has an invalid format".to_string())
}

/// Run every rule against the extracted data
pub fn check_rules(data: &ValidationData, settings: &Settings) -> RuleFindings {
    let missing_fields = missing_required_fields(&data.form_fields);
    let mut issues: Vec<String> = missing_fields
        .iter()
        .map(|name| format!("Field '{}' is missing", name))
        .collect();

    if let Some(email) = field(data, "Email") {
        let domain = format!("@{}", settings.company_email_domain);
        if !email.to_lowercase().ends_with(&domain.to_lowercase()) {
            issues.push(format!("Email must use the {} domain", domain));
        }
    }

    if let Some(nik) = field(data, "NIK") {
        if nik.len() < 5 || !nik.chars().all(|c| c.is_ascii_digit()) {
            issues.push("NIK is invalid (expected at least 5 digits)".to_string());
        }
    }

    if let Some(issue) = field(data, "Range Tanggal").and_then(check_date_range) {
        issues.push(issue);
    }
    if let Some(issue) = field(data, "Range Waktu").and_then(check_time_range) {
        issues.push(issue);
    }

    if let (Some(user_vpn), Some(name)) = (field(data, "User VPN"), field(data, "Nama")) {
        if !user_vpn.to_lowercase().contains(&name.to_lowercase()) {
            issues.push("User VPN does not match the requester name".to_string());
        }
    }

    if data.signature_count < settings.min_signatures {
        issues.push(format!(
            "Insufficient signatures: {}/{} required",
            data.signature_count, settings.min_signatures
        ));
    }

    RuleFindings {
        issues,
        missing_fields,
    }
}

/// Verdict built from the rule checks alone, at low confidence.
///
/// `is_valid` records what the rules concluded. The agent keeps it in the run
/// and telemetry but never approves a document on a fallback verdict.
pub fn fallback_verdict(data: &ValidationData, settings: &Settings, reason: &str) -> JudgeVerdict {
    let findings = check_rules(data, settings);
    let is_valid = findings.passed();
    let sufficient = data.signature_count >= settings.min_signatures;

    JudgeVerdict {
        is_valid,
        status: if is_valid {
            ValidationStatus::Approved
        } else {
            ValidationStatus::Rejected
        },
        confidence: FALLBACK_CONFIDENCE,
        issues: findings.issues,
        reasoning: format!("Fallback evaluation due to: {}", reason),
        missing_fields: findings.missing_fields,
        signature_analysis: SignatureAnalysis {
            count: data.signature_count,
            sufficient,
            description: format!("Found {} signatures", data.signature_count),
        },
        document_type_analysis: DocumentTypeAnalysis {
            detected_type: data.document_type.to_string(),
            confidence: FALLBACK_CONFIDENCE,
            description: "Keyword detection only".to_string(),
        },
        recommendations: vec![
            "Ensure all required fields are filled and the document has sufficient signatures"
                .to_string(),
        ],
    }
}
