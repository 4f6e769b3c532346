//! Prompt rendering for the validation judge

use shared_pdf::{ValidationData, REQUIRED_FIELDS};

use crate::config::Settings;

/// Longest slice of raw text included in the prompt
pub const MAX_PROMPT_TEXT_CHARS: usize = 30_000;

/// Render the judge prompt: extracted data, evaluation criteria, answer schema.
pub fn build_prompt(data: &ValidationData, settings: &Settings) -> String {
    let mut trimmed = data.clone();
    trimmed.raw_text = truncate_chars(&data.raw_text, MAX_PROMPT_TEXT_CHARS);
    let data_json = serde_json::to_string_pretty(&trimmed).unwrap_or_else(|_| "{}".to_string());

    let domain = &settings.company_email_domain;
    let min = settings.min_signatures;
    let fields = REQUIRED_FIELDS.join(", ");

    format!(
        r#"You are an AI judge evaluating VPN access request forms.
Analyse the data extracted from the PDF and give a final decision.

EXTRACTED DATA:
{data_json}

EVALUATION CRITERIA:
1. COMPLETENESS
   - Required fields: {fields}
   - NIK must be numeric
   - Email must use the @{domain} domain
   - Range Tanggal and Range Waktu must use a valid format

2. SIGNATURES
   - The document needs at least {min} signatures (requester, manager, IT)
   - Signatures currently detected: {count}

3. DOCUMENT TYPE
   - Detected type: {doc_type}
   - The document must be a new VPN request or a VPN extension

4. CONSISTENCY
   - The name on the form must match the User VPN
   - Dates and times must be logical
   - Email must follow the company format

Answer with JSON using exactly this structure:

{{
    "is_valid": boolean,
    "status": "approved_for_processing" or "rejected_with_reason",
    "confidence": float (0.0 - 1.0),
    "issues": [list of issues found],
    "reasoning": "short explanation of the decision",
    "missing_fields": [list of missing required fields],
    "signature_analysis": {{
        "count": number,
        "sufficient": boolean,
        "description": "signature analysis"
    }},
    "document_type_analysis": {{
        "detected_type": string,
        "confidence": float,
        "description": "document type analysis"
    }},
    "recommendations": [list of recommendations for improvement]
}}

IMPORTANT:
- If any field is empty or invalid, set is_valid = false
- If there are fewer than {min} signatures, set is_valid = false
- If the email does not use the @{domain} domain, set is_valid = false
- Give clear and specific reasoning
- Confidence must reflect how certain the evaluation is

Answer with JSON only, no additional text.
"#,
        count = data.signature_count,
        doc_type = data.document_type,
    )
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}\n[... truncated]", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{DocumentType, FormFields};

    fn data(raw_text: &str) -> ValidationData {
        let mut form_fields = FormFields::new();
        form_fields.insert("Nama".to_string(), "Budi Santoso".to_string());
        ValidationData {
            form_fields,
            signature_valid: false,
            signature_count: 2,
            document_type: DocumentType::VpnExtension,
            raw_text: raw_text.to_string(),
        }
    }

    #[test]
    fn test_prompt_includes_data_and_criteria() {
        let prompt = build_prompt(&data("form text"), &Settings::default());

        assert!(prompt.contains("\"Nama\": \"Budi Santoso\""));
        assert!(prompt.contains("Signatures currently detected: 2"));
        assert!(prompt.contains("Detected type: vpn_extension"));
        assert!(prompt.contains("@infomedia.co.id"));
        assert!(prompt.contains("at least 3 signatures"));
        assert!(prompt.contains("\"approved_for_processing\""));
    }

    #[test]
    fn test_prompt_uses_configured_minimum() {
        let settings = Settings {
            min_signatures: 5,
            ..Settings::default()
        };
        let prompt = build_prompt(&data(""), &settings);
        assert!(prompt.contains("fewer than 5 signatures"));
    }

    #[test]
    fn test_long_text_truncated() {
        let long = "x".repeat(MAX_PROMPT_TEXT_CHARS + 500);
        let prompt = build_prompt(&data(&long), &Settings::default());
        assert!(prompt.contains("[... truncated]"));
        assert!(prompt.len() < long.len() + 5_000);
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé\n[... truncated]");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }
}
