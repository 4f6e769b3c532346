use std::collections::BTreeMap;

/// Form field label -> extracted value, ordered by label.
pub type FormFields = BTreeMap<String, String>;

/// Final decision for a validated document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Approved,
    Rejected,
    Error,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Approved => "approved",
            ValidationStatus::Rejected => "rejected",
            ValidationStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ValidationStatus {
    type Err = String;

    /// Accepts the short names plus the long-form statuses the model is asked to emit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "approved" | "approved_for_processing" => Ok(ValidationStatus::Approved),
            "rejected" | "rejected_with_reason" => Ok(ValidationStatus::Rejected),
            "error" => Ok(ValidationStatus::Error),
            other => Err(format!("unknown validation status '{}'", other)),
        }
    }
}

/// Kind of VPN form detected from the document text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    NewVpnRequest,
    VpnExtension,
    #[default]
    Unknown,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::NewVpnRequest => "new_vpn_request",
            DocumentType::VpnExtension => "vpn_extension",
            DocumentType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of validating a single document.
///
/// Built once per validation call from the PDF processing output, the
/// signature count and the model verdict. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ValidationResult {
    pub filename: String,
    pub is_valid: bool,
    pub status: ValidationStatus,
    pub message: String,
    pub confidence: f64,
    pub document_type: DocumentType,
    pub signature_count: u32,
    pub signature_valid: bool,
    pub issues: Vec<String>,
    pub missing_fields: Vec<String>,
    pub reasoning: String,
    pub recommendations: Vec<String>,
    pub form_fields_completeness: f64,
}

impl ValidationResult {
    /// Result for a document that could not be judged at all
    pub fn error(filename: impl Into<String>, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            filename: filename.into(),
            is_valid: false,
            status: ValidationStatus::Error,
            issues: vec![message.clone()],
            message,
            confidence: 0.0,
            document_type: DocumentType::Unknown,
            signature_count: 0,
            signature_valid: false,
            missing_fields: Vec::new(),
            reasoning: String::new(),
            recommendations: Vec::new(),
            form_fields_completeness: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_long_forms() {
        assert_eq!(
            "approved_for_processing".parse::<ValidationStatus>().unwrap(),
            ValidationStatus::Approved
        );
        assert_eq!(
            "Rejected_With_Reason".parse::<ValidationStatus>().unwrap(),
            ValidationStatus::Rejected
        );
        assert!("maybe".parse::<ValidationStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&ValidationStatus::Approved).unwrap();
        assert_eq!(json, "\"approved\"");
        let json = serde_json::to_string(&DocumentType::VpnExtension).unwrap();
        assert_eq!(json, "\"vpn_extension\"");
    }

    #[test]
    fn test_error_result_is_never_valid() {
        let result = ValidationResult::error("form.pdf", "PDF processing failed: bad xref");
        assert!(!result.is_valid);
        assert_eq!(result.status, ValidationStatus::Error);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.issues, vec!["PDF processing failed: bad xref".to_string()]);
    }
}
