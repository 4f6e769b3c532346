//! Single-pass processing of a VPN request PDF

use serde::{Deserialize, Serialize};
use shared_types::{DocumentType, FormFields};
use tracing::{debug, info};

use crate::doctype::{detect_document_type, DocumentTypeDetection};
use crate::error::PdfError;
use crate::extract::{ExtractedDocument, PdfExtractor};
use crate::fields::{completeness, extract_form_fields, missing_required_fields};
use crate::signatures::{SignatureDetector, SignatureInfo};

/// Model input: everything the judge needs to reach a verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationData {
    #[serde(flatten)]
    pub form_fields: FormFields,
    pub signature_valid: bool,
    pub signature_count: u32,
    pub document_type: DocumentType,
    pub raw_text: String,
}

/// Full processing output for one PDF
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedPdf {
    pub extracted: ExtractedDocument,
    pub document_type: DocumentTypeDetection,
    pub form_fields: FormFields,
    pub missing_fields: Vec<String>,
    pub form_fields_completeness: f64,
    pub signatures: SignatureInfo,
    pub validation_data: ValidationData,
}

pub struct PdfProcessor {
    detector: SignatureDetector,
}

impl PdfProcessor {
    pub fn new(min_signatures: u32) -> Self {
        Self {
            detector: SignatureDetector::new(min_signatures),
        }
    }

    /// Extract, classify, and collect fields and signatures from PDF bytes
    pub fn process(&self, pdf_bytes: &[u8]) -> Result<ProcessedPdf, PdfError> {
        let doc = PdfExtractor::load(pdf_bytes)?;
        let extracted = PdfExtractor::extract_text(&doc, pdf_bytes)?;
        debug!(
            "Extracted {} page(s) via {:?}",
            extracted.page_count, extracted.method
        );

        let document_type = detect_document_type(&extracted.raw_text);
        let form_fields = extract_form_fields(&extracted.raw_text);
        let missing_fields = missing_required_fields(&form_fields);
        let form_fields_completeness = completeness(&form_fields);
        let signatures = self.detector.detect(&doc, &extracted.pages);

        info!(
            "Processed PDF: type={}, fields={}/{}, signatures={}",
            document_type.document_type,
            form_fields.len(),
            crate::fields::REQUIRED_FIELDS.len(),
            signatures.signature_count
        );

        let validation_data = ValidationData {
            form_fields: form_fields.clone(),
            signature_valid: signatures.signature_valid,
            signature_count: signatures.signature_count,
            document_type: document_type.document_type,
            raw_text: extracted.raw_text.clone(),
        };

        Ok(ProcessedPdf {
            extracted,
            document_type,
            form_fields,
            missing_fields,
            form_fields_completeness,
            signatures,
            validation_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pdf::TestPdf;

    fn complete_form() -> TestPdf {
        TestPdf::new().page(&[
            "FORMULIR PERMOHONAN VPN BARU",
            "NIK: 1234567",
            "Nama: Budi Santoso",
            "Email: budi.santoso@infomedia.co.id",
            "Pemohon (ttd)",
        ])
    }

    #[test]
    fn test_process_collects_everything() {
        let bytes = complete_form().ink(2).build();
        let processed = PdfProcessor::new(3).process(&bytes).unwrap();

        assert_eq!(
            processed.document_type.document_type,
            DocumentType::NewVpnRequest
        );
        assert_eq!(
            processed.form_fields.get("NIK").map(String::as_str),
            Some("1234567")
        );
        assert!(processed.missing_fields.contains(&"Manager".to_string()));
        assert_eq!(processed.signatures.signature_count, 3);
        assert!(processed.validation_data.signature_valid);
        assert_eq!(
            processed.validation_data.document_type,
            DocumentType::NewVpnRequest
        );
    }

    #[test]
    fn test_insufficient_signatures_flagged() {
        let bytes = complete_form().build();
        let processed = PdfProcessor::new(3).process(&bytes).unwrap();
        assert_eq!(processed.signatures.signature_count, 1);
        assert!(!processed.validation_data.signature_valid);
    }

    #[test]
    fn test_validation_data_flattens_fields() {
        let bytes = complete_form().build();
        let processed = PdfProcessor::new(1).process(&bytes).unwrap();
        let json = serde_json::to_value(&processed.validation_data).unwrap();

        assert_eq!(json["Nama"], "Budi Santoso");
        assert_eq!(json["document_type"], "new_vpn_request");
        assert_eq!(json["signature_count"], 1);
    }

    #[test]
    fn test_invalid_bytes_fail() {
        let result = PdfProcessor::new(3).process(b"%PDF-garbage");
        assert!(result.is_err());
    }
}
