//! Shared PDF handling utilities
//!
//! Text extraction, document type detection, form field extraction and
//! signature detection for VPN request forms. [`PdfProcessor`] runs the
//! whole pass and produces the [`ValidationData`] handed to the judge.

pub mod doctype;
pub mod error;
pub mod extract;
pub mod fields;
pub mod processor;
pub mod signatures;

#[cfg(any(test, feature = "testing"))]
pub mod test_pdf;

pub use doctype::{detect_document_type, DocumentTypeDetection};
pub use error::PdfError;
pub use extract::{ExtractedDocument, ExtractionMethod, PageText, PdfExtractor};
pub use fields::{completeness, extract_form_fields, missing_required_fields, REQUIRED_FIELDS};
pub use processor::{PdfProcessor, ProcessedPdf, ValidationData};
pub use signatures::{SignatureDetector, SignatureInfo, SignatureKind, SignatureMark};
