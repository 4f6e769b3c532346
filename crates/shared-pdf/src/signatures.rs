//! Heuristic signature detection
//!
//! Signatures are counted from two sources:
//!
//! - text markers left by signing tools or typed conventions
//!   (`/s/ Name`, `(ttd)`, `Digitally signed by`, `Signed by:`)
//! - PDF structure: signed `/Sig` form fields, ink annotations drawn with a
//!   pen, and image XObjects whose proportions look like a scanned signature
//!
//! The count is an input feature for the judge and for the signature
//! minimum; it is not a cryptographic verification.

use std::collections::{BTreeMap, HashSet};

use lazy_static::lazy_static;
use lopdf::{Dictionary, Document, Object, ObjectId};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::extract::PageText;

/// Width/height ratio range for signature-shaped images
const IMAGE_ASPECT_MIN: f64 = 1.5;
const IMAGE_ASPECT_MAX: f64 = 8.0;
const IMAGE_MIN_WIDTH: f64 = 50.0;
const IMAGE_MIN_HEIGHT: f64 = 20.0;

/// Max depth when walking nested AcroForm `/Kids`
const MAX_FIELD_DEPTH: usize = 8;

lazy_static! {
    /// One alternation so overlapping markers (`Digitally signed by:`) count once
    static ref TEXT_MARKER: Regex = Regex::new(concat!(
        r"(?i)(?P<digital>\bdigitally\s+signed\s+by\b)",
        r"|(?P<signed_by>\bsigned\s+by\s*:)",
        r"|(?P<conformed>/s/[ \t]*[a-z])",
        r"|(?P<ttd>\(\s*ttd\.?\s*\))",
        r"|(?P<bracketed>\[\s*signed\s*\])",
    ))
    .unwrap();
}

const MARKER_LABELS: [(&str, &str); 5] = [
    ("digital", "digitally signed by"),
    ("signed_by", "signed by:"),
    ("conformed", "/s/ conformed signature"),
    ("ttd", "(ttd)"),
    ("bracketed", "[signed]"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureKind {
    TextMarker,
    SignatureField,
    InkAnnotation,
    Image,
}

/// A single signature-like mark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureMark {
    pub kind: SignatureKind,
    /// Page number (1-indexed) when it can be determined
    pub page: Option<u32>,
    pub confidence: f64,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature_count: u32,
    /// `signature_count >= min_signatures`
    pub signature_valid: bool,
    pub min_signatures: u32,
    pub marks: Vec<SignatureMark>,
}

pub struct SignatureDetector {
    min_signatures: u32,
}

impl SignatureDetector {
    pub fn new(min_signatures: u32) -> Self {
        Self { min_signatures }
    }

    pub fn detect(&self, doc: &Document, pages: &[PageText]) -> SignatureInfo {
        let mut marks = Self::scan_text(pages);
        marks.extend(Self::scan_structure(doc));

        let signature_count = marks.len() as u32;
        debug!(
            "Detected {} signature mark(s), minimum is {}",
            signature_count, self.min_signatures
        );

        SignatureInfo {
            signature_count,
            signature_valid: signature_count >= self.min_signatures,
            min_signatures: self.min_signatures,
            marks,
        }
    }

    /// Count text markers page by page
    pub fn scan_text(pages: &[PageText]) -> Vec<SignatureMark> {
        let mut marks = Vec::new();
        for page in pages {
            for caps in TEXT_MARKER.captures_iter(&page.text) {
                let label = MARKER_LABELS
                    .iter()
                    .find(|(group, _)| caps.name(group).is_some())
                    .map_or("text marker", |(_, label)| *label);
                marks.push(SignatureMark {
                    kind: SignatureKind::TextMarker,
                    page: Some(page.page_number),
                    confidence: 0.6,
                    detail: label.to_string(),
                });
            }
        }
        marks
    }

    /// Count signed fields, ink annotations and signature-shaped images
    pub fn scan_structure(doc: &Document) -> Vec<SignatureMark> {
        let page_numbers: BTreeMap<ObjectId, u32> = doc
            .get_pages()
            .into_iter()
            .map(|(number, id)| (id, number))
            .collect();

        let mut marks = Vec::new();
        let mut seen_fields = HashSet::new();

        // Signed fields reachable from the AcroForm
        if let Some(fields) = acroform_fields(doc) {
            for field in fields {
                collect_signed_fields(doc, field, &page_numbers, &mut seen_fields, &mut marks, 0);
            }
        }

        for (page_id, number) in &page_numbers {
            let Ok(page) = doc.get_dictionary(*page_id) else {
                continue;
            };

            // Widgets not listed in the AcroForm still count when signed
            for annot in page_annotations(doc, page) {
                let (annot_id, dict) = annot;
                if is_subtype(dict, b"Ink") {
                    marks.push(SignatureMark {
                        kind: SignatureKind::InkAnnotation,
                        page: Some(*number),
                        confidence: 0.8,
                        detail: "ink annotation".to_string(),
                    });
                } else if is_signed_sig_field(doc, dict) {
                    if annot_id.map_or(true, |id| seen_fields.insert(id)) {
                        marks.push(signed_field_mark(dict, Some(*number)));
                    }
                }
            }

            for (width, height) in page_images(doc, page) {
                if looks_like_signature(width, height) {
                    marks.push(SignatureMark {
                        kind: SignatureKind::Image,
                        page: Some(*number),
                        confidence: (width * height / 10_000.0).min(0.9),
                        detail: format!("image {}x{}", width, height),
                    });
                }
            }
        }

        marks
    }
}

/// Signature proportions: wide, short, and not tiny
pub fn looks_like_signature(width: f64, height: f64) -> bool {
    if width < IMAGE_MIN_WIDTH || height < IMAGE_MIN_HEIGHT {
        return false;
    }
    let ratio = width / height;
    ratio > IMAGE_ASPECT_MIN && ratio < IMAGE_ASPECT_MAX
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

fn resolve_dict<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

fn is_subtype(dict: &Dictionary, subtype: &[u8]) -> bool {
    matches!(dict.get(b"Subtype"), Ok(Object::Name(name)) if name.as_slice() == subtype)
}

fn is_signed_sig_field(doc: &Document, dict: &Dictionary) -> bool {
    let is_sig = matches!(dict.get(b"FT"), Ok(Object::Name(name)) if name.as_slice() == b"Sig");
    let has_value = dict
        .get(b"V")
        .ok()
        .and_then(|v| resolve(doc, v))
        .is_some_and(|v| !matches!(v, Object::Null));
    is_sig && has_value
}

fn signed_field_mark(dict: &Dictionary, page: Option<u32>) -> SignatureMark {
    let name = match dict.get(b"T") {
        Ok(Object::String(bytes, _)) => String::from_utf8_lossy(bytes).into_owned(),
        _ => "unnamed".to_string(),
    };
    SignatureMark {
        kind: SignatureKind::SignatureField,
        page,
        confidence: 0.95,
        detail: format!("signed field '{}'", name),
    }
}

fn acroform_fields(doc: &Document) -> Option<&Vec<Object>> {
    let root = doc.trailer.get(b"Root").ok()?;
    let catalog = resolve_dict(doc, root)?;
    let acroform = resolve_dict(doc, catalog.get(b"AcroForm").ok()?)?;
    match resolve(doc, acroform.get(b"Fields").ok()?)? {
        Object::Array(fields) => Some(fields),
        _ => None,
    }
}

fn collect_signed_fields(
    doc: &Document,
    field: &Object,
    page_numbers: &BTreeMap<ObjectId, u32>,
    seen: &mut HashSet<ObjectId>,
    marks: &mut Vec<SignatureMark>,
    depth: usize,
) {
    if depth > MAX_FIELD_DEPTH {
        return;
    }
    let field_id = match field {
        Object::Reference(id) => Some(*id),
        _ => None,
    };
    let Some(dict) = resolve_dict(doc, field) else {
        return;
    };

    if is_signed_sig_field(doc, dict) {
        if field_id.map_or(true, |id| seen.insert(id)) {
            let page = match dict.get(b"P") {
                Ok(Object::Reference(id)) => page_numbers.get(id).copied(),
                _ => None,
            };
            marks.push(signed_field_mark(dict, page));
        }
        return;
    }

    if let Ok(kids) = dict.get(b"Kids") {
        if let Some(Object::Array(kids)) = resolve(doc, kids) {
            for kid in kids {
                collect_signed_fields(doc, kid, page_numbers, seen, marks, depth + 1);
            }
        }
    }
}

fn page_annotations<'a>(
    doc: &'a Document,
    page: &'a Dictionary,
) -> Vec<(Option<ObjectId>, &'a Dictionary)> {
    let Ok(annots) = page.get(b"Annots") else {
        return Vec::new();
    };
    let Some(Object::Array(annots)) = resolve(doc, annots) else {
        return Vec::new();
    };

    annots
        .iter()
        .filter_map(|annot| {
            let id = match annot {
                Object::Reference(id) => Some(*id),
                _ => None,
            };
            resolve_dict(doc, annot).map(|dict| (id, dict))
        })
        .collect()
}

fn page_images(doc: &Document, page: &Dictionary) -> Vec<(f64, f64)> {
    let Some(resources) = page
        .get(b"Resources")
        .ok()
        .and_then(|r| resolve_dict(doc, r))
    else {
        return Vec::new();
    };
    let Some(xobjects) = resources
        .get(b"XObject")
        .ok()
        .and_then(|x| resolve_dict(doc, x))
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(_, obj)| resolve_dict(doc, obj))
        .filter(|dict| is_subtype(dict, b"Image"))
        .filter_map(|dict| {
            let width = dict.get(b"Width").ok().and_then(number)?;
            let height = dict.get(b"Height").ok().and_then(number)?;
            Some((width, height))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pdf::TestPdf;

    fn page(number: u32, text: &str) -> PageText {
        PageText {
            page_number: number,
            text: text.to_string(),
        }
    }

    fn load(bytes: &[u8]) -> Document {
        Document::load_mem(bytes).unwrap()
    }

    #[test]
    fn test_text_markers_counted_per_page() {
        let pages = vec![
            page(1, "Pemohon (ttd)\nAtasan ( TTD. )"),
            page(2, "Digitally signed by IT Security\n/s/ Andi Wijaya"),
        ];
        let marks = SignatureDetector::scan_text(&pages);
        assert_eq!(marks.len(), 4);
        assert_eq!(marks.iter().filter(|m| m.page == Some(1)).count(), 2);
        assert!(marks.iter().all(|m| m.kind == SignatureKind::TextMarker));
    }

    #[test]
    fn test_digital_stamp_counts_once() {
        let pages = vec![page(1, "Digitally signed by: Andi Wijaya\nSigned by: Budi")];
        let marks = SignatureDetector::scan_text(&pages);
        let details: Vec<_> = marks.iter().map(|m| m.detail.as_str()).collect();
        assert_eq!(details, vec!["digitally signed by", "signed by:"]);
    }

    #[test]
    fn test_plain_text_has_no_markers() {
        let pages = vec![page(1, "Signature: ________\nPlease sign below")];
        assert!(SignatureDetector::scan_text(&pages).is_empty());
    }

    #[test]
    fn test_signature_aspect_ratio() {
        assert!(looks_like_signature(300.0, 80.0));
        assert!(!looks_like_signature(100.0, 100.0)); // square logo
        assert!(!looks_like_signature(900.0, 50.0)); // horizontal rule
        assert!(!looks_like_signature(40.0, 10.0)); // too small
    }

    #[test]
    fn test_structure_counts_ink_fields_and_images() {
        let bytes = TestPdf::new()
            .page(&["Pemohon"])
            .ink(2)
            .page(&["IT"])
            .signed_fields(1)
            .image(300, 80)
            .image(200, 200)
            .build();
        let marks = SignatureDetector::scan_structure(&load(&bytes));

        let count = |kind| marks.iter().filter(|m| m.kind == kind).count();
        assert_eq!(count(SignatureKind::InkAnnotation), 2);
        assert_eq!(count(SignatureKind::SignatureField), 1);
        assert_eq!(count(SignatureKind::Image), 1);

        let field = marks
            .iter()
            .find(|m| m.kind == SignatureKind::SignatureField)
            .unwrap();
        assert_eq!(field.page, Some(2));
    }

    #[test]
    fn test_detect_applies_minimum() {
        let bytes = TestPdf::new().page(&["form"]).ink(2).build();
        let doc = load(&bytes);
        let pages = vec![page(1, "Approved (ttd)")];

        let info = SignatureDetector::new(3).detect(&doc, &pages);
        assert_eq!(info.signature_count, 3);
        assert!(info.signature_valid);

        let info = SignatureDetector::new(4).detect(&doc, &pages);
        assert!(!info.signature_valid);
    }

    #[test]
    fn test_unsigned_document_has_no_marks() {
        let bytes = TestPdf::new().page(&["blank form"]).build();
        let info = SignatureDetector::new(3).detect(&load(&bytes), &[page(1, "blank form")]);
        assert_eq!(info.signature_count, 0);
        assert!(!info.signature_valid);
    }
}
