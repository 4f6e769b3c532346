//! PDF text extraction
//!
//! `pdf-extract` is the primary backend. It can fail (or panic) on unusual
//! font programs, so per-page `lopdf` extraction is used as a fallback.
//!
//! # Example
//! ```no_run
//! use shared_pdf::{PdfError, PdfExtractor};
//!
//! fn dump(pdf_bytes: &[u8]) -> Result<(), PdfError> {
//!     let extracted = PdfExtractor::extract(pdf_bytes)?;
//!     println!("{} pages via {:?}", extracted.page_count, extracted.method);
//!     Ok(())
//! }
//! ```

use lopdf::Document;
use pdf_extract::extract_text_from_mem;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::PdfError;

/// Which backend produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    PdfExtract,
    Lopdf,
}

/// Text of a single page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageText {
    /// Page number (1-indexed)
    pub page_number: u32,
    pub text: String,
}

/// Extracted text for a whole document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// All pages, each preceded by a `--- Page N ---` marker line
    pub raw_text: String,
    pub pages: Vec<PageText>,
    /// Page count from the page tree (may exceed `pages.len()` for blank pages)
    pub page_count: u32,
    pub method: ExtractionMethod,
}

pub struct PdfExtractor;

impl PdfExtractor {
    /// Parse PDF bytes into a `lopdf` document.
    ///
    /// # Errors
    /// - `PdfError::Empty` for zero-length input
    /// - `PdfError::PasswordProtected` when the trailer carries an `Encrypt` entry
    /// - `PdfError::Invalid` when the bytes are not a parseable PDF
    pub fn load(pdf_bytes: &[u8]) -> Result<Document, PdfError> {
        if pdf_bytes.is_empty() {
            return Err(PdfError::Empty);
        }

        let doc = Document::load_mem(pdf_bytes).map_err(|e| {
            let msg = e.to_string();
            let lower = msg.to_lowercase();
            let encrypted = ["encrypt", "decrypt", "password"]
                .iter()
                .any(|word| lower.contains(word));
            if encrypted {
                PdfError::PasswordProtected
            } else {
                PdfError::Invalid(msg)
            }
        })?;

        if doc.trailer.get(b"Encrypt").is_ok() {
            return Err(PdfError::PasswordProtected);
        }

        Ok(doc)
    }

    /// Load and extract in one step
    pub fn extract(pdf_bytes: &[u8]) -> Result<ExtractedDocument, PdfError> {
        let doc = Self::load(pdf_bytes)?;
        Self::extract_text(&doc, pdf_bytes)
    }

    /// Extract text, preferring `pdf-extract` and falling back to `lopdf`.
    pub fn extract_text(doc: &Document, pdf_bytes: &[u8]) -> Result<ExtractedDocument, PdfError> {
        Self::assemble(doc, Self::extract_with_pdf_extract(pdf_bytes))
    }

    /// Use the `pdf-extract` output when it succeeded, otherwise read pages with lopdf
    fn assemble(
        doc: &Document,
        primary: Result<String, String>,
    ) -> Result<ExtractedDocument, PdfError> {
        let page_count = doc.get_pages().len() as u32;

        match primary {
            Ok(text) => {
                let pages = split_pages(&text);
                debug!(
                    "pdf-extract produced {} chars across {} page(s)",
                    text.len(),
                    pages.len()
                );
                Ok(ExtractedDocument {
                    raw_text: join_pages(&pages),
                    pages,
                    page_count,
                    method: ExtractionMethod::PdfExtract,
                })
            }
            Err(reason) => {
                warn!("pdf-extract failed ({}), falling back to lopdf", reason);
                let pages = Self::extract_with_lopdf(doc)?;
                Ok(ExtractedDocument {
                    raw_text: join_pages(&pages),
                    pages,
                    page_count,
                    method: ExtractionMethod::Lopdf,
                })
            }
        }
    }

    /// Run `pdf-extract`, converting panics from malformed fonts into errors
    fn extract_with_pdf_extract(pdf_bytes: &[u8]) -> Result<String, String> {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            extract_text_from_mem(pdf_bytes)
        })) {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err("pdf-extract panicked, likely on a malformed font".to_string()),
        }
    }

    fn extract_with_lopdf(doc: &Document) -> Result<Vec<PageText>, PdfError> {
        let mut pages = Vec::new();
        let mut failures = 0;

        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => pages.push(PageText {
                    page_number: *page_number,
                    text,
                }),
                Err(e) => {
                    failures += 1;
                    debug!("lopdf could not extract page {}: {}", page_number, e);
                }
            }
        }

        if pages.is_empty() && failures > 0 {
            return Err(PdfError::Extraction(format!(
                "no text could be extracted from {} page(s)",
                failures
            )));
        }

        Ok(pages)
    }
}

/// Split `pdf-extract` output on form feeds, keeping page numbering
fn split_pages(text: &str) -> Vec<PageText> {
    if !text.contains('\x0C') {
        return vec![PageText {
            page_number: 1,
            text: text.to_string(),
        }];
    }

    text.split('\x0C')
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(idx, page)| PageText {
            page_number: idx as u32 + 1,
            text: page.to_string(),
        })
        .collect()
}

fn join_pages(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|p| format!("\n--- Page {} ---\n{}", p.page_number, p.text))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pdf::TestPdf;
    use lopdf::{dictionary, Object};

    #[test]
    fn test_empty_bytes_rejected() {
        assert_eq!(PdfExtractor::load(b"").unwrap_err(), PdfError::Empty);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let result = PdfExtractor::load(b"this is not a pdf at all");
        assert!(matches!(result, Err(PdfError::Invalid(_))));
    }

    #[test]
    fn test_extracts_text_from_generated_pdf() {
        let bytes = TestPdf::new()
            .page(&["Permohonan VPN Baru", "Nama: Budi Santoso"])
            .build();
        let doc = PdfExtractor::load(&bytes).unwrap();
        let extracted = PdfExtractor::extract_text(&doc, &bytes).unwrap();

        assert_eq!(extracted.page_count, 1);
        assert!(extracted.raw_text.contains("--- Page 1 ---"));
        assert!(extracted.raw_text.contains("VPN"));
    }

    #[test]
    fn test_encrypted_trailer_is_password_protected() {
        let bytes = TestPdf::new().page(&["secret form"]).build();
        let mut doc = Document::load_mem(&bytes).unwrap();
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
        });
        doc.trailer.set("Encrypt", Object::Reference(encrypt_id));
        let mut encrypted = Vec::new();
        doc.save_to(&mut encrypted).unwrap();

        assert_eq!(
            PdfExtractor::extract(&encrypted).unwrap_err(),
            PdfError::PasswordProtected
        );
    }

    #[test]
    fn test_falls_back_to_lopdf_when_pdf_extract_fails() {
        let bytes = TestPdf::new()
            .page(&["Nama: Budi Santoso"])
            .page(&["NIK: 1234567"])
            .build();
        let doc = PdfExtractor::load(&bytes).unwrap();
        let extracted =
            PdfExtractor::assemble(&doc, Err("unsupported font program".to_string())).unwrap();

        assert_eq!(extracted.method, ExtractionMethod::Lopdf);
        assert_eq!(extracted.page_count, 2);
        assert_eq!(extracted.pages.len(), 2);
        assert!(extracted.pages[0].text.contains("Budi"));
        assert!(extracted.raw_text.contains("--- Page 2 ---"));
    }

    #[test]
    fn test_primary_backend_used_when_it_succeeds() {
        let bytes = TestPdf::new().page(&["ignored"]).build();
        let doc = PdfExtractor::load(&bytes).unwrap();
        let extracted = PdfExtractor::assemble(&doc, Ok("from pdf-extract".to_string())).unwrap();
        assert_eq!(extracted.method, ExtractionMethod::PdfExtract);
        assert!(extracted.raw_text.contains("from pdf-extract"));
    }

    #[test]
    fn test_page_count_follows_page_tree() {
        let bytes = TestPdf::new()
            .page(&["first page"])
            .page(&["second page"])
            .page(&["third page"])
            .build();
        let doc = PdfExtractor::load(&bytes).unwrap();
        let extracted = PdfExtractor::extract_text(&doc, &bytes).unwrap();
        assert_eq!(extracted.page_count, 3);
    }

    #[test]
    fn test_split_pages_on_form_feed() {
        let pages = split_pages("Page 1 content\x0CPage 2 content\x0C\x0CPage 4 content");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[1].page_number, 2);
        assert_eq!(pages[2].page_number, 4);
        assert!(pages[2].text.contains("Page 4"));
    }

    #[test]
    fn test_split_without_form_feed_is_single_page() {
        let pages = split_pages("one\ntwo\nthree");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text, "one\ntwo\nthree");
    }

    #[test]
    fn test_join_pages_adds_markers() {
        let pages = vec![
            PageText {
                page_number: 1,
                text: "alpha".to_string(),
            },
            PageText {
                page_number: 2,
                text: "beta".to_string(),
            },
        ];
        assert_eq!(
            join_pages(&pages),
            "\n--- Page 1 ---\nalpha\n--- Page 2 ---\nbeta"
        );
    }
}
