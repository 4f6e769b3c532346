//! In-memory PDF builder for tests

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

#[derive(Default)]
struct TestPage {
    lines: Vec<String>,
    ink_annotations: usize,
    signed_fields: usize,
    images: Vec<(i64, i64)>,
}

/// Builds small single-font PDFs with optional signature artifacts
#[derive(Default)]
pub struct TestPdf {
    pages: Vec<TestPage>,
}

impl TestPdf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, lines: &[&str]) -> Self {
        self.pages.push(TestPage {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            ..Default::default()
        });
        self
    }

    /// Add ink annotations to the last page
    pub fn ink(mut self, count: usize) -> Self {
        if let Some(page) = self.pages.last_mut() {
            page.ink_annotations += count;
        }
        self
    }

    /// Add signed `/Sig` form fields to the last page
    pub fn signed_fields(mut self, count: usize) -> Self {
        if let Some(page) = self.pages.last_mut() {
            page.signed_fields += count;
        }
        self
    }

    /// Add an image XObject of the given pixel size to the last page
    pub fn image(mut self, width: i64, height: i64) -> Self {
        if let Some(page) = self.pages.last_mut() {
            page.images.push((width, height));
        }
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });

        let mut kids = Vec::new();
        let mut form_fields = Vec::new();

        for page in &self.pages {
            let page_id = doc.new_object_id();

            let mut content = String::new();
            for (idx, line) in page.lines.iter().enumerate() {
                let y = 750 - (idx as i64 * 18);
                content.push_str(&format!(
                    "BT /F1 12 Tf 50 {} Td ({}) Tj ET\n",
                    y,
                    escape(line)
                ));
            }
            let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

            let mut xobjects = Dictionary::new();
            for (idx, (width, height)) in page.images.iter().enumerate() {
                let pixels = vec![255u8; (*width * *height) as usize];
                let image_id = doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => *width,
                        "Height" => *height,
                        "ColorSpace" => "DeviceGray",
                        "BitsPerComponent" => 8,
                    },
                    pixels,
                ));
                xobjects.set(format!("Im{}", idx + 1), Object::Reference(image_id));
            }

            let mut annots = Vec::new();
            for idx in 0..page.ink_annotations {
                let y = 100 + idx as i64 * 40;
                let annot_id = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Ink",
                    "Rect" => vec![50.into(), y.into(), 200.into(), (y + 30).into()],
                    "InkList" => vec![Object::Array(vec![
                        50.into(), y.into(), 120.into(), (y + 20).into(), 200.into(), y.into(),
                    ])],
                });
                annots.push(Object::Reference(annot_id));
            }
            for idx in 0..page.signed_fields {
                let sig_value_id = doc.add_object(dictionary! {
                    "Type" => "Sig",
                    "Filter" => "Adobe.PPKLite",
                    "Name" => Object::string_literal(format!("Signer {}", idx + 1)),
                });
                let field_id = doc.add_object(dictionary! {
                    "Type" => "Annot",
                    "Subtype" => "Widget",
                    "FT" => "Sig",
                    "T" => Object::string_literal(format!("Signature{}", form_fields.len() + 1)),
                    "V" => Object::Reference(sig_value_id),
                    "P" => Object::Reference(page_id),
                    "Rect" => vec![300.into(), 100.into(), 450.into(), 140.into()],
                });
                annots.push(Object::Reference(field_id));
                form_fields.push(Object::Reference(field_id));
            }

            let mut resources = dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            };
            if !page.images.is_empty() {
                resources.set("XObject", Object::Dictionary(xobjects));
            }

            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Contents" => Object::Reference(content_id),
                "Resources" => resources,
            };
            if !annots.is_empty() {
                page_dict.set("Annots", Object::Array(annots));
            }
            doc.objects.insert(page_id, Object::Dictionary(page_dict));
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        };
        if !form_fields.is_empty() {
            catalog.set(
                "AcroForm",
                Object::Dictionary(dictionary! {
                    "Fields" => form_fields,
                    "SigFlags" => 3,
                }),
            );
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}
