//! Keyword-based detection of the VPN form type

use serde::{Deserialize, Serialize};
use shared_types::DocumentType;

/// Phrases indicating a request for new VPN access
pub const NEW_VPN_KEYWORDS: &[&str] = &[
    "permohonan vpn baru",
    "request vpn baru",
    "pengajuan vpn baru",
    "new vpn request",
    "vpn baru",
    "permohonan akses vpn",
];

/// Phrases indicating an extension of existing VPN access
pub const EXTENSION_KEYWORDS: &[&str] = &[
    "perpanjangan vpn",
    "vpn extension",
    "perpanjangan akses vpn",
    "extend vpn",
    "renewal vpn",
    "perpanjangan",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTypeDetection {
    pub document_type: DocumentType,
    pub confidence: f64,
    pub new_vpn_score: usize,
    pub extension_score: usize,
}

fn score(text_lower: &str, keywords: &[&str]) -> usize {
    keywords.iter().filter(|k| text_lower.contains(*k)).count()
}

/// Classify text by counting distinct keyword hits per form type.
///
/// The higher score wins with confidence `min(0.9, 0.5 + 0.1 * score)`;
/// a tie (including no hits) is `Unknown` at 0.3.
pub fn detect_document_type(text: &str) -> DocumentTypeDetection {
    let text_lower = text.to_lowercase();
    let new_vpn_score = score(&text_lower, NEW_VPN_KEYWORDS);
    let extension_score = score(&text_lower, EXTENSION_KEYWORDS);

    let (document_type, confidence) = if new_vpn_score > extension_score {
        (
            DocumentType::NewVpnRequest,
            (0.5 + new_vpn_score as f64 * 0.1).min(0.9),
        )
    } else if extension_score > new_vpn_score {
        (
            DocumentType::VpnExtension,
            (0.5 + extension_score as f64 * 0.1).min(0.9),
        )
    } else {
        (DocumentType::Unknown, 0.3)
    };

    DocumentTypeDetection {
        document_type,
        confidence,
        new_vpn_score,
        extension_score,
    }
}
