//! Regex extraction of VPN request form fields

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::FormFields;

/// Fields every VPN request form must fill in
pub const REQUIRED_FIELDS: &[&str] = &[
    "NIK",
    "Nama",
    "No Tel",
    "Email",
    "Departement",
    "Manager",
    "Range Tanggal",
    "Range Waktu",
    "Approved by",
    "User VPN",
];

lazy_static! {
    /// Label patterns; values never span a line break
    static ref FIELD_PATTERNS: Vec<(&'static str, Regex)> = vec![
        (
            "NIK",
            Regex::new(r"(?im)\b(?:NIK|Nomor Induk Karyawan)\b[ \t:]*([A-Z0-9]+)").unwrap(),
        ),
        (
            "Nama",
            Regex::new(r"(?im)^[ \t]*(?:Nama(?: Lengkap)?|Full Name|Name)\b[ \t:]*([A-Za-z .']+)")
                .unwrap(),
        ),
        (
            "No Tel",
            Regex::new(r"(?im)\b(?:No\.?[ \t]*Tel(?:p|epon)?|Telepon|Phone)\b\.?[ \t:]*([0-9 ()+\-]+)")
                .unwrap(),
        ),
        (
            "Email",
            Regex::new(
                r"(?im)\bE-?mail\b[ \t:]*([a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,})",
            )
            .unwrap(),
        ),
        (
            "Departement",
            Regex::new(r"(?im)\b(?:Departement|Department|Dept)\b\.?[ \t:]*([A-Za-z &]+)").unwrap(),
        ),
        (
            "Manager",
            Regex::new(r"(?im)\b(?:Manager|Atasan)\b[ \t:]*([A-Za-z .']+)").unwrap(),
        ),
        (
            "Range Tanggal",
            Regex::new(r"(?im)\b(?:Range Tanggal|Date Range)\b[ \t:]*([0-9A-Za-z ./\-–]+)").unwrap(),
        ),
        (
            "Range Waktu",
            Regex::new(r"(?im)\b(?:Range Waktu|Time Range)\b[ \t:]*([0-9 .:\-–]+)").unwrap(),
        ),
        (
            "Approved by",
            Regex::new(r"(?im)\b(?:Approved by|Disetujui oleh)\b[ \t:]*([A-Za-z .']+)").unwrap(),
        ),
        (
            "User VPN",
            Regex::new(r"(?im)\b(?:User VPN|VPN User)\b[ \t:]*([A-Za-z0-9 ._]+)").unwrap(),
        ),
    ];
}

/// Extract the first non-empty value for each known field label
pub fn extract_form_fields(text: &str) -> FormFields {
    let mut fields = FormFields::new();

    for (name, pattern) in FIELD_PATTERNS.iter() {
        let value = pattern
            .captures_iter(text)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str().trim())
            .find(|v| !v.is_empty());

        if let Some(value) = value {
            fields.insert((*name).to_string(), value.to_string());
        }
    }

    fields
}

/// Required fields absent or blank in `fields`
pub fn missing_required_fields(fields: &FormFields) -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .filter(|name| fields.get(**name).map_or(true, |v| v.trim().is_empty()))
        .map(|name| (*name).to_string())
        .collect()
}

/// Fraction of required fields that carry a value
pub fn completeness(fields: &FormFields) -> f64 {
    let missing = missing_required_fields(fields).len();
    (REQUIRED_FIELDS.len() - missing) as f64 / REQUIRED_FIELDS.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_FORM: &str = "\
FORMULIR PERMOHONAN VPN BARU
NIK: 1234567
Nama: Budi Santoso
No Tel: +62 812-3456-7890
Email: budi.santoso@infomedia.co.id
Departement: Information Technology
Manager: Siti Rahma
Range Tanggal: 01 Jan 2025 – 31 Mar 2025
Range Waktu: 08:00:00 - 17:00:00
Approved by: Andi Wijaya
User VPN: Budi Santoso
";

    #[test]
    fn test_extracts_all_fields_from_complete_form() {
        let fields = extract_form_fields(SAMPLE_FORM);

        assert_eq!(fields.get("NIK").map(String::as_str), Some("1234567"));
        assert_eq!(fields.get("Nama").map(String::as_str), Some("Budi Santoso"));
        assert_eq!(
            fields.get("No Tel").map(String::as_str),
            Some("+62 812-3456-7890")
        );
        assert_eq!(
            fields.get("Email").map(String::as_str),
            Some("budi.santoso@infomedia.co.id")
        );
        assert_eq!(
            fields.get("Departement").map(String::as_str),
            Some("Information Technology")
        );
        assert_eq!(fields.get("Manager").map(String::as_str), Some("Siti Rahma"));
        assert_eq!(
            fields.get("Range Tanggal").map(String::as_str),
            Some("01 Jan 2025 – 31 Mar 2025")
        );
        assert_eq!(
            fields.get("Range Waktu").map(String::as_str),
            Some("08:00:00 - 17:00:00")
        );
        assert_eq!(
            fields.get("Approved by").map(String::as_str),
            Some("Andi Wijaya")
        );
        assert_eq!(
            fields.get("User VPN").map(String::as_str),
            Some("Budi Santoso")
        );
        assert!(missing_required_fields(&fields).is_empty());
        assert!((completeness(&fields) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_values_do_not_cross_lines() {
        let fields = extract_form_fields("Manager:\nNIK: 99887");
        assert_eq!(fields.get("Manager"), None);
        assert_eq!(fields.get("NIK").map(String::as_str), Some("99887"));
    }

    #[test]
    fn test_english_labels() {
        let fields = extract_form_fields("Name: Jane Doe\nPhone: 555 0100\nDepartment: Finance");
        assert_eq!(fields.get("Nama").map(String::as_str), Some("Jane Doe"));
        assert_eq!(fields.get("No Tel").map(String::as_str), Some("555 0100"));
        assert_eq!(fields.get("Departement").map(String::as_str), Some("Finance"));
    }

    #[test]
    fn test_missing_fields_reported_in_order() {
        let fields = extract_form_fields("NIK: 12345\nEmail: a@infomedia.co.id");
        let missing = missing_required_fields(&fields);
        assert_eq!(missing.len(), 8);
        assert_eq!(missing[0], "Nama");
        assert_eq!(missing[7], "User VPN");
        assert!((completeness(&fields) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_yields_no_fields() {
        assert!(extract_form_fields("").is_empty());
    }
}
