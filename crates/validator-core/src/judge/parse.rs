//! Lenient parsing of the model's JSON answer
//!
//! Models wrap JSON in markdown fences, add prose around it, and return
//! confidence as strings or percentages. Missing fields take conservative
//! defaults (`is_valid = false`, `status = rejected`).

use serde_json::{Map, Value};
use shared_types::ValidationStatus;

use super::{DocumentTypeAnalysis, JudgeError, JudgeVerdict, SignatureAnalysis};

/// Confidence used when the model returns something that is not a number
pub const UNPARSEABLE_CONFIDENCE: f64 = 0.5;

/// Extract JSON from a response, handling markdown code blocks.
pub fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if text.starts_with("```") {
        if let Some(start) = text.find('\n') {
            let after_first_line = &text[start + 1..];
            if let Some(end) = after_first_line.rfind("```") {
                return after_first_line[..end].trim();
            }
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return &text[start..=end];
        }
    }

    text
}

pub fn parse_verdict(text: &str) -> Result<JudgeVerdict, JudgeError> {
    let json = extract_json(text);
    let value: Value = serde_json::from_str(json).map_err(|e| {
        let preview: String = json.chars().take(200).collect();
        JudgeError::Parse(format!("{} (response starts: {:?})", e, preview))
    })?;

    let Value::Object(obj) = value else {
        return Err(JudgeError::Parse("response is not a JSON object".to_string()));
    };

    let is_valid = obj.get("is_valid").map(coerce_bool).unwrap_or(false);
    let status = match obj.get("status").and_then(Value::as_str) {
        Some(raw) => raw.parse().unwrap_or(if is_valid {
            ValidationStatus::Approved
        } else {
            ValidationStatus::Rejected
        }),
        None => ValidationStatus::Rejected,
    };

    Ok(JudgeVerdict {
        is_valid,
        status,
        confidence: obj
            .get("confidence")
            .map(coerce_confidence)
            .unwrap_or(0.0),
        issues: string_list(&obj, "issues"),
        reasoning: obj
            .get("reasoning")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        missing_fields: string_list(&obj, "missing_fields"),
        signature_analysis: nested::<SignatureAnalysis>(&obj, "signature_analysis"),
        document_type_analysis: nested::<DocumentTypeAnalysis>(&obj, "document_type_analysis"),
        recommendations: string_list(&obj, "recommendations"),
    })
}

fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Numbers and numeric strings, percentages scaled down, clamped to [0, 1]
pub fn coerce_confidence(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };

    match raw {
        Some(c) if c.is_finite() => {
            let c = if c > 1.0 && c <= 100.0 { c / 100.0 } else { c };
            c.clamp(0.0, 1.0)
        }
        _ => UNPARSEABLE_CONFIDENCE,
    }
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

fn nested<T>(obj: &Map<String, Value>, key: &str) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    obj.get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}
