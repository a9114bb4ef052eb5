// Model payload parsing
// Turns the model collaborator's raw response text into a validated ModelResult.

use serde_json::Value;
use tracing::debug;

use crate::models::{Category, EvidenceItem, Granularity, ModelAnalysis, ModelResult};

use super::error::DetectionError;

const DEFAULT_EVIDENCE_REASON: &str = "AI pattern";

/// Parse a raw model response. Prose or code fences around the JSON object are ignored.
pub fn parse_model_payload(raw: &str) -> Result<ModelResult, DetectionError> {
    let json_str = extract_json(raw.trim())?;
    let value: Value = serde_json::from_str(json_str)
        .map_err(|e| DetectionError::MalformedPayload(format!("JSON parse error: {}", e)))?;
    model_result_from_value(&value)
}

/// Validate an already decoded payload.
///
/// `aiScore` and `confidence` must be numbers; both are rounded and clamped to 0..=100.
/// Evidence lists that are missing or not arrays become empty, and entries without
/// a usable token are dropped.
pub fn model_result_from_value(value: &Value) -> Result<ModelResult, DetectionError> {
    let obj = value
        .as_object()
        .ok_or_else(|| DetectionError::MalformedPayload("expected a JSON object".to_string()))?;

    let ai_score = required_score(obj.get("aiScore"), "aiScore")?;
    let confidence = required_score(obj.get("confidence"), "confidence")?;

    let suspicious_words = evidence_list(obj.get("suspiciousWords"), &["word", "text"], Granularity::Word);
    let suspicious_lines = evidence_list(obj.get("suspiciousLines"), &["text", "line"], Granularity::Line);

    let analysis = obj
        .get("analysis")
        .map(|a| ModelAnalysis {
            tone: string_field(a, "tone"),
            patterns: string_field(a, "patterns"),
            content: string_field(a, "content"),
        })
        .unwrap_or_default();

    let reasoning = obj.get("reasoning").and_then(Value::as_str).unwrap_or_default().to_string();

    debug!(
        "[PAYLOAD] aiScore={} confidence={} words={} lines={}",
        ai_score,
        confidence,
        suspicious_words.len(),
        suspicious_lines.len()
    );

    Ok(ModelResult {
        ai_score,
        confidence,
        suspicious_words,
        suspicious_lines,
        analysis,
        reasoning,
    })
}

/// Human-readable note for a model termination reason. Each reason is defined once.
pub fn finish_reason_note(reason: &str) -> String {
    let note = match reason {
        "STOP" => "The model ended normally without returning text.",
        "MAX_TOKENS" => "The response hit the token limit.",
        "SAFETY" => "Blocked by safety policies.",
        "RECITATION" => "The model blocked content due to recitation policies.",
        "BLOCK_REASON_UNSPECIFIED" => "Blocked by safety for an unspecified reason.",
        "OTHER" => "Blocked for unspecified reason.",
        other => return format!("Reason: {}", other),
    };
    note.to_string()
}

/// Outermost `{...}` block of the response.
fn extract_json(content: &str) -> Result<&str, DetectionError> {
    let Some(start) = content.find('{') else {
        return Err(DetectionError::MalformedPayload("No JSON in response".to_string()));
    };
    match content.rfind('}') {
        Some(end) if end > start => Ok(&content[start..=end]),
        _ => Err(DetectionError::MalformedPayload("Invalid JSON response".to_string())),
    }
}

fn required_score(value: Option<&Value>, field: &'static str) -> Result<f64, DetectionError> {
    let v = match value {
        Some(v) => v,
        None => return Err(DetectionError::invalid(field, "is missing")),
    };
    let n = v
        .as_f64()
        .ok_or_else(|| DetectionError::invalid(field, format!("must be a number, got {}", v)))?;
    Ok(n.round().clamp(0.0, 100.0))
}

fn evidence_list(value: Option<&Value>, token_keys: &[&str], granularity: Granularity) -> Vec<EvidenceItem> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|entry| {
            let (token, reason) = match entry {
                Value::String(s) => (s.as_str(), DEFAULT_EVIDENCE_REASON),
                Value::Object(map) => {
                    let token = token_keys.iter().find_map(|k| map.get(*k).and_then(Value::as_str))?;
                    let reason = map
                        .get("reason")
                        .and_then(Value::as_str)
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or(DEFAULT_EVIDENCE_REASON);
                    (token, reason)
                }
                _ => return None,
            };
            EvidenceItem::new(token, reason, Category::Ai, granularity)
        })
        .collect()
}

fn string_field(value: &Value, key: &str) -> String {
    value.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}
